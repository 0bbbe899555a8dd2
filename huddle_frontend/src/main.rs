use std::sync::Arc;

use anyhow::Result;
use chrono::Utc;
use huddle_backend::config::Latency;
use huddle_backend::models::Session;
use huddle_backend::services::Services;
use huddle_frontend::App;

/// Scripted session against the seeded services: loads every feature,
/// performs a few optimistic mutations, and prints what the user would see.
#[tokio::main]
async fn main() -> Result<()> {
    env_logger::init();

    let services = Arc::new(Services::seeded(Latency::from_env())?);
    let mut app = App::new(services, Session::new("you", "You"));

    app.load_feed();
    app.load_chat();
    app.load_events();
    app.load_directory();
    app.load_community();
    app.settle().await;

    println!(
        "loaded: {} posts, {} messages ({} unread), {} events, {} members",
        app.feed.posts.len(),
        app.chat.messages.len(),
        app.chat.unread_count,
        app.events.events.len(),
        app.directory.members.len()
    );
    if let Some(info) = &app.community.info {
        println!("community: {} — {}", info.name, info.location);
    }

    // A burst of activity: like and comment hit the same post, so the
    // comment is queued until the like resolves.
    if let Some(post_id) = app.feed.posts.first().map(|p| p.id) {
        app.like_post(post_id);
        app.add_comment(post_id, "Saving this — see everyone there!");
    }
    app.chat.draft = "Evening all, just caught up on the feed.".into();
    app.send_chat_message();
    let now = Utc::now();
    if let Some(event_id) = app.events.upcoming(now).first().map(|e| e.id) {
        app.rsvp(event_id, true);
    }
    app.settle().await;

    println!("\nafter activity:");
    if let Some(post) = app.feed.posts.first() {
        println!(
            "  top post now has {} likes and {} comments",
            post.likes.len(),
            post.comments.len()
        );
    }
    if let Some(message) = app.chat.messages.last() {
        println!("  latest chat message #{}: {}", message.id, message.content);
    }
    for event in app.events.upcoming(now).into_iter().take(1) {
        println!(
            "  next event '{}' has {} attendee(s)",
            event.title,
            event.attendees.len()
        );
    }

    if app.notices.is_empty() {
        println!("\nno notices — every mutation committed cleanly");
    } else {
        println!("\nnotices:");
        for notice in &app.notices {
            println!("  [{:?}] {}", notice.level, notice.text);
        }
    }
    Ok(())
}
