use std::io::{self, Write};
use std::sync::Arc;

use anyhow::{anyhow, Result};
use chrono::Utc;
use tokio::io::{AsyncBufReadExt, BufReader};

use crate::error::ServiceError;
use crate::models::{EntityId, NewMessage, NewPost, Session};
use crate::services::Services;

fn require_text(text: &str, what: &str) -> Result<String> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        return Err(ServiceError::Validation {
            message: format!("{what} cannot be empty"),
        }
        .into());
    }
    Ok(trimmed.to_string())
}

/// Run the interactive CLI used for poking at the simulated services.
pub async fn run_cli(services: Arc<Services>, session: Session) -> Result<()> {
    println!("Huddle services ready. Type 'help' for a list of commands.");
    println!("Acting as: {} ({})", session.name, session.actor_id);

    let stdin = tokio::io::stdin();
    let mut reader = BufReader::new(stdin);

    loop {
        print!("huddle> ");
        io::stdout().flush()?;

        let mut line = String::new();
        if reader.read_line(&mut line).await? == 0 {
            break;
        }
        let mut parts = line.split_whitespace();
        let Some(command) = parts.next() else {
            continue;
        };
        let rest: Vec<&str> = parts.collect();

        let outcome = match command {
            "help" => {
                print_help();
                Ok(())
            }
            "quit" | "exit" => break,
            "feed" => show_feed(&services).await,
            "post" => create_post(&services, &session, &rest.join(" ")).await,
            "like" => like_post(&services, &session, &rest).await,
            "comment" => comment_post(&services, &session, &rest).await,
            "events" => show_events(&services).await,
            "rsvp" => rsvp(&services, &session, &rest).await,
            "members" => show_members(&services).await,
            "search" => search_members(&services, &rest.join(" ")).await,
            "chat" => show_chat(&services).await,
            "send" => send_message(&services, &session, &rest.join(" ")).await,
            "read" => mark_read(&services, &session, &rest).await,
            "unread" => show_unread(&services, &session).await,
            "community" => show_community(&services).await,
            "badges" => show_badges(&services, &rest).await,
            other => {
                println!("unknown command '{other}', try 'help'");
                Ok(())
            }
        };
        if let Err(err) = outcome {
            println!("error: {err:#}");
        }
    }
    Ok(())
}

/// Scripted tour exercising every service once, for a quick smoke run.
pub async fn run_demo(services: Arc<Services>, session: Session) -> Result<()> {
    println!("== feed ==");
    show_feed(&services).await?;

    println!("\n== posting ==");
    create_post(&services, &session, "Hello from the demo tour!").await?;
    let newest = services.posts().get_all().await?[0].clone();
    let newest_id = newest.id.to_string();
    like_post(&services, &session, &[newest_id.as_str()]).await?;

    println!("\n== events ==");
    show_events(&services).await?;
    let soonest_upcoming = services.events().upcoming(Utc::now()).await?;
    if let Some(event) = soonest_upcoming.first() {
        let event_id = event.id.to_string();
        rsvp(&services, &session, &[event_id.as_str(), "yes"]).await?;
    }

    println!("\n== chat ==");
    send_message(&services, &session, "The demo tour says hi.").await?;
    show_chat(&services).await?;
    show_unread(&services, &session).await?;

    println!("\n== community ==");
    show_community(&services).await?;

    println!("\n== badges for each member ==");
    for member in services.members().get_all().await? {
        let earned = services.badges().earned_for(&member).await?;
        let names: Vec<_> = earned
            .iter()
            .map(|b| b.definition.name.as_str())
            .collect();
        println!("  {:20} {}", member.name, names.join(", "));
    }
    Ok(())
}

fn print_help() {
    println!("commands:");
    println!("  feed                     list posts, newest first");
    println!("  post <text>              share a post");
    println!("  like <id>                toggle your like on a post");
    println!("  comment <id> <text>      comment on a post");
    println!("  events                   list events by date");
    println!("  rsvp <id> yes|no         join or leave an event");
    println!("  members                  list the directory");
    println!("  search <query>           search members");
    println!("  chat                     show the room, oldest first");
    println!("  send <text>              send a chat message");
    println!("  read <id>                mark a message read");
    println!("  unread                   your unread count");
    println!("  community                community info and rules");
    println!("  badges <member-id>       badges a member has earned");
    println!("  quit                     leave");
}

fn parse_id(args: &[&str]) -> Result<EntityId> {
    args.first()
        .ok_or_else(|| anyhow!("expected an id"))?
        .parse()
        .map_err(|_| anyhow!("ids are integers"))
}

async fn show_feed(services: &Services) -> Result<()> {
    for post in services.posts().get_all().await? {
        println!(
            "#{:<3} {} — {} [{} likes, {} comments]",
            post.id,
            post.author.name,
            post.content,
            post.likes.len(),
            post.comments.len()
        );
    }
    Ok(())
}

async fn create_post(services: &Services, session: &Session, content: &str) -> Result<()> {
    let content = require_text(content, "post content")?;
    let post = services
        .posts()
        .create(
            NewPost {
                content,
                image_url: None,
            },
            session,
        )
        .await?;
    println!("posted #{}", post.id);
    Ok(())
}

async fn like_post(services: &Services, session: &Session, args: &[&str]) -> Result<()> {
    let id = parse_id(args)?;
    let post = services.posts().like(id, session).await?;
    let state = if post.likes.contains(&session.actor_id) {
        "liked"
    } else {
        "unliked"
    };
    println!("{state} #{} ({} likes)", post.id, post.likes.len());
    Ok(())
}

async fn comment_post(services: &Services, session: &Session, args: &[&str]) -> Result<()> {
    let id = parse_id(args)?;
    let text = require_text(&args[1..].join(" "), "comment text")?;
    let post = services.posts().add_comment(id, &text, session).await?;
    println!("commented on #{} ({} comments)", post.id, post.comments.len());
    Ok(())
}

async fn show_events(services: &Services) -> Result<()> {
    for event in services.events().get_all().await? {
        let capacity = match event.max_attendees {
            Some(cap) => format!("{}/{}", event.attendees.len(), cap),
            None => format!("{}", event.attendees.len()),
        };
        println!(
            "#{:<3} {} — {} @ {} [{} attending]",
            event.id,
            event.date.format("%Y-%m-%d %H:%M"),
            event.title,
            event.location,
            capacity
        );
    }
    Ok(())
}

async fn rsvp(services: &Services, session: &Session, args: &[&str]) -> Result<()> {
    let id = parse_id(args)?;
    let attending = match args.get(1).copied() {
        Some("yes") | Some("on") => true,
        Some("no") | Some("off") => false,
        _ => return Err(anyhow!("expected 'rsvp <id> yes|no'")),
    };
    let event = services.events().rsvp(id, attending, session).await?;
    println!(
        "rsvp {} for '{}' ({} attending)",
        if attending { "on" } else { "off" },
        event.title,
        event.attendees.len()
    );
    Ok(())
}

async fn show_members(services: &Services) -> Result<()> {
    for member in services.members().get_all().await? {
        let presence = if member.online { "online" } else { "offline" };
        println!("#{:<3} {:20} {:8} {}", member.id, member.name, presence, member.bio);
    }
    Ok(())
}

async fn search_members(services: &Services, query: &str) -> Result<()> {
    if query.trim().is_empty() {
        return Err(anyhow!("expected 'search <query>'"));
    }
    let matches = services.members().search(query.trim()).await?;
    println!("{} match(es)", matches.len());
    for member in matches {
        println!("  {} — {}", member.name, member.interests.join(", "));
    }
    Ok(())
}

async fn show_chat(services: &Services) -> Result<()> {
    for message in services.messages().get_all().await? {
        println!(
            "[{}] {}: {}",
            message.timestamp.format("%m-%d %H:%M"),
            message.sender.name,
            message.content
        );
    }
    Ok(())
}

async fn send_message(services: &Services, session: &Session, content: &str) -> Result<()> {
    let content = require_text(content, "message")?;
    let message = services
        .messages()
        .create(NewMessage { content }, session)
        .await?;
    println!("sent #{}", message.id);
    Ok(())
}

async fn mark_read(services: &Services, session: &Session, args: &[&str]) -> Result<()> {
    let id = parse_id(args)?;
    services
        .messages()
        .mark_as_read(id, &session.actor_id)
        .await?;
    println!("marked #{id} read");
    Ok(())
}

async fn show_unread(services: &Services, session: &Session) -> Result<()> {
    let count = services.messages().unread_count(&session.actor_id).await?;
    println!("{count} unread message(s)");
    Ok(())
}

async fn show_community(services: &Services) -> Result<()> {
    let info = services.community().info().await?;
    let stats = services.community().stats().await?;
    println!("{} — {}", info.name, info.location);
    println!("{}", info.description);
    println!(
        "{} members, {} events, {} posts, {} active today",
        stats.member_count, stats.events_count, stats.posts_count, stats.active_today
    );
    println!("rules:");
    for (index, rule) in info.rules.iter().enumerate() {
        println!("  {}. {}", index + 1, rule);
    }
    Ok(())
}

async fn show_badges(services: &Services, args: &[&str]) -> Result<()> {
    let id = parse_id(args)?;
    let member = services.members().get_by_id(id).await?;
    let earned = services.badges().earned_for(&member).await?;
    if earned.is_empty() {
        println!("{} has no badges yet", member.name);
        return Ok(());
    }
    println!("{} has earned:", member.name);
    for badge in earned {
        println!("  {} — {}", badge.definition.name, badge.definition.description);
    }
    Ok(())
}
