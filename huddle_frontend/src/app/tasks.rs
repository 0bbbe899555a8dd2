use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use tokio::sync::mpsc::UnboundedSender;

use huddle_backend::error::ServiceResult;
use huddle_backend::models::{EntityId, MemberRecord, NewEvent, NewMessage, NewPost, Session};
use huddle_backend::services::Services;

use super::messages::AppMessage;

/// Runs one service call under the session's timeout. The services never
/// time out on their own, so an unbounded delay would otherwise wedge the
/// target forever.
async fn call<T>(
    timeout: Duration,
    fut: impl Future<Output = ServiceResult<T>>,
) -> Result<T, anyhow::Error> {
    match tokio::time::timeout(timeout, fut).await {
        Ok(result) => result.map_err(anyhow::Error::from),
        Err(_) => Err(anyhow!("service call timed out after {timeout:?}")),
    }
}

fn deliver(tx: &UnboundedSender<AppMessage>, message: AppMessage, what: &str) {
    if tx.send(message).is_err() {
        log::error!("failed to deliver {what} message");
    }
}

pub fn load_posts(services: Arc<Services>, timeout: Duration, tx: UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        let result = call(timeout, services.posts().get_all()).await;
        deliver(&tx, AppMessage::PostsLoaded(result), "PostsLoaded");
    });
}

pub fn create_post(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
    input: NewPost,
) {
    tokio::spawn(async move {
        let result = call(timeout, services.posts().create(input, &session)).await;
        deliver(&tx, AppMessage::PostCreated(result), "PostCreated");
    });
}

pub fn like_post(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
    post_id: EntityId,
) {
    tokio::spawn(async move {
        let result = call(timeout, services.posts().like(post_id, &session)).await;
        deliver(&tx, AppMessage::PostLiked { post_id, result }, "PostLiked");
    });
}

pub fn add_comment(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
    post_id: EntityId,
    content: String,
) {
    tokio::spawn(async move {
        let result = call(
            timeout,
            services.posts().add_comment(post_id, &content, &session),
        )
        .await;
        deliver(&tx, AppMessage::CommentAdded { post_id, result }, "CommentAdded");
    });
}

pub fn load_messages(services: Arc<Services>, timeout: Duration, tx: UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        let result = call(timeout, services.messages().get_all()).await;
        deliver(&tx, AppMessage::MessagesLoaded(result), "MessagesLoaded");
    });
}

pub fn send_message(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
    local_id: EntityId,
    input: NewMessage,
) {
    tokio::spawn(async move {
        let result = call(timeout, services.messages().create(input, &session)).await;
        deliver(&tx, AppMessage::MessageSent { local_id, result }, "MessageSent");
    });
}

pub fn mark_message_read(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
    message_id: EntityId,
) {
    tokio::spawn(async move {
        let result = call(
            timeout,
            services.messages().mark_as_read(message_id, &session.actor_id),
        )
        .await;
        deliver(&tx, AppMessage::MessageRead { message_id, result }, "MessageRead");
    });
}

pub fn count_unread(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
) {
    tokio::spawn(async move {
        let result = call(timeout, services.messages().unread_count(&session.actor_id)).await;
        deliver(&tx, AppMessage::UnreadCounted(result), "UnreadCounted");
    });
}

pub fn load_events(services: Arc<Services>, timeout: Duration, tx: UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        let result = call(timeout, services.events().get_all()).await;
        deliver(&tx, AppMessage::EventsLoaded(result), "EventsLoaded");
    });
}

pub fn create_event(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
    input: NewEvent,
) {
    tokio::spawn(async move {
        let result = call(timeout, services.events().create(input, &session)).await;
        deliver(&tx, AppMessage::EventCreated(result), "EventCreated");
    });
}

pub fn rsvp(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    session: Session,
    event_id: EntityId,
    attending: bool,
) {
    tokio::spawn(async move {
        let result = call(timeout, services.events().rsvp(event_id, attending, &session)).await;
        deliver(
            &tx,
            AppMessage::RsvpUpdated {
                event_id,
                attending,
                result,
            },
            "RsvpUpdated",
        );
    });
}

pub fn load_members(services: Arc<Services>, timeout: Duration, tx: UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        let result = call(timeout, services.members().get_all()).await;
        deliver(&tx, AppMessage::MembersLoaded(result), "MembersLoaded");
    });
}

pub fn search_members(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    query: String,
) {
    tokio::spawn(async move {
        let result = call(timeout, services.members().search(&query)).await;
        deliver(&tx, AppMessage::MembersSearched(result), "MembersSearched");
    });
}

pub fn load_community(services: Arc<Services>, timeout: Duration, tx: UnboundedSender<AppMessage>) {
    tokio::spawn(async move {
        let result = call(timeout, services.community().info()).await;
        deliver(&tx, AppMessage::CommunityLoaded(result), "CommunityLoaded");
    });
}

pub fn evaluate_badges(
    services: Arc<Services>,
    timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    member: MemberRecord,
) {
    tokio::spawn(async move {
        let member_id = member.id;
        let result = call(timeout, services.badges().earned_for(&member)).await;
        deliver(
            &tx,
            AppMessage::BadgesEvaluated { member_id, result },
            "BadgesEvaluated",
        );
    });
}
