use std::collections::VecDeque;
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use huddle_backend::models::{EntityId, Session};
use huddle_backend::services::Services;

mod handlers_chat;
mod handlers_events;
mod handlers_feed;
mod handlers_misc;
pub mod inflight;
pub mod messages;
mod spawners;
pub mod state;
mod tasks;

use inflight::{InFlight, PendingAction, Undo};
use messages::AppMessage;
use state::{ChatState, CommunityState, DirectoryState, EventsState, FeedState, Notice};

const DEFAULT_CALL_TIMEOUT_MS: u64 = 10_000;

/// The headless application core: per-feature view state, the completion
/// channel, and the bookkeeping that keeps optimistic mutations honest.
///
/// A renderer drives it by calling the action methods (`load_feed`,
/// `like_post`, `send_chat_message`, ...) and pumping `try_poll` every
/// frame; tests call `settle` to drain everything deterministically.
pub struct App {
    services: Arc<Services>,
    session: Session,
    call_timeout: Duration,
    tx: UnboundedSender<AppMessage>,
    rx: UnboundedReceiver<AppMessage>,
    /// Completions not yet received; `settle` runs until this hits zero.
    pending_ops: usize,
    /// Placeholder identifiers count down from the top of the id space so
    /// they can never collide with store-assigned ones.
    next_local_id: EntityId,
    inflight: InFlight,
    pub feed: FeedState,
    pub chat: ChatState,
    pub events: EventsState,
    pub directory: DirectoryState,
    pub community: CommunityState,
    pub notices: VecDeque<Notice>,
}

impl App {
    pub fn new(services: Arc<Services>, session: Session) -> Self {
        Self::with_timeout(services, session, timeout_from_env())
    }

    /// Builds an app with an explicit per-call timeout, mainly for tests.
    pub fn with_timeout(services: Arc<Services>, session: Session, timeout: Duration) -> Self {
        let (tx, rx) = mpsc::unbounded_channel();
        Self {
            services,
            session,
            call_timeout: timeout,
            tx,
            rx,
            pending_ops: 0,
            next_local_id: EntityId::MAX,
            inflight: InFlight::default(),
            feed: FeedState::default(),
            chat: ChatState::default(),
            events: EventsState::default(),
            directory: DirectoryState::default(),
            community: CommunityState::default(),
            notices: VecDeque::new(),
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn has_pending(&self) -> bool {
        self.pending_ops > 0
    }

    /// Non-blocking pump for a render loop: applies one completion if one
    /// is waiting.
    pub fn try_poll(&mut self) -> bool {
        match self.rx.try_recv() {
            Ok(message) => {
                self.handle_message(message);
                true
            }
            Err(_) => false,
        }
    }

    /// Runs the pump until every spawned call (including any dispatched
    /// from the deferral queue along the way) has completed.
    pub async fn settle(&mut self) {
        while self.pending_ops > 0 {
            match self.rx.recv().await {
                Some(message) => self.handle_message(message),
                None => break,
            }
        }
    }

    pub fn handle_message(&mut self, message: AppMessage) {
        self.pending_ops = self.pending_ops.saturating_sub(1);
        match message {
            AppMessage::PostsLoaded(result) => self.handle_posts_loaded(result),
            AppMessage::PostCreated(result) => self.handle_post_created(result),
            AppMessage::PostLiked { post_id, result } => self.handle_post_liked(post_id, result),
            AppMessage::CommentAdded { post_id, result } => {
                self.handle_comment_added(post_id, result)
            }
            AppMessage::MessagesLoaded(result) => self.handle_messages_loaded(result),
            AppMessage::MessageSent { local_id, result } => {
                self.handle_message_sent(local_id, result)
            }
            AppMessage::MessageRead { message_id, result } => {
                self.handle_message_read(message_id, result)
            }
            AppMessage::UnreadCounted(result) => self.handle_unread_counted(result),
            AppMessage::EventsLoaded(result) => self.handle_events_loaded(result),
            AppMessage::EventCreated(result) => self.handle_event_created(result),
            AppMessage::RsvpUpdated {
                event_id,
                attending,
                result,
            } => self.handle_rsvp_updated(event_id, attending, result),
            AppMessage::MembersLoaded(result) => self.handle_members_loaded(result),
            AppMessage::MembersSearched(result) => self.handle_members_searched(result),
            AppMessage::CommunityLoaded(result) => self.handle_community_loaded(result),
            AppMessage::BadgesEvaluated { member_id, result } => {
                self.handle_badges_evaluated(member_id, result)
            }
        }
    }

    pub(crate) fn track(&mut self) {
        self.pending_ops += 1;
    }

    pub(crate) fn push_notice(&mut self, notice: Notice) {
        self.notices.push_back(notice);
    }

    pub(crate) fn allocate_local_id(&mut self) -> EntityId {
        let id = self.next_local_id;
        self.next_local_id -= 1;
        id
    }

    /// Reverts the tentative change a failed mutation left behind.
    pub(crate) fn apply_undo(&mut self, undo: Undo) {
        match undo {
            Undo::ToggleLike { post_id } => {
                let actor_id = self.session.actor_id.clone();
                if let Some(post) = self.feed.post_mut(post_id) {
                    spawners::toggle_like(post, &actor_id);
                }
            }
            Undo::RemoveComment {
                post_id,
                comment_id,
            } => {
                if let Some(post) = self.feed.post_mut(post_id) {
                    post.comments.retain(|c| c.id != comment_id);
                }
            }
            Undo::RemoveAttendee { event_id, actor_id } => {
                if let Some(event) = self.events.event_mut(event_id) {
                    event.attendees.retain(|a| a.actor_id != actor_id);
                }
            }
            Undo::RestoreAttendee { event_id, attendee } => {
                if let Some(event) = self.events.event_mut(event_id) {
                    event.attendees.push(attendee);
                }
            }
            Undo::RemoveMessage { local_id } => {
                self.chat.messages.retain(|m| m.id != local_id);
            }
            Undo::UnmarkRead {
                message_id,
                actor_id,
            } => {
                if let Some(message) = self.chat.message_mut(message_id) {
                    message.read_by.retain(|r| r != &actor_id);
                }
                self.chat.unread_count = self.chat.local_unread(&self.session.actor_id);
            }
        }
    }

    /// Dispatches whatever was queued behind a mutation that just resolved.
    /// The first action re-claims the target; the rest queue behind it again.
    pub(crate) fn requeue(&mut self, mut queued: VecDeque<PendingAction>) {
        if let Some(first) = queued.pop_front() {
            self.dispatch_pending(first);
            while let Some(action) = queued.pop_front() {
                self.inflight.defer(action);
            }
        }
    }

    fn dispatch_pending(&mut self, action: PendingAction) {
        match action {
            PendingAction::LikePost(post_id) => self.like_post(post_id),
            PendingAction::AddComment { post_id, content } => {
                self.add_comment(post_id, &content)
            }
            PendingAction::Rsvp {
                event_id,
                attending,
            } => self.rsvp(event_id, attending),
            PendingAction::MarkRead { message_id } => self.mark_message_read(message_id),
        }
    }
}

fn timeout_from_env() -> Duration {
    let millis = std::env::var("HUDDLE_SERVICE_TIMEOUT_MS")
        .ok()
        .and_then(|raw| raw.parse::<u64>().ok())
        .unwrap_or(DEFAULT_CALL_TIMEOUT_MS);
    Duration::from_millis(millis)
}

#[cfg(test)]
mod tests {
    use super::state::NoticeLevel;
    use super::*;
    use chrono::{TimeZone, Utc};
    use huddle_backend::config::Latency;
    use huddle_backend::models::NewEvent;
    use huddle_backend::seed::SeedData;
    use pretty_assertions::assert_eq;

    fn instant_app() -> App {
        let services = Arc::new(Services::seeded(Latency::zero()).expect("seed parses"));
        App::with_timeout(services, Session::new("you", "You"), Duration::from_secs(5))
    }

    /// Latency scaled down but nonzero, so calls are genuinely in flight.
    fn slow_services() -> Arc<Services> {
        let seed = SeedData::builtin().expect("seed parses");
        Arc::new(Services::new(seed, Latency::default().scaled(5)))
    }

    #[tokio::test]
    async fn test_loads_populate_every_feature_state() {
        let mut app = instant_app();
        app.load_feed();
        app.load_chat();
        app.load_events();
        app.load_directory();
        app.load_community();
        app.settle().await;

        assert!(!app.feed.posts.is_empty());
        assert!(!app.chat.messages.is_empty());
        assert!(!app.events.events.is_empty());
        assert!(!app.directory.members.is_empty());
        assert!(app.community.info.is_some());
        assert!(app.feed.error.is_none());
        // Nothing from another member has been read by this session yet.
        assert_eq!(app.chat.unread_count, app.chat.messages.len());
    }

    #[tokio::test]
    async fn test_like_applies_optimistically_then_reconciles() {
        let mut app = instant_app();
        app.load_feed();
        app.settle().await;

        let post_id = app.feed.posts[0].id;
        let before = app.feed.posts[0].likes.len();
        app.like_post(post_id);
        // Tentative change is visible before the service resolves.
        assert_eq!(app.feed.posts[0].likes.len(), before + 1);

        app.settle().await;
        assert!(app.feed.posts[0].likes.contains(&"you".to_string()));
        assert!(app.notices.is_empty());
    }

    #[tokio::test]
    async fn test_failed_send_removes_temp_message_and_notifies_once() {
        // Zero timeout against nonzero latency: every call fails.
        let mut app = App::with_timeout(slow_services(), Session::new("you", "You"), Duration::ZERO);

        app.chat.draft = "will never arrive".into();
        app.send_chat_message();
        assert_eq!(app.chat.messages.len(), 1);
        assert!(app.chat.messages[0].id > u64::MAX / 2);

        app.settle().await;
        assert!(app.chat.messages.is_empty());
        let errors: Vec<_> = app
            .notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .collect();
        assert_eq!(errors.len(), 1);
        assert!(errors[0].text.contains("send"));
    }

    #[tokio::test]
    async fn test_sent_message_adopts_the_store_identifier() {
        let mut app = instant_app();
        app.load_chat();
        app.settle().await;
        let count = app.chat.messages.len();

        app.chat.draft = "hello room".into();
        app.send_chat_message();
        assert!(app.chat.messages.last().unwrap().id > u64::MAX / 2);

        app.settle().await;
        let sent = app.chat.messages.last().unwrap();
        assert_eq!(app.chat.messages.len(), count + 1);
        assert!(sent.id < u64::MAX / 2);
        assert_eq!(sent.content, "hello room");
        assert_eq!(sent.sender_id, "you");
    }

    #[tokio::test]
    async fn test_full_event_rsvp_rolls_back_the_tentative_attendee() {
        let services = Arc::new(Services::seeded(Latency::zero()).expect("seed parses"));
        let organizer = Session::new("organizer", "Organizer");
        let event = services
            .events()
            .create(
                NewEvent {
                    title: "Tiny workshop".into(),
                    description: String::new(),
                    date: Utc.with_ymd_and_hms(2030, 5, 1, 18, 0, 0).unwrap(),
                    location: "Hall B".into(),
                    max_attendees: Some(1),
                },
                &organizer,
            )
            .await
            .unwrap();
        services
            .events()
            .rsvp(event.id, true, &Session::new("other", "Other"))
            .await
            .unwrap();

        let mut app = App::with_timeout(services, Session::new("you", "You"), Duration::from_secs(5));
        app.load_events();
        app.settle().await;

        app.rsvp(event.id, true);
        let tentative = app
            .events
            .events
            .iter()
            .find(|e| e.id == event.id)
            .unwrap();
        assert!(tentative.is_attending("you"));

        app.settle().await;
        let rolled_back = app
            .events
            .events
            .iter()
            .find(|e| e.id == event.id)
            .unwrap();
        assert!(!rolled_back.is_attending("you"));
        assert_eq!(rolled_back.attendees.len(), 1);
        let errors = app
            .notices
            .iter()
            .filter(|n| n.level == NoticeLevel::Error)
            .count();
        assert_eq!(errors, 1);
    }

    #[tokio::test]
    async fn test_second_mutation_on_a_busy_target_is_serialized() {
        let mut app =
            App::with_timeout(slow_services(), Session::new("you", "You"), Duration::from_secs(5));
        app.load_feed();
        app.settle().await;

        let post_id = app.feed.posts[0].id;
        let before = app.feed.posts[0].likes.clone();

        app.like_post(post_id);
        app.like_post(post_id); // target busy: deferred, not dropped
        app.settle().await;

        // Both applied in sequence; an involution lands back where it began.
        let post = app.feed.posts.iter().find(|p| p.id == post_id).unwrap();
        assert_eq!(post.likes, before);
        assert!(app.notices.is_empty());
    }

    #[tokio::test]
    async fn test_comment_reconciles_placeholder_with_store_identifier() {
        let mut app = instant_app();
        app.load_feed();
        app.settle().await;

        let post_id = app.feed.posts[0].id;
        let comments_before = app.feed.posts[0].comments.len();
        app.add_comment(post_id, "Count me in!");
        let tentative = app.feed.posts[0].comments.last().unwrap();
        assert!(tentative.id > u64::MAX / 2);

        app.settle().await;
        let post = app.feed.posts.iter().find(|p| p.id == post_id).unwrap();
        assert_eq!(post.comments.len(), comments_before + 1);
        let committed = post.comments.last().unwrap();
        assert!(committed.id < u64::MAX / 2);
        assert_eq!(committed.content, "Count me in!");
    }

    #[tokio::test]
    async fn test_create_post_validation_never_reaches_the_store() {
        let mut app = instant_app();
        app.feed.compose.content = "   ".into();
        app.create_post();
        assert!(app.feed.compose.error.is_some());
        assert!(!app.has_pending());
    }

    #[tokio::test]
    async fn test_create_event_requires_a_parseable_future_date() {
        let mut app = instant_app();
        app.events.create.title = "Picnic".into();
        app.events.create.date_input = "not a date".into();
        app.create_event();
        assert!(app.events.create.error.is_some());
        assert!(!app.has_pending());

        app.events.create.date_input = "2020-01-01T12:00:00Z".into();
        app.create_event();
        assert!(app
            .events
            .create
            .error
            .as_deref()
            .unwrap()
            .contains("future"));
        assert!(!app.has_pending());
    }

    #[tokio::test]
    async fn test_mark_read_drops_unread_count_immediately() {
        let mut app = instant_app();
        app.load_chat();
        app.settle().await;

        let unread_before = app.chat.unread_count;
        assert!(unread_before > 0);
        let target = app
            .chat
            .messages
            .iter()
            .find(|m| m.sender_id != "you")
            .unwrap()
            .id;

        app.mark_message_read(target);
        assert_eq!(app.chat.unread_count, unread_before - 1);

        app.settle().await;
        assert_eq!(app.chat.unread_count, unread_before - 1);
        assert!(app.notices.is_empty());
    }
}
