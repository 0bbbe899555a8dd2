use huddle_backend::badges::EarnedBadge;
use huddle_backend::models::{
    CommunityRecord, EntityId, EventRecord, MemberRecord, MessageRecord, PostRecord,
};

/// Completion events delivered back to the app once a spawned service call
/// resolves. Arrival order follows completion, not issue order, so every
/// variant carries the identifiers needed to find its target.
pub enum AppMessage {
    PostsLoaded(Result<Vec<PostRecord>, anyhow::Error>),
    PostCreated(Result<PostRecord, anyhow::Error>),
    PostLiked {
        post_id: EntityId,
        result: Result<PostRecord, anyhow::Error>,
    },
    CommentAdded {
        post_id: EntityId,
        result: Result<PostRecord, anyhow::Error>,
    },
    MessagesLoaded(Result<Vec<MessageRecord>, anyhow::Error>),
    MessageSent {
        /// Placeholder identifier of the tentative local message.
        local_id: EntityId,
        result: Result<MessageRecord, anyhow::Error>,
    },
    MessageRead {
        message_id: EntityId,
        result: Result<MessageRecord, anyhow::Error>,
    },
    UnreadCounted(Result<usize, anyhow::Error>),
    EventsLoaded(Result<Vec<EventRecord>, anyhow::Error>),
    EventCreated(Result<EventRecord, anyhow::Error>),
    RsvpUpdated {
        event_id: EntityId,
        attending: bool,
        result: Result<EventRecord, anyhow::Error>,
    },
    MembersLoaded(Result<Vec<MemberRecord>, anyhow::Error>),
    MembersSearched(Result<Vec<MemberRecord>, anyhow::Error>),
    CommunityLoaded(Result<CommunityRecord, anyhow::Error>),
    BadgesEvaluated {
        member_id: EntityId,
        result: Result<Vec<EarnedBadge>, anyhow::Error>,
    },
}
