use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

pub type EntityId = u64;

/// The acting user for a session. Every mutating call receives one so the
/// services never have to assume who "the current user" is.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Session {
    pub actor_id: String,
    pub name: String,
    pub avatar: Option<String>,
}

impl Session {
    pub fn new(actor_id: impl Into<String>, name: impl Into<String>) -> Self {
        Self {
            actor_id: actor_id.into(),
            name: name.into(),
            avatar: None,
        }
    }
}

/// Display fields copied out of another entity at mutation time. Never a
/// live reference into another collection.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProfileSnapshot {
    pub name: String,
    pub avatar: Option<String>,
}

/// Post author snapshot also carries the online flag shown in the feed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AuthorSnapshot {
    pub name: String,
    pub avatar: Option<String>,
    pub online: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentRecord {
    pub id: EntityId,
    pub content: String,
    pub author: ProfileSnapshot,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PostRecord {
    pub id: EntityId,
    pub content: String,
    pub image_url: Option<String>,
    pub author_id: String,
    pub author: AuthorSnapshot,
    /// Actor identifiers; membership matters, order does not.
    pub likes: Vec<String>,
    pub comments: Vec<CommentRecord>,
    pub timestamp: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AttendeeRecord {
    pub actor_id: String,
    pub name: String,
    pub avatar: Option<String>,
    pub rsvp_at: DateTime<Utc>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EventRecord {
    pub id: EntityId,
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub organizer_id: String,
    pub organizer: ProfileSnapshot,
    pub attendees: Vec<AttendeeRecord>,
    pub max_attendees: Option<u32>,
    pub created_at: DateTime<Utc>,
}

impl EventRecord {
    pub fn is_attending(&self, actor_id: &str) -> bool {
        self.attendees.iter().any(|a| a.actor_id == actor_id)
    }

    pub fn is_full(&self) -> bool {
        self.max_attendees
            .is_some_and(|cap| self.attendees.len() >= cap as usize)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MemberRecord {
    pub id: EntityId,
    pub name: String,
    pub bio: String,
    pub avatar: Option<String>,
    pub interests: Vec<String>,
    pub joined_at: DateTime<Utc>,
    pub online: bool,
    pub posts_count: u32,
    pub events_attended: u32,
    pub events_organized: u32,
    pub connections_count: u32,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MessageRecord {
    pub id: EntityId,
    pub content: String,
    pub sender_id: String,
    pub sender: ProfileSnapshot,
    pub timestamp: DateTime<Utc>,
    /// Actor identifiers that have seen the message. The sender is a reader
    /// from the moment the message exists.
    pub read_by: Vec<String>,
}

impl MessageRecord {
    pub fn is_read_by(&self, actor_id: &str) -> bool {
        self.sender_id == actor_id || self.read_by.iter().any(|r| r == actor_id)
    }
}

/// Singleton community profile. Exactly one per process lifetime.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommunityRecord {
    pub name: String,
    pub description: String,
    pub location: String,
    pub member_count: u32,
    pub events_count: u32,
    pub posts_count: u32,
    pub active_today: u32,
    pub rules: Vec<String>,
}

/// Aggregate numbers shown on the community page.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct CommunityStats {
    pub member_count: u32,
    pub events_count: u32,
    pub posts_count: u32,
    pub active_today: u32,
}

// ---------------------------------------------------------------------------
// Create inputs. Callers supply attributes; the services own defaulting and
// identity assignment.

#[derive(Debug, Clone, Default)]
pub struct NewPost {
    pub content: String,
    pub image_url: Option<String>,
}

#[derive(Debug, Clone)]
pub struct NewEvent {
    pub title: String,
    pub description: String,
    pub date: DateTime<Utc>,
    pub location: String,
    pub max_attendees: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct NewMember {
    pub name: String,
    pub bio: Option<String>,
    pub avatar: Option<String>,
    pub interests: Vec<String>,
}

#[derive(Debug, Clone, Default)]
pub struct NewMessage {
    pub content: String,
}

// ---------------------------------------------------------------------------
// Patch types. Only the mutable fields of each entity are representable, so
// an update can never touch an identifier or an invariant-bearing sequence.

#[derive(Debug, Clone, Default)]
pub struct PostPatch {
    pub content: Option<String>,
    /// `Some(None)` clears the image.
    pub image_url: Option<Option<String>>,
}

#[derive(Debug, Clone, Default)]
pub struct EventPatch {
    pub title: Option<String>,
    pub description: Option<String>,
    pub date: Option<DateTime<Utc>>,
    pub location: Option<String>,
    pub max_attendees: Option<Option<u32>>,
}

#[derive(Debug, Clone, Default)]
pub struct MemberPatch {
    pub name: Option<String>,
    pub bio: Option<String>,
    pub avatar: Option<Option<String>>,
    pub interests: Option<Vec<String>>,
    pub online: Option<bool>,
    pub posts_count: Option<u32>,
    pub events_attended: Option<u32>,
    pub events_organized: Option<u32>,
    pub connections_count: Option<u32>,
}

#[derive(Debug, Clone, Default)]
pub struct MessagePatch {
    pub content: Option<String>,
}

#[derive(Debug, Clone, Default)]
pub struct CommunityPatch {
    pub name: Option<String>,
    pub description: Option<String>,
    pub location: Option<String>,
    pub member_count: Option<u32>,
    pub events_count: Option<u32>,
    pub posts_count: Option<u32>,
    pub active_today: Option<u32>,
}
