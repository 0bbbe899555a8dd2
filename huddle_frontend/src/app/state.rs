use chrono::{DateTime, Utc};

use huddle_backend::badges::EarnedBadge;
use huddle_backend::models::{
    CommunityRecord, EventRecord, MemberRecord, MessageRecord, PostRecord,
};

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NoticeLevel {
    Info,
    Error,
}

/// A one-shot notification the renderer would show as a toast.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Notice {
    pub level: NoticeLevel,
    pub text: String,
}

impl Notice {
    pub fn info(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Info,
            text: text.into(),
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            level: NoticeLevel::Error,
            text: text.into(),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum FeedFilter {
    #[default]
    All,
    /// Posts without an image.
    Text,
    /// Posts with an image.
    Photo,
}

#[derive(Default)]
pub struct CreatePostState {
    pub content: String,
    pub image_url: Option<String>,
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Default)]
pub struct FeedState {
    pub posts: Vec<PostRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub search_term: String,
    pub filter: FeedFilter,
    pub compose: CreatePostState,
}

impl FeedState {
    /// Posts after the search box and category filter are applied.
    pub fn visible_posts(&self) -> Vec<&PostRecord> {
        let needle = self.search_term.to_lowercase();
        self.posts
            .iter()
            .filter(|post| {
                needle.is_empty()
                    || post.content.to_lowercase().contains(&needle)
                    || post.author.name.to_lowercase().contains(&needle)
            })
            .filter(|post| match self.filter {
                FeedFilter::All => true,
                FeedFilter::Text => post.image_url.is_none(),
                FeedFilter::Photo => post.image_url.is_some(),
            })
            .collect()
    }

    pub fn post_mut(&mut self, id: u64) -> Option<&mut PostRecord> {
        self.posts.iter_mut().find(|p| p.id == id)
    }

    pub fn replace_post(&mut self, post: PostRecord) {
        if let Some(slot) = self.post_mut(post.id) {
            *slot = post;
        }
    }
}

#[derive(Default)]
pub struct ChatState {
    pub messages: Vec<MessageRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub draft: String,
    pub unread_count: usize,
}

impl ChatState {
    pub fn message_mut(&mut self, id: u64) -> Option<&mut MessageRecord> {
        self.messages.iter_mut().find(|m| m.id == id)
    }

    /// Unread count derived from the local copy, used to keep the indicator
    /// in step after read receipts reconcile.
    pub fn local_unread(&self, actor_id: &str) -> usize {
        self.messages
            .iter()
            .filter(|m| m.sender_id != actor_id && !m.read_by.iter().any(|r| r == actor_id))
            .count()
    }
}

#[derive(Default)]
pub struct CreateEventState {
    pub title: String,
    pub description: String,
    pub location: String,
    /// RFC 3339 text, parsed on submit.
    pub date_input: String,
    pub max_attendees: Option<u32>,
    pub submitting: bool,
    pub error: Option<String>,
}

#[derive(Default)]
pub struct EventsState {
    pub events: Vec<EventRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub create: CreateEventState,
}

impl EventsState {
    pub fn event_mut(&mut self, id: u64) -> Option<&mut EventRecord> {
        self.events.iter_mut().find(|e| e.id == id)
    }

    pub fn replace_event(&mut self, event: EventRecord) {
        if let Some(slot) = self.event_mut(event.id) {
            *slot = event;
        }
    }

    pub fn upcoming(&self, now: DateTime<Utc>) -> Vec<&EventRecord> {
        self.events.iter().filter(|e| e.date >= now).collect()
    }

    pub fn past(&self, now: DateTime<Utc>) -> Vec<&EventRecord> {
        self.events.iter().filter(|e| e.date < now).collect()
    }
}

/// A member opened from the directory, with their computed badges.
pub struct MemberProfile {
    pub member: MemberRecord,
    pub badges: Vec<EarnedBadge>,
    pub badges_loading: bool,
}

#[derive(Default)]
pub struct DirectoryState {
    pub members: Vec<MemberRecord>,
    pub loading: bool,
    pub error: Option<String>,
    pub query: String,
    pub searching: bool,
    /// `None` until a search has run; distinct from "no matches".
    pub results: Option<Vec<MemberRecord>>,
    pub profile: Option<MemberProfile>,
}

#[derive(Default)]
pub struct CommunityState {
    pub info: Option<CommunityRecord>,
    pub loading: bool,
    pub error: Option<String>,
}
