use serde::Deserialize;

use crate::badges::BadgeDefinition;
use crate::models::{CommunityRecord, EventRecord, MemberRecord, MessageRecord, PostRecord};

/// The static collections every service starts from: one per entity kind,
/// embedded in the binary. This is the only persistence shape there is;
/// the stores are volatile and reset on restart.
#[derive(Debug, Clone, Deserialize)]
pub struct SeedData {
    pub posts: Vec<PostRecord>,
    pub events: Vec<EventRecord>,
    pub members: Vec<MemberRecord>,
    pub messages: Vec<MessageRecord>,
    pub community: CommunityRecord,
    pub badges: Vec<BadgeDefinition>,
}

impl SeedData {
    /// Parses the embedded seed files.
    pub fn builtin() -> Result<Self, serde_json::Error> {
        Ok(Self {
            posts: serde_json::from_str(include_str!("data/posts.json"))?,
            events: serde_json::from_str(include_str!("data/events.json"))?,
            members: serde_json::from_str(include_str!("data/members.json"))?,
            messages: serde_json::from_str(include_str!("data/messages.json"))?,
            community: serde_json::from_str(include_str!("data/community.json"))?,
            badges: serde_json::from_str(include_str!("data/badges.json"))?,
        })
    }
}
