use std::sync::Mutex;

use crate::config::{delay, Latency};
use crate::error::ServiceResult;
use crate::models::{CommunityPatch, CommunityRecord, CommunityStats};

/// The community's single profile record: name, description, headline
/// numbers, and the rule list shown on the community page.
pub struct CommunityService {
    community: Mutex<CommunityRecord>,
    latency: Latency,
}

impl CommunityService {
    pub fn new(seed: CommunityRecord, latency: Latency) -> Self {
        Self {
            community: Mutex::new(seed),
            latency,
        }
    }

    pub async fn info(&self) -> ServiceResult<CommunityRecord> {
        delay(self.latency.fetch).await;
        Ok(self.community.lock().expect("community poisoned").clone())
    }

    pub async fn update_info(&self, patch: CommunityPatch) -> ServiceResult<CommunityRecord> {
        delay(self.latency.append).await;
        let mut community = self.community.lock().expect("community poisoned");
        if let Some(name) = patch.name {
            community.name = name;
        }
        if let Some(description) = patch.description {
            community.description = description;
        }
        if let Some(location) = patch.location {
            community.location = location;
        }
        if let Some(member_count) = patch.member_count {
            community.member_count = member_count;
        }
        if let Some(events_count) = patch.events_count {
            community.events_count = events_count;
        }
        if let Some(posts_count) = patch.posts_count {
            community.posts_count = posts_count;
        }
        if let Some(active_today) = patch.active_today {
            community.active_today = active_today;
        }
        Ok(community.clone())
    }

    pub async fn rules(&self) -> ServiceResult<Vec<String>> {
        delay(self.latency.ack).await;
        Ok(self
            .community
            .lock()
            .expect("community poisoned")
            .rules
            .clone())
    }

    pub async fn update_rules(&self, rules: Vec<String>) -> ServiceResult<Vec<String>> {
        delay(self.latency.delete).await;
        let mut community = self.community.lock().expect("community poisoned");
        community.rules = rules;
        Ok(community.rules.clone())
    }

    pub async fn stats(&self) -> ServiceResult<CommunityStats> {
        delay(self.latency.fetch).await;
        let community = self.community.lock().expect("community poisoned");
        Ok(CommunityStats {
            member_count: community.member_count,
            events_count: community.events_count,
            posts_count: community.posts_count,
            active_today: community.active_today,
        })
    }

    pub async fn set_member_count(&self, count: u32) -> ServiceResult<u32> {
        delay(self.latency.count).await;
        let mut community = self.community.lock().expect("community poisoned");
        community.member_count = count;
        Ok(community.member_count)
    }
}
