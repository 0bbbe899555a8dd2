use std::sync::Mutex;

use chrono::{Duration as ChronoDuration, Utc};

use crate::config::{delay, Latency};
use crate::error::{EntityKind, ServiceError, ServiceResult};
use crate::ids::next_id;
use crate::models::{EntityId, MemberPatch, MemberRecord, NewMember};

/// The member directory.
pub struct MemberService {
    members: Mutex<Vec<MemberRecord>>,
    latency: Latency,
}

impl MemberService {
    pub fn new(seed: Vec<MemberRecord>, latency: Latency) -> Self {
        Self {
            members: Mutex::new(seed),
            latency,
        }
    }

    pub async fn get_all(&self) -> ServiceResult<Vec<MemberRecord>> {
        delay(self.latency.list).await;
        let members = self.members.lock().expect("member collection poisoned");
        Ok(members.clone())
    }

    pub async fn get_by_id(&self, id: EntityId) -> ServiceResult<MemberRecord> {
        delay(self.latency.fetch).await;
        let members = self.members.lock().expect("member collection poisoned");
        members
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(ServiceError::not_found(EntityKind::Member, id))
    }

    /// New members join online with every counter at zero.
    pub async fn create(&self, input: NewMember) -> ServiceResult<MemberRecord> {
        delay(self.latency.create).await;
        let mut members = self.members.lock().expect("member collection poisoned");
        let member = MemberRecord {
            id: next_id(members.iter().map(|m| m.id)),
            name: input.name,
            bio: input.bio.unwrap_or_default(),
            avatar: input.avatar,
            interests: input.interests,
            joined_at: Utc::now(),
            online: true,
            posts_count: 0,
            events_attended: 0,
            events_organized: 0,
            connections_count: 0,
        };
        tracing::debug!(member_id = member.id, "member joined");
        members.push(member.clone());
        Ok(member)
    }

    pub async fn update(&self, id: EntityId, patch: MemberPatch) -> ServiceResult<MemberRecord> {
        delay(self.latency.update).await;
        let mut members = self.members.lock().expect("member collection poisoned");
        let member = members
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Member, id))?;
        if let Some(name) = patch.name {
            member.name = name;
        }
        if let Some(bio) = patch.bio {
            member.bio = bio;
        }
        if let Some(avatar) = patch.avatar {
            member.avatar = avatar;
        }
        if let Some(interests) = patch.interests {
            member.interests = interests;
        }
        if let Some(online) = patch.online {
            member.online = online;
        }
        if let Some(posts_count) = patch.posts_count {
            member.posts_count = posts_count;
        }
        if let Some(events_attended) = patch.events_attended {
            member.events_attended = events_attended;
        }
        if let Some(events_organized) = patch.events_organized {
            member.events_organized = events_organized;
        }
        if let Some(connections_count) = patch.connections_count {
            member.connections_count = connections_count;
        }
        Ok(member.clone())
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        delay(self.latency.delete).await;
        let mut members = self.members.lock().expect("member collection poisoned");
        let index = members
            .iter()
            .position(|m| m.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Member, id))?;
        members.remove(index);
        Ok(())
    }

    pub async fn online(&self) -> ServiceResult<Vec<MemberRecord>> {
        delay(self.latency.fetch).await;
        let members = self.members.lock().expect("member collection poisoned");
        Ok(members.iter().filter(|m| m.online).cloned().collect())
    }

    /// Members who joined within the last `days` days.
    pub async fn recent_joiners(&self, days: i64) -> ServiceResult<Vec<MemberRecord>> {
        delay(self.latency.filter).await;
        let cutoff = Utc::now() - ChronoDuration::days(days);
        let members = self.members.lock().expect("member collection poisoned");
        Ok(members
            .iter()
            .filter(|m| m.joined_at >= cutoff)
            .cloned()
            .collect())
    }

    /// Members showing any sign of life: online, posting, or attending.
    pub async fn active(&self) -> ServiceResult<Vec<MemberRecord>> {
        delay(self.latency.filter).await;
        let members = self.members.lock().expect("member collection poisoned");
        Ok(members
            .iter()
            .filter(|m| m.online || m.posts_count > 0 || m.events_attended > 0)
            .cloned()
            .collect())
    }

    /// Case-insensitive substring match over name, bio, and interest tags.
    /// All matches, no ranking.
    pub async fn search(&self, query: &str) -> ServiceResult<Vec<MemberRecord>> {
        delay(self.latency.search).await;
        let needle = query.to_lowercase();
        let members = self.members.lock().expect("member collection poisoned");
        Ok(members
            .iter()
            .filter(|m| {
                m.name.to_lowercase().contains(&needle)
                    || m.bio.to_lowercase().contains(&needle)
                    || m.interests
                        .iter()
                        .any(|tag| tag.to_lowercase().contains(&needle))
            })
            .cloned()
            .collect())
    }
}
