use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::config::{delay, Latency};
use crate::error::{ServiceError, ServiceResult};
use crate::models::MemberRecord;

/// Palette slot a badge renders with.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BadgeColor {
    Primary,
    Secondary,
    Accent,
    Success,
    Warning,
    Error,
}

/// One threshold a member must meet. Each variant names the member fact it
/// is checked against, so an unknown requirement cannot exist at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum BadgeRequirement {
    PostsCount(u32),
    EventsAttended(u32),
    EventsOrganized(u32),
    ConnectionsCount(u32),
    DaysSinceJoined(i64),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BadgeDefinition {
    pub id: String,
    pub name: String,
    pub description: String,
    pub icon: String,
    pub color: BadgeColor,
    /// Conjunctive: every listed requirement must be met. An empty list is
    /// vacuously satisfied by every member (preserved deliberately, see
    /// DESIGN.md).
    pub requirements: Vec<BadgeRequirement>,
}

/// A badge a member qualifies for, stamped with the evaluation time.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct EarnedBadge {
    pub definition: BadgeDefinition,
    pub earned_at: DateTime<Utc>,
}

/// Facts derived from a member record that requirements are checked against.
#[derive(Debug, Clone, Copy)]
struct MemberFacts {
    posts_count: u32,
    events_attended: u32,
    events_organized: u32,
    connections_count: u32,
    days_since_joined: i64,
}

impl MemberFacts {
    fn derive(member: &MemberRecord, now: DateTime<Utc>) -> Self {
        Self {
            posts_count: member.posts_count,
            events_attended: member.events_attended,
            events_organized: member.events_organized,
            connections_count: member.connections_count,
            days_since_joined: (now - member.joined_at).num_days(),
        }
    }

    fn meets(&self, requirement: BadgeRequirement) -> bool {
        match requirement {
            BadgeRequirement::PostsCount(min) => self.posts_count >= min,
            BadgeRequirement::EventsAttended(min) => self.events_attended >= min,
            BadgeRequirement::EventsOrganized(min) => self.events_organized >= min,
            BadgeRequirement::ConnectionsCount(min) => self.connections_count >= min,
            BadgeRequirement::DaysSinceJoined(min) => self.days_since_joined >= min,
        }
    }
}

/// Computes the badges a member has earned, in catalog order. Pure in
/// (member, catalog, now): identical inputs always produce an identical
/// sequence.
pub fn earned_badges(
    member: &MemberRecord,
    catalog: &[BadgeDefinition],
    now: DateTime<Utc>,
) -> Vec<EarnedBadge> {
    let facts = MemberFacts::derive(member, now);
    catalog
        .iter()
        .filter(|definition| definition.requirements.iter().all(|req| facts.meets(*req)))
        .map(|definition| EarnedBadge {
            definition: definition.clone(),
            earned_at: now,
        })
        .collect()
}

/// Read access to the badge catalog plus the earned-badge computation.
/// The catalog is loaded once and immutable for the process lifetime.
pub struct BadgeService {
    catalog: Vec<BadgeDefinition>,
    latency: Latency,
}

impl BadgeService {
    pub fn new(catalog: Vec<BadgeDefinition>, latency: Latency) -> Self {
        Self { catalog, latency }
    }

    pub async fn catalog(&self) -> ServiceResult<Vec<BadgeDefinition>> {
        delay(self.latency.catalog).await;
        Ok(self.catalog.clone())
    }

    pub async fn definition(&self, slug: &str) -> ServiceResult<BadgeDefinition> {
        delay(self.latency.catalog).await;
        self.catalog
            .iter()
            .find(|badge| badge.id == slug)
            .cloned()
            .ok_or_else(|| ServiceError::UnknownBadge {
                slug: slug.to_string(),
            })
    }

    /// Evaluates the catalog against a member at the current instant.
    pub async fn earned_for(&self, member: &MemberRecord) -> ServiceResult<Vec<EarnedBadge>> {
        delay(self.latency.catalog).await;
        Ok(earned_badges(member, &self.catalog, Utc::now()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;
    use chrono::TimeZone;

    fn member_with(posts: u32, connections: u32, joined_days_ago: i64) -> MemberRecord {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        MemberRecord {
            id: 1,
            name: "Test".into(),
            bio: String::new(),
            avatar: None,
            interests: Vec::new(),
            joined_at: now - chrono::Duration::days(joined_days_ago),
            online: false,
            posts_count: posts,
            events_attended: 0,
            events_organized: 0,
            connections_count: connections,
        }
    }

    fn catalog() -> Vec<BadgeDefinition> {
        SeedData::builtin().expect("seed parses").badges
    }

    fn eval_at(member: &MemberRecord) -> Vec<String> {
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        earned_badges(member, &catalog(), now)
            .into_iter()
            .map(|earned| earned.definition.id)
            .collect()
    }

    #[test]
    fn test_five_posts_earns_exactly_the_contributor_badge() {
        let member = member_with(5, 0, 0);
        assert_eq!(eval_at(&member), vec!["community-contributor".to_string()]);
    }

    #[test]
    fn test_super_connector_is_conjunctive() {
        // Meets the connections threshold but not the posts threshold.
        let member = member_with(9, 20, 0);
        let earned = eval_at(&member);
        assert!(earned.contains(&"community-contributor".to_string()));
        assert!(earned.contains(&"social-butterfly".to_string()));
        assert!(!earned.contains(&"super-connector".to_string()));

        let member = member_with(10, 20, 0);
        assert!(eval_at(&member).contains(&"super-connector".to_string()));
    }

    #[test]
    fn test_veteran_badge_uses_floored_whole_days() {
        assert!(!eval_at(&member_with(0, 0, 89)).contains(&"veteran-member".to_string()));
        assert!(eval_at(&member_with(0, 0, 90)).contains(&"veteran-member".to_string()));
    }

    #[test]
    fn test_evaluation_is_deterministic() {
        let member = member_with(12, 25, 120);
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let first = earned_badges(&member, &catalog(), now);
        let second = earned_badges(&member, &catalog(), now);
        assert_eq!(first, second);
    }

    #[test]
    fn test_empty_requirement_list_is_vacuously_earned() {
        let freeloader = BadgeDefinition {
            id: "freeloader".into(),
            name: "Freeloader".into(),
            description: "No requirements at all".into(),
            icon: "Gift".into(),
            color: BadgeColor::Primary,
            requirements: Vec::new(),
        };
        let member = member_with(0, 0, 0);
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 12, 0, 0).unwrap();
        let earned = earned_badges(&member, &[freeloader], now);
        assert_eq!(earned.len(), 1);
        assert_eq!(earned[0].definition.id, "freeloader");
    }

    #[tokio::test]
    async fn test_unknown_slug_is_an_error() {
        let service = BadgeService::new(catalog(), Latency::zero());
        let err = service.definition("no-such-badge").await.unwrap_err();
        assert!(matches!(err, ServiceError::UnknownBadge { .. }));
    }
}
