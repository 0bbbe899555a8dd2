use crate::badges::BadgeService;
use crate::community::CommunityService;
use crate::config::Latency;
use crate::events::EventService;
use crate::members::MemberService;
use crate::messaging::MessageService;
use crate::posts::PostService;
use crate::seed::SeedData;

/// The full set of simulated backend services, one per entity kind.
///
/// Constructed explicitly and handed to whatever owns the session.
/// There are no process-wide singletons, so tests can spin up as many
/// isolated instances as they like.
pub struct Services {
    posts: PostService,
    events: EventService,
    members: MemberService,
    messages: MessageService,
    community: CommunityService,
    badges: BadgeService,
}

impl Services {
    pub fn new(seed: SeedData, latency: Latency) -> Self {
        Self {
            posts: PostService::new(seed.posts, latency.clone()),
            events: EventService::new(seed.events, latency.clone()),
            members: MemberService::new(seed.members, latency.clone()),
            messages: MessageService::new(seed.messages, latency.clone()),
            community: CommunityService::new(seed.community, latency.clone()),
            badges: BadgeService::new(seed.badges, latency),
        }
    }

    /// The embedded seed with the given latency profile.
    pub fn seeded(latency: Latency) -> anyhow::Result<Self> {
        Ok(Self::new(SeedData::builtin()?, latency))
    }

    pub fn posts(&self) -> &PostService {
        &self.posts
    }

    pub fn events(&self) -> &EventService {
        &self.events
    }

    pub fn members(&self) -> &MemberService {
        &self.members
    }

    pub fn messages(&self) -> &MessageService {
        &self.messages
    }

    pub fn community(&self) -> &CommunityService {
        &self.community
    }

    pub fn badges(&self) -> &BadgeService {
        &self.badges
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_instances_are_isolated_from_each_other() {
        let a = Services::seeded(Latency::zero()).unwrap();
        let b = Services::seeded(Latency::zero()).unwrap();

        let post = a.posts().get_all().await.unwrap()[0].clone();
        a.posts().delete(post.id).await.unwrap();

        assert!(a.posts().get_by_id(post.id).await.is_err());
        assert!(b.posts().get_by_id(post.id).await.is_ok());
    }
}
