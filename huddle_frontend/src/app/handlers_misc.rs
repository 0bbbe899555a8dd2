use huddle_backend::badges::EarnedBadge;
use huddle_backend::models::{CommunityRecord, EntityId, MemberRecord};

use super::App;

impl App {
    pub(super) fn handle_members_loaded(
        &mut self,
        result: Result<Vec<MemberRecord>, anyhow::Error>,
    ) {
        self.directory.loading = false;
        match result {
            Ok(members) => {
                self.directory.members = members;
                self.directory.error = None;
            }
            Err(err) => {
                log::warn!("loading members failed: {err:#}");
                self.directory.error = Some("Failed to load members".into());
            }
        }
    }

    pub(super) fn handle_members_searched(
        &mut self,
        result: Result<Vec<MemberRecord>, anyhow::Error>,
    ) {
        self.directory.searching = false;
        match result {
            Ok(matches) => {
                self.directory.results = Some(matches);
                self.directory.error = None;
            }
            Err(err) => {
                log::warn!("member search failed: {err:#}");
                self.directory.error = Some("Failed to search members".into());
            }
        }
    }

    pub(super) fn handle_community_loaded(
        &mut self,
        result: Result<CommunityRecord, anyhow::Error>,
    ) {
        self.community.loading = false;
        match result {
            Ok(info) => {
                self.community.info = Some(info);
                self.community.error = None;
            }
            Err(err) => {
                log::warn!("loading community info failed: {err:#}");
                self.community.error = Some("Failed to load community info".into());
            }
        }
    }

    pub(super) fn handle_badges_evaluated(
        &mut self,
        member_id: EntityId,
        result: Result<Vec<EarnedBadge>, anyhow::Error>,
    ) {
        let Some(profile) = self.directory.profile.as_mut() else {
            return;
        };
        // The profile may have changed while the evaluation was in flight.
        if profile.member.id != member_id {
            return;
        }
        profile.badges_loading = false;
        match result {
            Ok(badges) => profile.badges = badges,
            Err(err) => {
                log::warn!("badge evaluation for member {member_id} failed: {err:#}");
                self.directory.error = Some("Failed to load badges".into());
            }
        }
    }
}
