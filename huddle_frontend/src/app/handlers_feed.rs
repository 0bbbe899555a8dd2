use huddle_backend::models::{EntityId, PostRecord};

use super::inflight::Target;
use super::state::{CreatePostState, Notice};
use super::App;

impl App {
    pub(super) fn handle_posts_loaded(&mut self, result: Result<Vec<PostRecord>, anyhow::Error>) {
        self.feed.loading = false;
        match result {
            Ok(posts) => {
                self.feed.posts = posts;
                self.feed.error = None;
            }
            Err(err) => {
                log::warn!("loading posts failed: {err:#}");
                self.feed.error = Some("Failed to load posts".into());
            }
        }
    }

    pub(super) fn handle_post_created(&mut self, result: Result<PostRecord, anyhow::Error>) {
        self.feed.compose.submitting = false;
        match result {
            Ok(post) => {
                self.feed.compose = CreatePostState::default();
                // The store prepends; mirror it so the feed stays newest-first.
                self.feed.posts.insert(0, post);
                self.push_notice(Notice::info("Post shared"));
            }
            Err(err) => {
                log::warn!("creating post failed: {err:#}");
                self.feed.compose.error = Some(err.to_string());
                self.push_notice(Notice::error("Failed to create post"));
            }
        }
    }

    pub(super) fn handle_post_liked(
        &mut self,
        post_id: EntityId,
        result: Result<PostRecord, anyhow::Error>,
    ) {
        let flight = self.inflight.finish(Target::Post(post_id));
        match result {
            Ok(post) => self.feed.replace_post(post),
            Err(err) => {
                log::warn!("like on post {post_id} failed: {err:#}");
                if let Some(flight) = &flight {
                    self.apply_undo(flight.undo.clone());
                }
                self.push_notice(Notice::error("Failed to like post"));
            }
        }
        if let Some(flight) = flight {
            self.requeue(flight.queued);
        }
    }

    pub(super) fn handle_comment_added(
        &mut self,
        post_id: EntityId,
        result: Result<PostRecord, anyhow::Error>,
    ) {
        let flight = self.inflight.finish(Target::Post(post_id));
        match result {
            // The authoritative post carries the comment with its real id.
            Ok(post) => self.feed.replace_post(post),
            Err(err) => {
                log::warn!("comment on post {post_id} failed: {err:#}");
                if let Some(flight) = &flight {
                    self.apply_undo(flight.undo.clone());
                }
                self.push_notice(Notice::error("Failed to comment on post"));
            }
        }
        if let Some(flight) = flight {
            self.requeue(flight.queued);
        }
    }
}
