use chrono::{DateTime, Utc};

use huddle_backend::models::{
    AttendeeRecord, CommentRecord, EntityId, MessageRecord, NewEvent, NewMessage, NewPost,
    PostRecord, ProfileSnapshot,
};

use super::inflight::{PendingAction, Target, Undo};
use super::state::MemberProfile;
use super::tasks;
use super::App;

/// Toggles the actor in a post's like set; its own inverse, which is what
/// makes the like undo a second toggle.
pub(super) fn toggle_like(post: &mut PostRecord, actor_id: &str) {
    match post.likes.iter().position(|a| a == actor_id) {
        Some(index) => {
            post.likes.remove(index);
        }
        None => post.likes.push(actor_id.to_string()),
    }
}

impl App {
    // ------------------------------------------------------------------
    // Loads: no optimistic state, just loading flags and error slots.

    pub fn load_feed(&mut self) {
        if self.feed.loading {
            return;
        }
        self.feed.loading = true;
        self.feed.error = None;
        self.track();
        tasks::load_posts(self.services.clone(), self.call_timeout, self.tx.clone());
    }

    pub fn load_chat(&mut self) {
        if self.chat.loading {
            return;
        }
        self.chat.loading = true;
        self.chat.error = None;
        self.track();
        tasks::load_messages(self.services.clone(), self.call_timeout, self.tx.clone());
        self.track();
        tasks::count_unread(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
        );
    }

    pub fn load_events(&mut self) {
        if self.events.loading {
            return;
        }
        self.events.loading = true;
        self.events.error = None;
        self.track();
        tasks::load_events(self.services.clone(), self.call_timeout, self.tx.clone());
    }

    pub fn load_directory(&mut self) {
        if self.directory.loading {
            return;
        }
        self.directory.loading = true;
        self.directory.error = None;
        self.track();
        tasks::load_members(self.services.clone(), self.call_timeout, self.tx.clone());
    }

    pub fn load_community(&mut self) {
        if self.community.loading {
            return;
        }
        self.community.loading = true;
        self.community.error = None;
        self.track();
        tasks::load_community(self.services.clone(), self.call_timeout, self.tx.clone());
    }

    /// Opens a member profile and kicks off the badge evaluation for it.
    pub fn open_profile(&mut self, member_id: EntityId) {
        let Some(member) = self
            .directory
            .members
            .iter()
            .find(|m| m.id == member_id)
            .cloned()
        else {
            return;
        };
        self.directory.profile = Some(MemberProfile {
            member: member.clone(),
            badges: Vec::new(),
            badges_loading: true,
        });
        self.track();
        tasks::evaluate_badges(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            member,
        );
    }

    /// Runs the directory search for the current query text.
    pub fn search_members(&mut self) {
        let query = self.directory.query.trim().to_string();
        if query.is_empty() {
            self.directory.results = None;
            return;
        }
        if self.directory.searching {
            return;
        }
        self.directory.searching = true;
        self.track();
        tasks::search_members(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            query,
        );
    }

    // ------------------------------------------------------------------
    // Mutations: validate, apply the tentative change, claim the target,
    // then hand off to the service.

    /// Shares the composed post. Presence is checked here; the services
    /// trust their input.
    pub fn create_post(&mut self) {
        let content = self.feed.compose.content.trim().to_string();
        if content.is_empty() {
            self.feed.compose.error = Some("Post content cannot be empty".into());
            return;
        }
        if self.feed.compose.submitting {
            return;
        }
        self.feed.compose.submitting = true;
        self.feed.compose.error = None;
        let input = NewPost {
            content,
            image_url: self.feed.compose.image_url.clone(),
        };
        self.track();
        tasks::create_post(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
            input,
        );
    }

    pub fn like_post(&mut self, post_id: EntityId) {
        let target = Target::Post(post_id);
        if self.inflight.is_busy(target) {
            self.inflight.defer(PendingAction::LikePost(post_id));
            return;
        }
        let actor_id = self.session.actor_id.clone();
        let Some(post) = self.feed.post_mut(post_id) else {
            return;
        };
        toggle_like(post, &actor_id);
        self.inflight.begin(target, Undo::ToggleLike { post_id });
        self.track();
        tasks::like_post(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
            post_id,
        );
    }

    pub fn add_comment(&mut self, post_id: EntityId, content: &str) {
        let content = content.trim().to_string();
        if content.is_empty() {
            return;
        }
        let target = Target::Post(post_id);
        if self.inflight.is_busy(target) {
            self.inflight
                .defer(PendingAction::AddComment { post_id, content });
            return;
        }
        let comment_id = self.allocate_local_id();
        let author = ProfileSnapshot {
            name: self.session.name.clone(),
            avatar: self.session.avatar.clone(),
        };
        let Some(post) = self.feed.post_mut(post_id) else {
            return;
        };
        post.comments.push(CommentRecord {
            id: comment_id,
            content: content.clone(),
            author,
            timestamp: Utc::now(),
        });
        self.inflight.begin(
            target,
            Undo::RemoveComment {
                post_id,
                comment_id,
            },
        );
        self.track();
        tasks::add_comment(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
            post_id,
            content,
        );
    }

    /// Creates the drafted event. Date is parsed and future-checked here;
    /// the services deliberately do not enforce it.
    pub fn create_event(&mut self) {
        let title = self.events.create.title.trim().to_string();
        if title.is_empty() {
            self.events.create.error = Some("Title cannot be empty".into());
            return;
        }
        let date = match self.events.create.date_input.trim().parse::<DateTime<Utc>>() {
            Ok(date) => date,
            Err(_) => {
                self.events.create.error =
                    Some("Event date must be a valid RFC 3339 date-time".into());
                return;
            }
        };
        if date <= Utc::now() {
            self.events.create.error = Some("Event date must be in the future".into());
            return;
        }
        if self.events.create.submitting {
            return;
        }
        self.events.create.submitting = true;
        self.events.create.error = None;
        let input = NewEvent {
            title,
            description: self.events.create.description.trim().to_string(),
            date,
            location: self.events.create.location.trim().to_string(),
            max_attendees: self.events.create.max_attendees,
        };
        self.track();
        tasks::create_event(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
            input,
        );
    }

    /// Joins or leaves an event. The attendee appears (or disappears)
    /// immediately; a capacity rejection puts things back.
    pub fn rsvp(&mut self, event_id: EntityId, attending: bool) {
        let target = Target::Event(event_id);
        if self.inflight.is_busy(target) {
            self.inflight.defer(PendingAction::Rsvp {
                event_id,
                attending,
            });
            return;
        }
        let actor_id = self.session.actor_id.clone();
        let name = self.session.name.clone();
        let avatar = self.session.avatar.clone();
        let Some(event) = self.events.event_mut(event_id) else {
            return;
        };
        let undo = if attending {
            if event.is_attending(&actor_id) {
                return; // requested state already holds
            }
            event.attendees.push(AttendeeRecord {
                actor_id: actor_id.clone(),
                name,
                avatar,
                rsvp_at: Utc::now(),
            });
            Undo::RemoveAttendee { event_id, actor_id }
        } else {
            let Some(index) = event.attendees.iter().position(|a| a.actor_id == actor_id)
            else {
                return; // requested state already holds
            };
            let attendee = event.attendees.remove(index);
            Undo::RestoreAttendee { event_id, attendee }
        };
        self.inflight.begin(target, undo);
        self.track();
        tasks::rsvp(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
            event_id,
            attending,
        );
    }

    /// Sends the drafted chat message: a placeholder message appears in the
    /// room at once and swaps its identifier for the store's on success.
    pub fn send_chat_message(&mut self) {
        let content = self.chat.draft.trim().to_string();
        if content.is_empty() {
            return;
        }
        let local_id = self.allocate_local_id();
        self.chat.messages.push(MessageRecord {
            id: local_id,
            content: content.clone(),
            sender_id: self.session.actor_id.clone(),
            sender: ProfileSnapshot {
                name: self.session.name.clone(),
                avatar: self.session.avatar.clone(),
            },
            timestamp: Utc::now(),
            read_by: vec![self.session.actor_id.clone()],
        });
        self.chat.draft.clear();
        self.inflight
            .begin(Target::Message(local_id), Undo::RemoveMessage { local_id });
        self.track();
        tasks::send_message(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
            local_id,
            NewMessage { content },
        );
    }

    pub fn mark_message_read(&mut self, message_id: EntityId) {
        let target = Target::Message(message_id);
        if self.inflight.is_busy(target) {
            self.inflight.defer(PendingAction::MarkRead { message_id });
            return;
        }
        let actor_id = self.session.actor_id.clone();
        let Some(message) = self.chat.message_mut(message_id) else {
            return;
        };
        if message.is_read_by(&actor_id) {
            return;
        }
        message.read_by.push(actor_id.clone());
        self.inflight.begin(
            target,
            Undo::UnmarkRead {
                message_id,
                actor_id,
            },
        );
        self.chat.unread_count = self.chat.local_unread(&self.session.actor_id);
        self.track();
        tasks::mark_message_read(
            self.services.clone(),
            self.call_timeout,
            self.tx.clone(),
            self.session.clone(),
            message_id,
        );
    }
}
