use huddle_backend::models::{EntityId, MessageRecord};

use super::inflight::Target;
use super::state::Notice;
use super::App;

impl App {
    pub(super) fn handle_messages_loaded(
        &mut self,
        result: Result<Vec<MessageRecord>, anyhow::Error>,
    ) {
        self.chat.loading = false;
        match result {
            Ok(messages) => {
                self.chat.messages = messages;
                self.chat.error = None;
                self.chat.unread_count = self.chat.local_unread(&self.session.actor_id);
            }
            Err(err) => {
                log::warn!("loading chat failed: {err:#}");
                self.chat.error = Some("Failed to load chat".into());
            }
        }
    }

    pub(super) fn handle_message_sent(
        &mut self,
        local_id: EntityId,
        result: Result<MessageRecord, anyhow::Error>,
    ) {
        let flight = self.inflight.finish(Target::Message(local_id));
        match result {
            Ok(message) => {
                // The local shape already matches; only the identifier (and
                // the store's timestamp) need reconciling.
                if let Some(slot) = self.chat.message_mut(local_id) {
                    *slot = message;
                }
            }
            Err(err) => {
                log::warn!("sending message failed: {err:#}");
                if let Some(flight) = &flight {
                    self.apply_undo(flight.undo.clone());
                }
                self.push_notice(Notice::error("Failed to send message"));
            }
        }
        if let Some(flight) = flight {
            self.requeue(flight.queued);
        }
    }

    pub(super) fn handle_message_read(
        &mut self,
        message_id: EntityId,
        result: Result<MessageRecord, anyhow::Error>,
    ) {
        let flight = self.inflight.finish(Target::Message(message_id));
        match result {
            Ok(message) => {
                if let Some(slot) = self.chat.message_mut(message_id) {
                    *slot = message;
                }
                self.chat.unread_count = self.chat.local_unread(&self.session.actor_id);
            }
            Err(err) => {
                log::warn!("read receipt for message {message_id} failed: {err:#}");
                if let Some(flight) = &flight {
                    self.apply_undo(flight.undo.clone());
                }
                self.push_notice(Notice::error("Failed to mark message read"));
            }
        }
        if let Some(flight) = flight {
            self.requeue(flight.queued);
        }
    }

    pub(super) fn handle_unread_counted(&mut self, result: Result<usize, anyhow::Error>) {
        match result {
            Ok(count) => self.chat.unread_count = count,
            // Cosmetic counter; the next load recomputes it.
            Err(err) => log::warn!("unread count failed: {err:#}"),
        }
    }
}
