use huddle_backend::models::{EntityId, EventRecord};

use super::inflight::Target;
use super::state::{CreateEventState, Notice};
use super::App;

impl App {
    pub(super) fn handle_events_loaded(&mut self, result: Result<Vec<EventRecord>, anyhow::Error>) {
        self.events.loading = false;
        match result {
            Ok(events) => {
                self.events.events = events;
                self.events.error = None;
            }
            Err(err) => {
                log::warn!("loading events failed: {err:#}");
                self.events.error = Some("Failed to load events".into());
            }
        }
    }

    pub(super) fn handle_event_created(&mut self, result: Result<EventRecord, anyhow::Error>) {
        self.events.create.submitting = false;
        match result {
            Ok(event) => {
                self.events.create = CreateEventState::default();
                self.events.events.push(event);
                // Keep the store's date ordering.
                self.events.events.sort_by(|a, b| a.date.cmp(&b.date));
                self.push_notice(Notice::info("Event created"));
            }
            Err(err) => {
                log::warn!("creating event failed: {err:#}");
                self.events.create.error = Some(err.to_string());
                self.push_notice(Notice::error("Failed to create event"));
            }
        }
    }

    pub(super) fn handle_rsvp_updated(
        &mut self,
        event_id: EntityId,
        attending: bool,
        result: Result<EventRecord, anyhow::Error>,
    ) {
        let flight = self.inflight.finish(Target::Event(event_id));
        match result {
            Ok(event) => self.events.replace_event(event),
            Err(err) => {
                log::warn!(
                    "rsvp {} on event {event_id} failed: {err:#}",
                    if attending { "on" } else { "off" }
                );
                if let Some(flight) = &flight {
                    self.apply_undo(flight.undo.clone());
                }
                self.push_notice(Notice::error("Failed to update RSVP"));
            }
        }
        if let Some(flight) = flight {
            self.requeue(flight.queued);
        }
    }
}
