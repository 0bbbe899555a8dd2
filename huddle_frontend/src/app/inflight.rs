use std::collections::{HashMap, VecDeque};

use huddle_backend::models::{AttendeeRecord, EntityId};

/// The logical target of an optimistic mutation. At most one mutation per
/// target is allowed in flight at a time.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Target {
    Post(EntityId),
    Event(EntityId),
    Message(EntityId),
}

/// A user action held back because its target already has a mutation in
/// flight. Dispatched in arrival order once the target frees up.
#[derive(Debug, Clone)]
pub enum PendingAction {
    LikePost(EntityId),
    AddComment {
        post_id: EntityId,
        content: String,
    },
    Rsvp {
        event_id: EntityId,
        attending: bool,
    },
    MarkRead {
        message_id: EntityId,
    },
}

impl PendingAction {
    pub fn target(&self) -> Target {
        match self {
            PendingAction::LikePost(post_id) => Target::Post(*post_id),
            PendingAction::AddComment { post_id, .. } => Target::Post(*post_id),
            PendingAction::Rsvp { event_id, .. } => Target::Event(*event_id),
            PendingAction::MarkRead { message_id } => Target::Message(*message_id),
        }
    }
}

/// The minimal delta needed to revert a tentative change if its service
/// call fails.
#[derive(Debug, Clone)]
pub enum Undo {
    /// Likes toggle, so undoing is toggling again.
    ToggleLike { post_id: EntityId },
    RemoveComment {
        post_id: EntityId,
        comment_id: EntityId,
    },
    RemoveAttendee {
        event_id: EntityId,
        actor_id: String,
    },
    RestoreAttendee {
        event_id: EntityId,
        attendee: AttendeeRecord,
    },
    RemoveMessage { local_id: EntityId },
    UnmarkRead {
        message_id: EntityId,
        actor_id: String,
    },
}

/// One in-flight mutation: how to revert it, and what is queued behind it.
#[derive(Debug)]
pub struct Flight {
    pub undo: Undo,
    pub queued: VecDeque<PendingAction>,
}

/// Registry enforcing the one-in-flight-per-target rule.
#[derive(Default)]
pub struct InFlight {
    flights: HashMap<Target, Flight>,
}

impl InFlight {
    /// Claims the target. Returns false if a mutation is already in flight,
    /// in which case the caller should `defer` the action instead.
    pub fn begin(&mut self, target: Target, undo: Undo) -> bool {
        if self.flights.contains_key(&target) {
            return false;
        }
        self.flights.insert(
            target,
            Flight {
                undo,
                queued: VecDeque::new(),
            },
        );
        true
    }

    /// Queues an action behind the mutation currently holding its target.
    pub fn defer(&mut self, action: PendingAction) {
        if let Some(flight) = self.flights.get_mut(&action.target()) {
            flight.queued.push_back(action);
        }
    }

    /// Releases the target, handing back the undo delta and anything queued.
    pub fn finish(&mut self, target: Target) -> Option<Flight> {
        self.flights.remove(&target)
    }

    pub fn is_busy(&self, target: Target) -> bool {
        self.flights.contains_key(&target)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_begin_claims_a_free_target_and_rejects_a_busy_one() {
        let mut inflight = InFlight::default();
        assert!(inflight.begin(Target::Post(1), Undo::ToggleLike { post_id: 1 }));
        assert!(!inflight.begin(Target::Post(1), Undo::ToggleLike { post_id: 1 }));
        // A different target is unaffected.
        assert!(inflight.begin(Target::Post(2), Undo::ToggleLike { post_id: 2 }));
    }

    #[test]
    fn test_deferred_actions_come_back_in_order_on_finish() {
        let mut inflight = InFlight::default();
        inflight.begin(Target::Post(1), Undo::ToggleLike { post_id: 1 });
        inflight.defer(PendingAction::LikePost(1));
        inflight.defer(PendingAction::AddComment {
            post_id: 1,
            content: "hi".into(),
        });

        let flight = inflight.finish(Target::Post(1)).expect("flight present");
        assert_eq!(flight.queued.len(), 2);
        assert!(matches!(flight.queued[0], PendingAction::LikePost(1)));
        assert!(matches!(flight.queued[1], PendingAction::AddComment { .. }));
        assert!(!inflight.is_busy(Target::Post(1)));
    }

    #[test]
    fn test_finish_on_an_idle_target_is_none() {
        let mut inflight = InFlight::default();
        assert!(inflight.finish(Target::Event(9)).is_none());
    }
}
