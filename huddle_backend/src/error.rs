use thiserror::Error;

use crate::models::EntityId;

/// Entity kinds the simulated services manage, used to give lookup
/// failures enough context for the caller to act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EntityKind {
    Post,
    Event,
    Member,
    Message,
    Community,
}

impl std::fmt::Display for EntityKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            EntityKind::Post => "post",
            EntityKind::Event => "event",
            EntityKind::Member => "member",
            EntityKind::Message => "message",
            EntityKind::Community => "community",
        };
        f.write_str(name)
    }
}

/// Errors surfaced by the service layer. None of these are retried by the
/// services themselves; the caller decides whether to roll back or retry.
#[derive(Debug, Error)]
pub enum ServiceError {
    /// The referenced identifier is absent from the collection.
    #[error("{kind} {id} not found")]
    NotFound { kind: EntityKind, id: EntityId },

    /// RSVP against an event whose attendee list is at capacity.
    #[error("event {id} is full (capacity {capacity})")]
    EventFull { id: EntityId, capacity: u32 },

    /// Badge definitions are keyed by slug rather than numeric id.
    #[error("badge '{slug}' not found")]
    UnknownBadge { slug: String },

    /// Caller-supplied data failed a presence check before reaching a
    /// collection.
    #[error("invalid request: {message}")]
    Validation { message: String },
}

impl ServiceError {
    pub fn not_found(kind: EntityKind, id: EntityId) -> Self {
        ServiceError::NotFound { kind, id }
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, ServiceError::NotFound { .. })
    }
}

pub type ServiceResult<T> = Result<T, ServiceError>;
