use std::sync::Mutex;

use chrono::{DateTime, Utc};

use crate::config::{delay, Latency};
use crate::error::{EntityKind, ServiceError, ServiceResult};
use crate::ids::next_id;
use crate::models::{
    AttendeeRecord, EntityId, EventPatch, EventRecord, NewEvent, ProfileSnapshot, Session,
};

/// Community events with capacity-constrained RSVPs.
pub struct EventService {
    events: Mutex<Vec<EventRecord>>,
    latency: Latency,
}

impl EventService {
    pub fn new(seed: Vec<EventRecord>, latency: Latency) -> Self {
        Self {
            events: Mutex::new(seed),
            latency,
        }
    }

    /// Every event, soonest first.
    pub async fn get_all(&self) -> ServiceResult<Vec<EventRecord>> {
        delay(self.latency.list).await;
        let events = self.events.lock().expect("event collection poisoned");
        let mut copy = events.clone();
        copy.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(copy)
    }

    pub async fn get_by_id(&self, id: EntityId) -> ServiceResult<EventRecord> {
        delay(self.latency.fetch).await;
        let events = self.events.lock().expect("event collection poisoned");
        events
            .iter()
            .find(|e| e.id == id)
            .cloned()
            .ok_or(ServiceError::not_found(EntityKind::Event, id))
    }

    pub async fn create(&self, input: NewEvent, session: &Session) -> ServiceResult<EventRecord> {
        delay(self.latency.create).await;
        let mut events = self.events.lock().expect("event collection poisoned");
        let event = EventRecord {
            id: next_id(events.iter().map(|e| e.id)),
            title: input.title,
            description: input.description,
            date: input.date,
            location: input.location,
            organizer_id: session.actor_id.clone(),
            organizer: ProfileSnapshot {
                name: session.name.clone(),
                avatar: session.avatar.clone(),
            },
            attendees: Vec::new(),
            max_attendees: input.max_attendees,
            created_at: Utc::now(),
        };
        tracing::debug!(event_id = event.id, "event created");
        events.push(event.clone());
        Ok(event)
    }

    pub async fn update(&self, id: EntityId, patch: EventPatch) -> ServiceResult<EventRecord> {
        delay(self.latency.update).await;
        let mut events = self.events.lock().expect("event collection poisoned");
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Event, id))?;
        if let Some(title) = patch.title {
            event.title = title;
        }
        if let Some(description) = patch.description {
            event.description = description;
        }
        if let Some(date) = patch.date {
            event.date = date;
        }
        if let Some(location) = patch.location {
            event.location = location;
        }
        if let Some(max_attendees) = patch.max_attendees {
            event.max_attendees = max_attendees;
        }
        Ok(event.clone())
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        delay(self.latency.delete).await;
        let mut events = self.events.lock().expect("event collection poisoned");
        let index = events
            .iter()
            .position(|e| e.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Event, id))?;
        events.remove(index);
        tracing::debug!(event_id = id, "event deleted");
        Ok(())
    }

    /// Adds or removes the session actor's RSVP. Joining a full event fails
    /// with `EventFull`; asking for a state that already holds is a no-op.
    pub async fn rsvp(
        &self,
        id: EntityId,
        attending: bool,
        session: &Session,
    ) -> ServiceResult<EventRecord> {
        delay(self.latency.append).await;
        let mut events = self.events.lock().expect("event collection poisoned");
        let event = events
            .iter_mut()
            .find(|e| e.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Event, id))?;

        let position = event
            .attendees
            .iter()
            .position(|a| a.actor_id == session.actor_id);
        match (attending, position) {
            (true, None) => {
                if let Some(capacity) = event.max_attendees {
                    if event.attendees.len() >= capacity as usize {
                        return Err(ServiceError::EventFull { id, capacity });
                    }
                }
                event.attendees.push(AttendeeRecord {
                    actor_id: session.actor_id.clone(),
                    name: session.name.clone(),
                    avatar: session.avatar.clone(),
                    rsvp_at: Utc::now(),
                });
            }
            (false, Some(index)) => {
                event.attendees.remove(index);
            }
            // Requested state already holds.
            (true, Some(_)) | (false, None) => {}
        }
        Ok(event.clone())
    }

    /// Events at or after `now`, soonest first.
    pub async fn upcoming(&self, now: DateTime<Utc>) -> ServiceResult<Vec<EventRecord>> {
        delay(self.latency.filter).await;
        let events = self.events.lock().expect("event collection poisoned");
        let mut copy: Vec<_> = events.iter().filter(|e| e.date >= now).cloned().collect();
        copy.sort_by(|a, b| a.date.cmp(&b.date));
        Ok(copy)
    }

    /// Events before `now`, most recent first.
    pub async fn past(&self, now: DateTime<Utc>) -> ServiceResult<Vec<EventRecord>> {
        delay(self.latency.filter).await;
        let events = self.events.lock().expect("event collection poisoned");
        let mut copy: Vec<_> = events.iter().filter(|e| e.date < now).cloned().collect();
        copy.sort_by(|a, b| b.date.cmp(&a.date));
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;
    use chrono::TimeZone;

    fn service() -> EventService {
        let seed = SeedData::builtin().expect("seed parses");
        EventService::new(seed.events, Latency::zero())
    }

    fn session(actor: &str) -> Session {
        Session::new(actor, actor.to_uppercase())
    }

    async fn tiny_event(service: &EventService, capacity: Option<u32>) -> EventRecord {
        service
            .create(
                NewEvent {
                    title: "Board game night".into(),
                    description: "Bring snacks".into(),
                    date: Utc.with_ymd_and_hms(2030, 1, 15, 19, 0, 0).unwrap(),
                    location: "Community hall".into(),
                    max_attendees: capacity,
                },
                &session("organizer"),
            )
            .await
            .unwrap()
    }

    #[tokio::test]
    async fn test_create_then_get_returns_the_same_record() {
        let service = service();
        let created = tiny_event(&service, None).await;
        assert_eq!(service.get_by_id(created.id).await.unwrap(), created);
        assert!(created.attendees.is_empty());
    }

    #[tokio::test]
    async fn test_get_all_sorts_by_date_ascending() {
        let service = service();
        let all = service.get_all().await.unwrap();
        assert!(all.windows(2).all(|pair| pair[0].date <= pair[1].date));
    }

    #[tokio::test]
    async fn test_third_rsvp_against_capacity_two_fails() {
        let service = service();
        let event = tiny_event(&service, Some(2)).await;

        service.rsvp(event.id, true, &session("ana")).await.unwrap();
        service.rsvp(event.id, true, &session("ben")).await.unwrap();
        let err = service
            .rsvp(event.id, true, &session("cho"))
            .await
            .unwrap_err();
        assert!(matches!(err, ServiceError::EventFull { capacity: 2, .. }));

        // The failed join must not have appended anyone.
        let after = service.get_by_id(event.id).await.unwrap();
        assert_eq!(after.attendees.len(), 2);
        assert!(!after.is_attending("cho"));
    }

    #[tokio::test]
    async fn test_rsvp_on_then_off_restores_attendees() {
        let service = service();
        let event = tiny_event(&service, None).await;
        let before = event.attendees.clone();

        service.rsvp(event.id, true, &session("ana")).await.unwrap();
        let after = service
            .rsvp(event.id, false, &session("ana"))
            .await
            .unwrap();
        assert_eq!(after.attendees, before);
    }

    #[tokio::test]
    async fn test_repeated_join_is_a_noop_not_a_duplicate() {
        let service = service();
        let event = tiny_event(&service, None).await;
        service.rsvp(event.id, true, &session("ana")).await.unwrap();
        let again = service.rsvp(event.id, true, &session("ana")).await.unwrap();
        assert_eq!(again.attendees.len(), 1);

        // Leaving when not attending is equally a no-op.
        let unchanged = service
            .rsvp(event.id, false, &session("ben"))
            .await
            .unwrap();
        assert_eq!(unchanged.attendees.len(), 1);
    }

    #[tokio::test]
    async fn test_upcoming_and_past_partition_on_now() {
        let service = service();
        let now = Utc.with_ymd_and_hms(2026, 8, 1, 0, 0, 0).unwrap();
        let upcoming = service.upcoming(now).await.unwrap();
        let past = service.past(now).await.unwrap();

        assert!(upcoming.iter().all(|e| e.date >= now));
        assert!(past.iter().all(|e| e.date < now));
        assert!(upcoming.windows(2).all(|p| p[0].date <= p[1].date));
        assert!(past.windows(2).all(|p| p[0].date >= p[1].date));

        let total = service.get_all().await.unwrap().len();
        assert_eq!(upcoming.len() + past.len(), total);
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let event = tiny_event(&service, None).await;
        service.delete(event.id).await.unwrap();
        let err = service.get_by_id(event.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: EntityKind::Event,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_rsvp_on_missing_event_is_not_found() {
        let service = service();
        let err = service.rsvp(9999, true, &session("ana")).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: EntityKind::Event,
                id: 9999
            }
        ));
    }
}
