use std::sync::Mutex;

use chrono::Utc;

use crate::config::{delay, Latency};
use crate::error::{EntityKind, ServiceError, ServiceResult};
use crate::ids::next_id;
use crate::models::{EntityId, MessagePatch, MessageRecord, NewMessage, ProfileSnapshot, Session};

/// Community chat messages with per-actor read receipts.
pub struct MessageService {
    messages: Mutex<Vec<MessageRecord>>,
    latency: Latency,
}

impl MessageService {
    pub fn new(seed: Vec<MessageRecord>, latency: Latency) -> Self {
        Self {
            messages: Mutex::new(seed),
            latency,
        }
    }

    /// Every message in chat order, oldest first.
    pub async fn get_all(&self) -> ServiceResult<Vec<MessageRecord>> {
        delay(self.latency.list).await;
        let messages = self.messages.lock().expect("message collection poisoned");
        let mut copy = messages.clone();
        copy.sort_by(|a, b| a.timestamp.cmp(&b.timestamp));
        Ok(copy)
    }

    pub async fn get_by_id(&self, id: EntityId) -> ServiceResult<MessageRecord> {
        delay(self.latency.fetch).await;
        let messages = self.messages.lock().expect("message collection poisoned");
        messages
            .iter()
            .find(|m| m.id == id)
            .cloned()
            .ok_or(ServiceError::not_found(EntityKind::Message, id))
    }

    /// Creates a message from the session actor, who has implicitly read it.
    pub async fn create(
        &self,
        input: NewMessage,
        session: &Session,
    ) -> ServiceResult<MessageRecord> {
        delay(self.latency.send).await;
        let mut messages = self.messages.lock().expect("message collection poisoned");
        let message = MessageRecord {
            id: next_id(messages.iter().map(|m| m.id)),
            content: input.content,
            sender_id: session.actor_id.clone(),
            sender: ProfileSnapshot {
                name: session.name.clone(),
                avatar: session.avatar.clone(),
            },
            timestamp: Utc::now(),
            read_by: vec![session.actor_id.clone()],
        };
        tracing::debug!(message_id = message.id, "message sent");
        messages.push(message.clone());
        Ok(message)
    }

    pub async fn update(&self, id: EntityId, patch: MessagePatch) -> ServiceResult<MessageRecord> {
        delay(self.latency.update).await;
        let mut messages = self.messages.lock().expect("message collection poisoned");
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Message, id))?;
        if let Some(content) = patch.content {
            message.content = content;
        }
        Ok(message.clone())
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        delay(self.latency.send).await;
        let mut messages = self.messages.lock().expect("message collection poisoned");
        let index = messages
            .iter()
            .position(|m| m.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Message, id))?;
        messages.remove(index);
        Ok(())
    }

    /// Adds the actor to the message's read set. Idempotent.
    pub async fn mark_as_read(&self, id: EntityId, actor_id: &str) -> ServiceResult<MessageRecord> {
        delay(self.latency.ack).await;
        let mut messages = self.messages.lock().expect("message collection poisoned");
        let message = messages
            .iter_mut()
            .find(|m| m.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Message, id))?;
        if !message.read_by.iter().any(|r| r == actor_id) {
            message.read_by.push(actor_id.to_string());
        }
        Ok(message.clone())
    }

    /// Messages the actor has not read, excluding the actor's own.
    pub async fn unread_count(&self, actor_id: &str) -> ServiceResult<usize> {
        delay(self.latency.count).await;
        let messages = self.messages.lock().expect("message collection poisoned");
        Ok(messages
            .iter()
            .filter(|m| m.sender_id != actor_id && !m.read_by.iter().any(|r| r == actor_id))
            .count())
    }

    /// The `limit` newest messages, newest first.
    pub async fn recent(&self, limit: usize) -> ServiceResult<Vec<MessageRecord>> {
        delay(self.latency.fetch).await;
        let messages = self.messages.lock().expect("message collection poisoned");
        let mut copy = messages.clone();
        copy.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        copy.truncate(limit);
        Ok(copy)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;
    use chrono::TimeZone;

    fn service() -> MessageService {
        let seed = SeedData::builtin().expect("seed parses");
        MessageService::new(seed.messages, Latency::zero())
    }

    fn session(actor: &str) -> Session {
        Session::new(actor, actor.to_uppercase())
    }

    fn stamped(id: EntityId, sender: &str, hour: u32) -> MessageRecord {
        MessageRecord {
            id,
            content: format!("message {id}"),
            sender_id: sender.to_string(),
            sender: ProfileSnapshot {
                name: sender.to_uppercase(),
                avatar: None,
            },
            timestamp: Utc.with_ymd_and_hms(2026, 3, 1, hour, 0, 0).unwrap(),
            read_by: vec![sender.to_string()],
        }
    }

    #[tokio::test]
    async fn test_get_all_sorts_oldest_first_regardless_of_seed_order() {
        // Seeded deliberately out of order: T3, T1, T2.
        let scrambled = vec![stamped(3, "ana", 12), stamped(1, "ben", 8), stamped(2, "ana", 10)];
        let service = MessageService::new(scrambled, Latency::zero());
        let all = service.get_all().await.unwrap();
        let ids: Vec<_> = all.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![1, 2, 3]);
    }

    #[tokio::test]
    async fn test_create_stamps_sender_as_reader() {
        let service = service();
        let message = service
            .create(
                NewMessage {
                    content: "hello all".into(),
                },
                &session("you"),
            )
            .await
            .unwrap();
        assert_eq!(message.read_by, vec!["you".to_string()]);
        assert!(message.is_read_by("you"));
        assert_eq!(service.get_by_id(message.id).await.unwrap(), message);
    }

    #[tokio::test]
    async fn test_unread_count_skips_own_and_read_messages() {
        let seed = vec![stamped(1, "ana", 8), stamped(2, "ben", 9), stamped(3, "you", 10)];
        let service = MessageService::new(seed, Latency::zero());

        // Two messages from others, none read yet.
        assert_eq!(service.unread_count("you").await.unwrap(), 2);

        service.mark_as_read(1, "you").await.unwrap();
        assert_eq!(service.unread_count("you").await.unwrap(), 1);

        // Marking twice changes nothing.
        let marked = service.mark_as_read(1, "you").await.unwrap();
        assert_eq!(
            marked.read_by.iter().filter(|r| *r == "you").count(),
            1
        );
        assert_eq!(service.unread_count("you").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_recent_returns_newest_first_and_truncates() {
        let seed = vec![stamped(1, "ana", 8), stamped(2, "ben", 9), stamped(3, "ana", 10)];
        let service = MessageService::new(seed, Latency::zero());
        let recent = service.recent(2).await.unwrap();
        let ids: Vec<_> = recent.iter().map(|m| m.id).collect();
        assert_eq!(ids, vec![3, 2]);
    }

    #[tokio::test]
    async fn test_mark_as_read_on_missing_message_is_not_found() {
        let service = service();
        let err = service.mark_as_read(9999, "you").await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: EntityKind::Message,
                id: 9999
            }
        ));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let message = service
            .create(
                NewMessage {
                    content: "going, going".into(),
                },
                &session("you"),
            )
            .await
            .unwrap();
        service.delete(message.id).await.unwrap();
        assert!(service.get_by_id(message.id).await.is_err());
    }
}
