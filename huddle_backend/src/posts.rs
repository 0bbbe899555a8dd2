use std::sync::Mutex;

use chrono::Utc;

use crate::config::{delay, Latency};
use crate::error::{EntityKind, ServiceError, ServiceResult};
use crate::ids::next_id;
use crate::models::{
    AuthorSnapshot, CommentRecord, EntityId, NewPost, PostPatch, PostRecord, ProfileSnapshot,
    Session,
};

/// Activity-feed posts. The collection is owned exclusively by this service;
/// every operation returns fresh copies so callers can never alias the
/// stored records.
pub struct PostService {
    posts: Mutex<Vec<PostRecord>>,
    latency: Latency,
}

impl PostService {
    pub fn new(seed: Vec<PostRecord>, latency: Latency) -> Self {
        Self {
            posts: Mutex::new(seed),
            latency,
        }
    }

    /// Every post, newest first.
    pub async fn get_all(&self) -> ServiceResult<Vec<PostRecord>> {
        delay(self.latency.list).await;
        let posts = self.posts.lock().expect("post collection poisoned");
        let mut copy = posts.clone();
        copy.sort_by(|a, b| b.timestamp.cmp(&a.timestamp));
        Ok(copy)
    }

    pub async fn get_by_id(&self, id: EntityId) -> ServiceResult<PostRecord> {
        delay(self.latency.fetch).await;
        let posts = self.posts.lock().expect("post collection poisoned");
        posts
            .iter()
            .find(|p| p.id == id)
            .cloned()
            .ok_or(ServiceError::not_found(EntityKind::Post, id))
    }

    /// Creates a post authored by the session actor. Likes and comments
    /// start empty; the author snapshot is stamped online.
    pub async fn create(&self, input: NewPost, session: &Session) -> ServiceResult<PostRecord> {
        delay(self.latency.create).await;
        let mut posts = self.posts.lock().expect("post collection poisoned");
        let post = PostRecord {
            id: next_id(posts.iter().map(|p| p.id)),
            content: input.content,
            image_url: input.image_url,
            author_id: session.actor_id.clone(),
            author: AuthorSnapshot {
                name: session.name.clone(),
                avatar: session.avatar.clone(),
                online: true,
            },
            likes: Vec::new(),
            comments: Vec::new(),
            timestamp: Utc::now(),
        };
        tracing::debug!(post_id = post.id, "post created");
        // Newest first, so new posts go to the front.
        posts.insert(0, post.clone());
        Ok(post)
    }

    pub async fn update(&self, id: EntityId, patch: PostPatch) -> ServiceResult<PostRecord> {
        delay(self.latency.update).await;
        let mut posts = self.posts.lock().expect("post collection poisoned");
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Post, id))?;
        if let Some(content) = patch.content {
            post.content = content;
        }
        if let Some(image_url) = patch.image_url {
            post.image_url = image_url;
        }
        Ok(post.clone())
    }

    pub async fn delete(&self, id: EntityId) -> ServiceResult<()> {
        delay(self.latency.delete).await;
        let mut posts = self.posts.lock().expect("post collection poisoned");
        let index = posts
            .iter()
            .position(|p| p.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Post, id))?;
        posts.remove(index);
        tracing::debug!(post_id = id, "post deleted");
        Ok(())
    }

    /// Toggles the session actor's membership in the post's like set:
    /// present becomes absent, absent becomes present.
    pub async fn like(&self, id: EntityId, session: &Session) -> ServiceResult<PostRecord> {
        delay(self.latency.toggle).await;
        let mut posts = self.posts.lock().expect("post collection poisoned");
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Post, id))?;
        match post.likes.iter().position(|actor| *actor == session.actor_id) {
            Some(index) => {
                post.likes.remove(index);
            }
            None => post.likes.push(session.actor_id.clone()),
        }
        Ok(post.clone())
    }

    /// Appends a comment snapshot with a freshly allocated identifier and
    /// the current timestamp.
    pub async fn add_comment(
        &self,
        id: EntityId,
        content: &str,
        session: &Session,
    ) -> ServiceResult<PostRecord> {
        delay(self.latency.append).await;
        let mut posts = self.posts.lock().expect("post collection poisoned");
        let post = posts
            .iter_mut()
            .find(|p| p.id == id)
            .ok_or(ServiceError::not_found(EntityKind::Post, id))?;
        let comment = CommentRecord {
            id: next_id(post.comments.iter().map(|c| c.id)),
            content: content.to_string(),
            author: ProfileSnapshot {
                name: session.name.clone(),
                avatar: session.avatar.clone(),
            },
            timestamp: Utc::now(),
        };
        post.comments.push(comment);
        Ok(post.clone())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::seed::SeedData;

    fn service() -> PostService {
        let seed = SeedData::builtin().expect("seed parses");
        PostService::new(seed.posts, Latency::zero())
    }

    fn session() -> Session {
        Session::new("you", "You")
    }

    #[tokio::test]
    async fn test_create_then_get_returns_the_same_record() {
        let service = service();
        let created = service
            .create(
                NewPost {
                    content: "Hello community".into(),
                    image_url: None,
                },
                &session(),
            )
            .await
            .unwrap();
        let fetched = service.get_by_id(created.id).await.unwrap();
        assert_eq!(created, fetched);
    }

    #[tokio::test]
    async fn test_new_post_is_first_with_empty_likes_and_comments() {
        let service = service();
        let created = service
            .create(
                NewPost {
                    content: "Hello community".into(),
                    image_url: None,
                },
                &session(),
            )
            .await
            .unwrap();
        let all = service.get_all().await.unwrap();
        assert_eq!(all[0].id, created.id);
        assert!(all[0].likes.is_empty());
        assert!(all[0].comments.is_empty());
    }

    #[tokio::test]
    async fn test_delete_then_get_is_not_found() {
        let service = service();
        let created = service
            .create(
                NewPost {
                    content: "short-lived".into(),
                    image_url: None,
                },
                &session(),
            )
            .await
            .unwrap();
        service.delete(created.id).await.unwrap();
        let err = service.get_by_id(created.id).await.unwrap_err();
        assert!(matches!(
            err,
            ServiceError::NotFound {
                kind: EntityKind::Post,
                ..
            }
        ));
    }

    #[tokio::test]
    async fn test_like_twice_restores_original_membership() {
        let service = service();
        let all = service.get_all().await.unwrap();
        let target = all[0].id;
        let before = all[0].likes.clone();

        let once = service.like(target, &session()).await.unwrap();
        assert!(once.likes.contains(&"you".to_string()));
        let twice = service.like(target, &session()).await.unwrap();
        assert_eq!(twice.likes, before);
    }

    #[tokio::test]
    async fn test_like_never_duplicates_an_actor() {
        let service = service();
        let target = service.get_all().await.unwrap()[0].id;
        service.like(target, &session()).await.unwrap();
        let liked = service.get_by_id(target).await.unwrap();
        let count = liked.likes.iter().filter(|a| *a == "you").count();
        assert_eq!(count, 1);
    }

    #[tokio::test]
    async fn test_comments_get_fresh_sequential_ids() {
        let service = service();
        let target = service.get_all().await.unwrap()[0].id;
        let first = service
            .add_comment(target, "first", &session())
            .await
            .unwrap();
        let second = service
            .add_comment(target, "second", &session())
            .await
            .unwrap();
        let first_id = first.comments.last().unwrap().id;
        let second_id = second.comments.last().unwrap().id;
        assert_eq!(second_id, first_id + 1);
        assert_eq!(second.comments.last().unwrap().content, "second");
    }

    #[tokio::test]
    async fn test_update_cannot_touch_the_identifier() {
        let service = service();
        let target = service.get_all().await.unwrap()[0].id;
        let updated = service
            .update(
                target,
                PostPatch {
                    content: Some("edited".into()),
                    image_url: Some(None),
                },
            )
            .await
            .unwrap();
        assert_eq!(updated.id, target);
        assert_eq!(updated.content, "edited");
        assert_eq!(updated.image_url, None);
    }

    #[tokio::test]
    async fn test_mutations_on_missing_posts_are_not_found() {
        let service = service();
        assert!(service.like(9999, &session()).await.is_err());
        assert!(service.add_comment(9999, "hi", &session()).await.is_err());
        assert!(service.delete(9999).await.is_err());
        assert!(service.update(9999, PostPatch::default()).await.is_err());
    }

    #[tokio::test]
    async fn test_returned_copies_do_not_alias_the_store() {
        let service = service();
        let mut copy = service.get_all().await.unwrap();
        copy[0].content = "tampered".into();
        let fresh = service.get_by_id(copy[0].id).await.unwrap();
        assert_ne!(fresh.content, "tampered");
    }
}
