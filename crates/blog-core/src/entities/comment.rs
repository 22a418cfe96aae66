//! Comment entity - a reply under a post, with its own like/dislike counters

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::reaction::Counters;
use crate::value_objects::Lifecycle;

/// Comment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Comment {
    pub id: Uuid,
    pub post_id: Uuid,
    pub author_id: Option<Uuid>,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl Comment {
    pub fn new(id: Uuid, post_id: Uuid, author_id: Uuid, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            post_id,
            author_id: Some(author_id),
            content,
            likes: 0,
            dislikes: 0,
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        }
    }

    #[inline]
    pub fn counters(&self) -> Counters {
        Counters::new(self.likes, self.dislikes)
    }
}
