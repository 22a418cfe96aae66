//! Post entity - a blog article carrying like/dislike counters

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::reaction::Counters;
use crate::value_objects::Lifecycle;

/// Post entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Post {
    pub id: Uuid,
    /// `None` once the author account has been purged
    pub author_id: Option<Uuid>,
    pub category_id: Option<Uuid>,
    pub title: String,
    pub content: String,
    pub likes: i64,
    pub dislikes: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl Post {
    /// Create a new Post with zeroed counters
    pub fn new(id: Uuid, author_id: Uuid, title: String, content: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            author_id: Some(author_id),
            category_id: None,
            title,
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
