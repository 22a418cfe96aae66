//! Reaction database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for reactions table
#[derive(Debug, Clone, FromRow)]
pub struct ReactionModel {
    pub id: Uuid,
    /// Cleared when the reacting user is purged
    pub user_id: Option<Uuid>,
    pub post_id: Option<Uuid>,
    pub comment_id: Option<Uuid>,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}

/// Like/dislike counters stored on a post or comment row
#[derive(Debug, Clone, Copy, FromRow)]
pub struct CountersModel {
    pub likes: i64,
    pub dislikes: i64,
}
