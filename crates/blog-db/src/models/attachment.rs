//! Attachment database model

use chrono::{DateTime, Utc};
use sqlx::FromRow;
use uuid::Uuid;

/// Database model for attachments table
#[derive(Debug, Clone, FromRow)]
pub struct AttachmentModel {
    pub id: Uuid,
    pub external_id: Uuid,
    pub owner_type: String,
    pub path: String,
    pub mime_type: String,
    pub size: i64,
    pub original_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub deleted_at: Option<DateTime<Utc>>,
}
