//! Attachment entity <-> model mapper

use blog_core::entities::{Attachment, OwnerType};
use blog_core::error::DomainError;
use blog_core::value_objects::Lifecycle;

use crate::models::AttachmentModel;

/// Convert AttachmentModel to Attachment entity
impl TryFrom<AttachmentModel> for Attachment {
    type Error = DomainError;

    fn try_from(model: AttachmentModel) -> Result<Self, Self::Error> {
        let owner_type: OwnerType = model.owner_type.parse().map_err(DomainError::DatabaseError)?;

        Ok(Attachment {
            id: model.id,
            external_id: model.external_id,
            owner_type,
            path: model.path,
            mime_type: model.mime_type,
            size: model.size,
            original_name: model.original_name,
            created_at: model.created_at,
            lifecycle: Lifecycle::from_deleted_at(model.deleted_at),
        })
    }
}

/// Convert Attachment entity reference to values for database insertion
pub struct AttachmentInsert<'a> {
    pub id: uuid::Uuid,
    pub external_id: uuid::Uuid,
    pub owner_type: &'static str,
    pub path: &'a str,
    pub mime_type: &'a str,
    pub size: i64,
    pub original_name: Option<&'a str>,
    pub created_at: chrono::DateTime<chrono::Utc>,
}

impl<'a> AttachmentInsert<'a> {
    pub fn new(attachment: &'a Attachment) -> Self {
        Self {
            id: attachment.id,
            external_id: attachment.external_id,
            owner_type: attachment.owner_type.as_str(),
            path: &attachment.path,
            mime_type: &attachment.mime_type,
            size: attachment.size,
            original_name: attachment.original_name.as_deref(),
            created_at: attachment.created_at,
        }
    }
}
