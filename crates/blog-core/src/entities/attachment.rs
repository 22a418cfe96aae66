//! Attachment entity - metadata row for a blob held in object storage

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::traits::StoredBlob;
use crate::value_objects::Lifecycle;

/// Kind of entity that owns an attachment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum OwnerType {
    Post,
    User,
    Comment,
}

impl OwnerType {
    /// Database representation
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Post => "POST",
            Self::User => "USER",
            Self::Comment => "COMMENT",
        }
    }
}

impl fmt::Display for OwnerType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for OwnerType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "POST" => Ok(Self::Post),
            "USER" => Ok(Self::User),
            "COMMENT" => Ok(Self::Comment),
            other => Err(format!("unknown attachment owner type: {other}")),
        }
    }
}

/// Attachment entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Attachment {
    pub id: Uuid,
    /// Id of the owning entity
    pub external_id: Uuid,
    pub owner_type: OwnerType,
    /// Object identifier in the blob store
    pub path: String,
    pub mime_type: String,
    pub size: i64,
    pub original_name: Option<String>,
    pub created_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl Attachment {
    /// Build the metadata row for a blob that was just written
    pub fn from_stored(
        id: Uuid,
        external_id: Uuid,
        owner_type: OwnerType,
        blob: StoredBlob,
    ) -> Self {
        Self {
            id,
            external_id,
            owner_type,
            path: blob.object_id,
            mime_type: blob.content_type,
            size: blob.byte_size,
            original_name: blob.original_name,
            created_at: Utc::now(),
            lifecycle: Lifecycle::Active,
        }
    }
}
