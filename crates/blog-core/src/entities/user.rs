//! User entity - an account that authors content and reacts to it

use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::value_objects::Lifecycle;

/// User entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct User {
    pub id: Uuid,
    pub username: String,
    pub email: String,
    pub role_id: Option<Uuid>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl User {
    /// Create a new User with required fields
    pub fn new(id: Uuid, username: String, email: String) -> Self {
        let now = Utc::now();
        Self {
            id,
            username,
            email,
            role_id: None,
            created_at: now,
            updated_at: now,
            lifecycle: Lifecycle::Active,
        }
    }
}
