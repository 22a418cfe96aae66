//! Soft-delete lifecycle of a persisted row

use chrono::{DateTime, Utc};

/// Whether a row is live or soft-deleted.
///
/// Rows carry a nullable `deleted_at` column in the database; this type is the
/// domain-side view of that column.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Lifecycle {
    #[default]
    Active,
    Deleted { at: DateTime<Utc> },
}

impl Lifecycle {
    /// Build from a nullable `deleted_at` column
    pub fn from_deleted_at(deleted_at: Option<DateTime<Utc>>) -> Self {
        match deleted_at {
            Some(at) => Self::Deleted { at },
            None => Self::Active,
        }
    }

    /// Back to the nullable column representation
    #[inline]
    pub fn deleted_at(&self) -> Option<DateTime<Utc>> {
        match self {
            Self::Active => None,
            Self::Deleted { at } => Some(*at),
        }
    }

    #[inline]
    pub fn is_active(&self) -> bool {
        matches!(self, Self::Active)
    }

    #[inline]
    pub fn is_deleted(&self) -> bool {
        !self.is_active()
    }

    /// A row is purgeable once it was soft-deleted strictly before `cutoff`
    pub fn is_purgeable(&self, cutoff: DateTime<Utc>) -> bool {
        match self {
            Self::Active => false,
            Self::Deleted { at } => *at < cutoff,
        }
    }
}
