//! Repository traits (ports) - define the interface for data access
//!
//! These traits follow the Repository pattern from Domain-Driven Design.
//! The domain layer defines what it needs, and the infrastructure layer
//! provides the implementation.
//!
//! "Live" below means not soft-deleted.

use std::fmt;

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use uuid::Uuid;

use crate::entities::{Attachment, Counters, OwnerType, Reaction, ReactionTarget};
use crate::error::DomainError;

/// Result type for repository operations
pub type RepoResult<T> = Result<T, DomainError>;

// ============================================================================
// Post Repository
// ============================================================================

#[async_trait]
pub trait PostRepository: Send + Sync {
    /// Soft delete a post together with its comments, the reactions on both,
    /// and the attachments they own, in one transaction
    async fn soft_delete_cascade(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Comment Repository
// ============================================================================

#[async_trait]
pub trait CommentRepository: Send + Sync {
    /// Soft delete a comment, its reactions and its attachments in one transaction
    async fn soft_delete_cascade(&self, id: Uuid) -> RepoResult<()>;
}

// ============================================================================
// Attachment Repository
// ============================================================================

#[async_trait]
pub trait AttachmentRepository: Send + Sync {
    /// Live attachments for a set of owners of the same type
    async fn find_by_owners(
        &self,
        owner_ids: &[Uuid],
        owner_type: OwnerType,
    ) -> RepoResult<Vec<Attachment>>;

    /// Create a new attachment row
    async fn create(&self, attachment: &Attachment) -> RepoResult<()>;

    /// Create all rows or none
    async fn create_many(&self, attachments: &[Attachment]) -> RepoResult<()>;

    /// Soft delete the live attachments of an owner, returning how many were marked
    async fn soft_delete_by_owner(&self, owner_id: Uuid, owner_type: OwnerType)
        -> RepoResult<u64>;

    /// In one transaction, fetch every attachment soft-deleted before `cutoff`
    /// and hard-delete those rows. Returns the deleted rows so the caller can
    /// remove their blobs.
    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Attachment>>;
}

// ============================================================================
// Reaction Repository
// ============================================================================

#[async_trait]
pub trait ReactionRepository: Send + Sync {
    /// Find a user's live reaction on a target (unlocked read)
    async fn find(&self, user_id: Uuid, target: ReactionTarget) -> RepoResult<Option<Reaction>>;

    /// Open a unit of work for one toggle
    async fn begin(&self) -> RepoResult<Box<dyn ReactionUnitOfWork>>;
}

/// One atomic toggle: user check, target lock, ledger read, ledger write and
/// counter write.
///
/// Dropping the unit of work without calling [`ReactionUnitOfWork::commit`]
/// discards every change.
#[async_trait]
pub trait ReactionUnitOfWork: Send {
    /// Share-lock the live user row so the user cannot be deleted before commit.
    /// Returns `false` when the user is missing or soft-deleted.
    async fn lock_user(&mut self, user_id: Uuid) -> RepoResult<bool>;

    /// Lock the live target row and read its counters.
    ///
    /// Concurrent units of work on the same target wait here until the holder
    /// commits or rolls back; different targets never wait on each other.
    async fn lock_target(&mut self, target: ReactionTarget) -> RepoResult<Option<Counters>>;

    /// Read the user's reaction on the locked target
    async fn find_reaction(
        &mut self,
        user_id: Uuid,
        target: ReactionTarget,
    ) -> RepoResult<Option<Reaction>>;

    async fn insert_reaction(&mut self, reaction: &Reaction) -> RepoResult<()>;

    async fn set_polarity(&mut self, reaction_id: Uuid, is_liked: bool) -> RepoResult<()>;

    async fn delete_reaction(&mut self, reaction_id: Uuid) -> RepoResult<()>;

    async fn write_counters(&mut self, target: ReactionTarget, counters: Counters)
        -> RepoResult<()>;

    async fn commit(self: Box<Self>) -> RepoResult<()>;
}

// ============================================================================
// Purge Repository
// ============================================================================

/// Tables reclaimed by plain hard deletion. Attachments are handled through
/// [`AttachmentRepository::purge_deleted_before`] because their blobs must go too.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PurgeTable {
    Reactions,
    Comments,
    Posts,
    Categories,
    Roles,
    Users,
}

impl PurgeTable {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Reactions => "reactions",
            Self::Comments => "comments",
            Self::Posts => "posts",
            Self::Categories => "categories",
            Self::Roles => "roles",
            Self::Users => "users",
        }
    }
}

impl fmt::Display for PurgeTable {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[async_trait]
pub trait PurgeRepository: Send + Sync {
    /// Hard delete rows of `table` soft-deleted before `cutoff`, returning the count
    async fn purge_deleted_before(&self, table: PurgeTable, cutoff: DateTime<Utc>)
        -> RepoResult<u64>;
}
