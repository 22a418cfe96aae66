//! # blog-core
//!
//! Domain layer containing entities, value objects, the reaction state machine,
//! and the repository and blob-store ports.
//! This crate has zero dependencies on infrastructure (database, object storage, etc.).

pub mod entities;
pub mod error;
pub mod traits;
pub mod value_objects;

// Re-export commonly used types at crate root
pub use entities::{
    Attachment, Comment, Counters, OwnerType, Post, Reaction, ReactionAction, ReactionState,
    ReactionTarget, RowChange, Transition, User,
};
pub use error::DomainError;
pub use traits::{
    AttachmentRepository, BlobStore, BlobUpload, CommentRepository, PostRepository,
    PurgeRepository, PurgeTable, ReactionRepository, ReactionUnitOfWork, RepoResult,
    StorageError, StoredBlob,
};
pub use value_objects::Lifecycle;
