//! Ports implemented by the infrastructure crates

mod repositories;
mod storage;

pub use repositories::{
    AttachmentRepository, CommentRepository, PostRepository, PurgeRepository, PurgeTable,
    ReactionRepository, ReactionUnitOfWork, RepoResult,
};
pub use storage::{BlobStore, BlobUpload, StorageError, StoredBlob};
