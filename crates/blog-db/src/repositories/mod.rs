//! Repository implementations
//!
//! PostgreSQL implementations of the repository traits defined in blog-core.
//! Each repository handles database operations for a specific domain entity.

mod attachment;
mod error;
mod post;
mod purge;
mod reaction;

pub use attachment::PgAttachmentRepository;
pub use post::{PgCommentRepository, PgPostRepository};
pub use purge::PgPurgeRepository;
pub use reaction::{PgReactionRepository, PgReactionUnitOfWork};
