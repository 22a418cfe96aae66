//! Business logic services
//!
//! Each service borrows a [`ServiceContext`] and orchestrates the domain ports
//! it holds.

pub mod attachment;
pub mod content;
pub mod context;
pub mod error;
pub mod reaction;
pub mod retention;

// Re-export all services for convenience
pub use attachment::AttachmentService;
pub use content::ContentService;
pub use context::{ServiceContext, ServiceContextBuilder, ServiceSettings};
pub use error::{ServiceError, ServiceResult};
pub use reaction::{ReactionOutcome, ReactionService};
pub use retention::{PurgeReport, RetentionService};
