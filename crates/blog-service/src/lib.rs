//! # blog-service
//!
//! Application layer: keeps blobs, rows and counters consistent across the
//! lifecycle of blog content.
//!
//! - [`AttachmentService`] writes blobs before metadata and compensates on failure
//! - [`ReactionService`] runs the like/dislike toggle as one locked transaction
//! - [`RetentionService`] purges soft-deleted rows (and their blobs) on a schedule
//! - [`ContentService`] soft-deletes posts and comments with everything they own

pub mod services;

pub use services::{
    AttachmentService, ContentService, PurgeReport, ReactionOutcome, ReactionService,
    RetentionService, ServiceContext, ServiceContextBuilder, ServiceError, ServiceResult,
    ServiceSettings,
};
