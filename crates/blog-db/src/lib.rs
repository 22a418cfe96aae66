//! # blog-db
//!
//! Database layer implementing repository traits with PostgreSQL via SQLx.
//!
//! ## Overview
//!
//! This crate provides PostgreSQL implementations for all repository traits
//! defined in `blog-core`. It handles:
//!
//! - Connection pool management and migrations
//! - Database models with SQLx `FromRow` derives
//! - Entity ↔ Model mappers
//! - Repository implementations, including the transactional reaction store
//!
//! ## Usage
//!
//! ```rust,ignore
//! use blog_db::pool::{create_pool, DatabaseConfig};
//! use blog_db::repositories::PgPostRepository;
//! use blog_core::traits::PostRepository;
//!
//! async fn example(config: &blog_common::AppConfig) -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool(&DatabaseConfig::from(&config.database)).await?;
//!     let post_repo = PgPostRepository::new(pool);
//!
//!     // Use the repository...
//!     Ok(())
//! }
//! ```

pub mod mappers;
pub mod models;
pub mod pool;
pub mod repositories;

// Re-export commonly used types
pub use pool::{create_pool, run_migrations, DatabaseConfig, PgPool};
pub use repositories::{
    PgAttachmentRepository, PgCommentRepository, PgPostRepository, PgPurgeRepository,
    PgReactionRepository, PgReactionUnitOfWork,
};
