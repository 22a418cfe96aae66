//! Entity to model mappers
//!
//! This module provides conversions between domain entities (blog-core) and database models.
//! - `From<Model> for Entity` / `TryFrom<Model> for Entity`: database rows to domain objects
//! - `*Insert` structs: Prepare entity data for database operations

mod attachment;
mod reaction;

pub use attachment::AttachmentInsert;
