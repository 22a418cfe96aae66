//! Database models - SQLx-compatible structs for PostgreSQL tables

mod attachment;
mod reaction;

pub use attachment::AttachmentModel;
pub use reaction::{CountersModel, ReactionModel};
