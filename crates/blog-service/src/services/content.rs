//! Content service
//!
//! Owner deletion workflows. Deleting a post or comment soft-deletes it along
//! with the reactions on it and the attachments it owns; the retention purge
//! later removes the rows and the blobs.

use tracing::{info, instrument};
use uuid::Uuid;

use super::context::ServiceContext;
use super::error::ServiceResult;

/// Content service
pub struct ContentService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ContentService<'a> {
    /// Create a new ContentService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Soft delete a post, its comments, every reaction on either, and their attachments
    #[instrument(skip(self))]
    pub async fn delete_post(&self, post_id: Uuid) -> ServiceResult<()> {
        self.ctx.post_repo().soft_delete_cascade(post_id).await?;

        info!(post_id = %post_id, "Post deleted");
        Ok(())
    }

    /// Soft delete a comment, its reactions and its attachments
    #[instrument(skip(self))]
    pub async fn delete_comment(&self, comment_id: Uuid) -> ServiceResult<()> {
        self.ctx.comment_repo().soft_delete_cascade(comment_id).await?;

        info!(comment_id = %comment_id, "Comment deleted");
        Ok(())
    }
}
