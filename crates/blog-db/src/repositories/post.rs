//! PostgreSQL implementations of PostRepository and CommentRepository
//!
//! Soft deletion cascades to everything hanging off the deleted row: comments,
//! reactions and attachments all receive the same `deleted_at` so the purge
//! reclaims them in the same run.

use async_trait::async_trait;
use chrono::Utc;
use sqlx::PgPool;
use tracing::instrument;
use uuid::Uuid;

use blog_core::entities::OwnerType;
use blog_core::traits::{CommentRepository, PostRepository, RepoResult};

use super::error::{comment_not_found, map_db_error, post_not_found};

/// PostgreSQL implementation of PostRepository
#[derive(Clone)]
pub struct PgPostRepository {
    pool: PgPool,
}

impl PgPostRepository {
    /// Create a new PgPostRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl PostRepository for PgPostRepository {
    #[instrument(skip(self))]
    async fn soft_delete_cascade(&self, id: Uuid) -> RepoResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r#"
            UPDATE posts SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(post_not_found(id));
        }

        let comment_ids = sqlx::query_scalar::<_, Uuid>(
            r#"
            UPDATE comments SET deleted_at = $2, updated_at = $2
            WHERE post_id = $1 AND deleted_at IS NULL
            RETURNING id
            "#,
        )
        .bind(id)
        .bind(now)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r#"
            UPDATE reactions SET deleted_at = $3
            WHERE deleted_at IS NULL AND (post_id = $1 OR comment_id = ANY($2))
            "#,
        )
        .bind(id)
        .bind(comment_ids.as_slice())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r#"
            UPDATE attachments SET deleted_at = $5
            WHERE deleted_at IS NULL
              AND ((owner_type = $3 AND external_id = $1)
                OR (owner_type = $4 AND external_id = ANY($2)))
            "#,
        )
        .bind(id)
        .bind(comment_ids.as_slice())
        .bind(OwnerType::Post.as_str())
        .bind(OwnerType::Comment.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        tracing::debug!(post_id = %id, comments = comment_ids.len(), "Post soft deleted");
        Ok(())
    }
}

/// PostgreSQL implementation of CommentRepository
#[derive(Clone)]
pub struct PgCommentRepository {
    pool: PgPool,
}

impl PgCommentRepository {
    /// Create a new PgCommentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl CommentRepository for PgCommentRepository {
    #[instrument(skip(self))]
    async fn soft_delete_cascade(&self, id: Uuid) -> RepoResult<()> {
        let now = Utc::now();
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let result = sqlx::query(
            r#"
            UPDATE comments SET deleted_at = $2, updated_at = $2
            WHERE id = $1 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if result.rows_affected() == 0 {
            return Err(comment_not_found(id));
        }

        sqlx::query(
            "UPDATE reactions SET deleted_at = $2 WHERE comment_id = $1 AND deleted_at IS NULL",
        )
        .bind(id)
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        sqlx::query(
            r#"
            UPDATE attachments SET deleted_at = $3
            WHERE external_id = $1 AND owner_type = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(id)
        .bind(OwnerType::Comment.as_str())
        .bind(now)
        .execute(&mut *tx)
        .await
        .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        tracing::debug!(comment_id = %id, "Comment soft deleted");
        Ok(())
    }
}
