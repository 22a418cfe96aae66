//! PostgreSQL implementation of AttachmentRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::{PgExecutor, PgPool};
use tracing::instrument;
use uuid::Uuid;

use blog_core::entities::{Attachment, OwnerType};
use blog_core::traits::{AttachmentRepository, RepoResult};

use crate::mappers::AttachmentInsert;
use crate::models::AttachmentModel;

use super::error::map_db_error;

/// PostgreSQL implementation of AttachmentRepository
#[derive(Clone)]
pub struct PgAttachmentRepository {
    pool: PgPool,
}

impl PgAttachmentRepository {
    /// Create a new PgAttachmentRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

async fn insert<'e, E>(executor: E, attachment: &Attachment) -> RepoResult<()>
where
    E: PgExecutor<'e>,
{
    let row = AttachmentInsert::new(attachment);

    sqlx::query(
        r#"
        INSERT INTO attachments
            (id, external_id, owner_type, path, mime_type, size, original_name, created_at)
        VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
        "#,
    )
    .bind(row.id)
    .bind(row.external_id)
    .bind(row.owner_type)
    .bind(row.path)
    .bind(row.mime_type)
    .bind(row.size)
    .bind(row.original_name)
    .bind(row.created_at)
    .execute(executor)
    .await
    .map_err(map_db_error)?;

    Ok(())
}

fn into_entities(models: Vec<AttachmentModel>) -> RepoResult<Vec<Attachment>> {
    models.into_iter().map(Attachment::try_from).collect()
}

#[async_trait]
impl AttachmentRepository for PgAttachmentRepository {
    #[instrument(skip(self, owner_ids), fields(owners = owner_ids.len()))]
    async fn find_by_owners(
        &self,
        owner_ids: &[Uuid],
        owner_type: OwnerType,
    ) -> RepoResult<Vec<Attachment>> {
        let results = sqlx::query_as::<_, AttachmentModel>(
            r#"
            SELECT id, external_id, owner_type, path, mime_type, size, original_name,
                   created_at, deleted_at
            FROM attachments
            WHERE owner_type = $1 AND external_id = ANY($2) AND deleted_at IS NULL
            ORDER BY created_at
            "#,
        )
        .bind(owner_type.as_str())
        .bind(owner_ids)
        .fetch_all(&self.pool)
        .await
        .map_err(map_db_error)?;

        into_entities(results)
    }

    #[instrument(skip(self, attachment), fields(attachment_id = %attachment.id))]
    async fn create(&self, attachment: &Attachment) -> RepoResult<()> {
        insert(&self.pool, attachment).await
    }

    #[instrument(skip(self, attachments), fields(count = attachments.len()))]
    async fn create_many(&self, attachments: &[Attachment]) -> RepoResult<()> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        for attachment in attachments {
            insert(&mut *tx, attachment).await?;
        }

        tx.commit().await.map_err(map_db_error)?;
        Ok(())
    }

    #[instrument(skip(self))]
    async fn soft_delete_by_owner(
        &self,
        owner_id: Uuid,
        owner_type: OwnerType,
    ) -> RepoResult<u64> {
        let result = sqlx::query(
            r#"
            UPDATE attachments SET deleted_at = NOW()
            WHERE external_id = $1 AND owner_type = $2 AND deleted_at IS NULL
            "#,
        )
        .bind(owner_id)
        .bind(owner_type.as_str())
        .execute(&self.pool)
        .await
        .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }

    #[instrument(skip(self))]
    async fn purge_deleted_before(&self, cutoff: DateTime<Utc>) -> RepoResult<Vec<Attachment>> {
        let mut tx = self.pool.begin().await.map_err(map_db_error)?;

        let rows = sqlx::query_as::<_, AttachmentModel>(
            r#"
            SELECT id, external_id, owner_type, path, mime_type, size, original_name,
                   created_at, deleted_at
            FROM attachments
            WHERE deleted_at IS NOT NULL AND deleted_at < $1
            FOR UPDATE
            "#,
        )
        .bind(cutoff)
        .fetch_all(&mut *tx)
        .await
        .map_err(map_db_error)?;

        if rows.is_empty() {
            tx.commit().await.map_err(map_db_error)?;
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = rows.iter().map(|r| r.id).collect();

        sqlx::query("DELETE FROM attachments WHERE id = ANY($1)")
            .bind(ids.as_slice())
            .execute(&mut *tx)
            .await
            .map_err(map_db_error)?;

        tx.commit().await.map_err(map_db_error)?;

        into_entities(rows)
    }
}
