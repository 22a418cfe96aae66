//! PostgreSQL implementation of PurgeRepository

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use sqlx::PgPool;
use tracing::instrument;

use blog_core::traits::{PurgeRepository, PurgeTable, RepoResult};

use super::error::map_db_error;

/// Hard deletes soft-deleted rows past the retention cutoff
#[derive(Clone)]
pub struct PgPurgeRepository {
    pool: PgPool,
}

impl PgPurgeRepository {
    /// Create a new PgPurgeRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

fn purge_sql(table: PurgeTable) -> String {
    // Table names come from a closed enum, never from input
    format!(
        "DELETE FROM {} WHERE deleted_at IS NOT NULL AND deleted_at < $1",
        table.as_str()
    )
}

#[async_trait]
impl PurgeRepository for PgPurgeRepository {
    #[instrument(skip(self), fields(table = %table))]
    async fn purge_deleted_before(
        &self,
        table: PurgeTable,
        cutoff: DateTime<Utc>,
    ) -> RepoResult<u64> {
        let result = sqlx::query(&purge_sql(table))
            .bind(cutoff)
            .execute(&self.pool)
            .await
            .map_err(map_db_error)?;

        Ok(result.rows_affected())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_repo_is_send_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<PgPurgeRepository>();
    }

    #[test]
    fn test_purge_sql() {
        assert_eq!(
            purge_sql(PurgeTable::Reactions),
            "DELETE FROM reactions WHERE deleted_at IS NOT NULL AND deleted_at < $1"
        );
    }
}
