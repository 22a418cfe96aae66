//! PostgreSQL implementation of ReactionRepository
//!
//! A toggle runs inside a [`PgReactionUnitOfWork`]: one transaction that
//! share-locks the acting user, then takes a row lock on the target post or
//! comment (`SELECT ... FOR UPDATE`).
//! Toggles on the same target queue on that lock, toggles on different
//! targets proceed in parallel.

use async_trait::async_trait;
use sqlx::{PgPool, Postgres, Transaction};
use tracing::instrument;
use uuid::Uuid;

use blog_core::entities::{Counters, Reaction, ReactionTarget};
use blog_core::error::DomainError;
use blog_core::traits::{ReactionRepository, ReactionUnitOfWork, RepoResult};

use crate::models::{CountersModel, ReactionModel};

use super::error::{map_db_error, map_unique_violation};

/// Table holding the target row and its counters
fn target_table(target: ReactionTarget) -> &'static str {
    match target {
        ReactionTarget::Post(_) => "posts",
        ReactionTarget::Comment(_) => "comments",
    }
}

/// Column of the reactions table that references the target
fn target_column(target: ReactionTarget) -> &'static str {
    match target {
        ReactionTarget::Post(_) => "post_id",
        ReactionTarget::Comment(_) => "comment_id",
    }
}

fn find_reaction_sql(target: ReactionTarget) -> String {
    format!(
        "SELECT id, user_id, post_id, comment_id, is_liked, created_at, deleted_at \
         FROM reactions \
         WHERE user_id = $1 AND {} = $2 AND deleted_at IS NULL",
        target_column(target)
    )
}

/// PostgreSQL implementation of ReactionRepository
#[derive(Clone)]
pub struct PgReactionRepository {
    pool: PgPool,
}

impl PgReactionRepository {
    /// Create a new PgReactionRepository
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl ReactionRepository for PgReactionRepository {
    #[instrument(skip(self))]
    async fn find(&self, user_id: Uuid, target: ReactionTarget) -> RepoResult<Option<Reaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(&find_reaction_sql(target))
            .bind(user_id)
            .bind(target.id())
            .fetch_optional(&self.pool)
            .await
            .map_err(map_db_error)?;

        result.map(Reaction::try_from).transpose()
    }

    async fn begin(&self) -> RepoResult<Box<dyn ReactionUnitOfWork>> {
        let tx = self.pool.begin().await.map_err(map_db_error)?;
        Ok(Box::new(PgReactionUnitOfWork { tx }))
    }
}

/// Transaction-scoped reaction store. Rolls back when dropped uncommitted.
pub struct PgReactionUnitOfWork {
    tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl ReactionUnitOfWork for PgReactionUnitOfWork {
    #[instrument(skip(self))]
    async fn lock_user(&mut self, user_id: Uuid) -> RepoResult<bool> {
        // FOR SHARE blocks a concurrent soft delete of the user until commit
        let found = sqlx::query_scalar::<_, Uuid>(
            "SELECT id FROM users WHERE id = $1 AND deleted_at IS NULL FOR SHARE",
        )
        .bind(user_id)
        .fetch_optional(&mut *self.tx)
        .await
        .map_err(map_db_error)?;

        Ok(found.is_some())
    }

    #[instrument(skip(self))]
    async fn lock_target(&mut self, target: ReactionTarget) -> RepoResult<Option<Counters>> {
        let sql = format!(
            "SELECT likes, dislikes FROM {} WHERE id = $1 AND deleted_at IS NULL FOR UPDATE",
            target_table(target)
        );

        let locked = sqlx::query_as::<_, CountersModel>(&sql)
            .bind(target.id())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(locked.map(Counters::from))
    }

    #[instrument(skip(self))]
    async fn find_reaction(
        &mut self,
        user_id: Uuid,
        target: ReactionTarget,
    ) -> RepoResult<Option<Reaction>> {
        let result = sqlx::query_as::<_, ReactionModel>(&find_reaction_sql(target))
            .bind(user_id)
            .bind(target.id())
            .fetch_optional(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        result.map(Reaction::try_from).transpose()
    }

    #[instrument(skip(self, reaction), fields(reaction_id = %reaction.id))]
    async fn insert_reaction(&mut self, reaction: &Reaction) -> RepoResult<()> {
        sqlx::query(
            r#"
            INSERT INTO reactions (id, user_id, post_id, comment_id, is_liked, created_at)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(reaction.id)
        .bind(reaction.user_id)
        .bind(reaction.target.post_id())
        .bind(reaction.target.comment_id())
        .bind(reaction.is_liked)
        .bind(reaction.created_at)
        .execute(&mut *self.tx)
        .await
        .map_err(|e| {
            map_unique_violation(e, || {
                DomainError::Conflict(
                    "Reaction already exists for this user and target".to_string(),
                )
            })
        })?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn set_polarity(&mut self, reaction_id: Uuid, is_liked: bool) -> RepoResult<()> {
        sqlx::query("UPDATE reactions SET is_liked = $2 WHERE id = $1")
            .bind(reaction_id)
            .bind(is_liked)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn delete_reaction(&mut self, reaction_id: Uuid) -> RepoResult<()> {
        sqlx::query("DELETE FROM reactions WHERE id = $1")
            .bind(reaction_id)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    #[instrument(skip(self))]
    async fn write_counters(
        &mut self,
        target: ReactionTarget,
        counters: Counters,
    ) -> RepoResult<()> {
        let sql = format!(
            "UPDATE {} SET likes = $2, dislikes = $3 WHERE id = $1",
            target_table(target)
        );

        sqlx::query(&sql)
            .bind(target.id())
            .bind(counters.likes)
            .bind(counters.dislikes)
            .execute(&mut *self.tx)
            .await
            .map_err(map_db_error)?;

        Ok(())
    }

    async fn commit(self: Box<Self>) -> RepoResult<()> {
        self.tx.commit().await.map_err(map_db_error)
    }
}
