//! Reaction service
//!
//! Like/dislike toggling on posts and comments. Each toggle share-locks the
//! acting user, locks its target, applies one transition of [`ReactionState`]
//! to the reaction row and the target's counters, and commits both together.

use serde::Serialize;
use tracing::{info, instrument};
use uuid::Uuid;

use blog_core::entities::{Reaction, ReactionAction, ReactionState, ReactionTarget, RowChange};
use blog_core::DomainError;

use super::context::ServiceContext;
use super::error::{ServiceError, ServiceResult};

/// State and counters after a toggle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct ReactionOutcome {
    pub state: ReactionState,
    pub likes: i64,
    pub dislikes: i64,
}

/// Reaction service
pub struct ReactionService<'a> {
    ctx: &'a ServiceContext,
}

impl<'a> ReactionService<'a> {
    /// Create a new ReactionService
    pub fn new(ctx: &'a ServiceContext) -> Self {
        Self { ctx }
    }

    /// Apply a like or dislike from `user_id` to `target`.
    ///
    /// Repeating the current polarity retracts it; the opposite polarity flips it.
    #[instrument(skip(self))]
    pub async fn toggle(
        &self,
        user_id: Uuid,
        target: ReactionTarget,
        action: ReactionAction,
    ) -> ServiceResult<ReactionOutcome> {
        let mut uow = self.ctx.reaction_repo().begin().await?;

        // Held until commit, so the user cannot be deleted mid-toggle
        if !uow.lock_user(user_id).await? {
            return Err(DomainError::UserNotFound(user_id).into());
        }

        // Concurrent toggles on this target wait here
        let counters = uow
            .lock_target(target)
            .await?
            .ok_or_else(|| target_not_found(target))?;

        let existing = uow.find_reaction(user_id, target).await?;
        let transition = ReactionState::of(existing.as_ref()).apply(action);

        match (transition.row, existing) {
            (RowChange::Create { is_liked }, None) => {
                let reaction = Reaction::new(Uuid::new_v4(), user_id, target, is_liked);
                uow.insert_reaction(&reaction).await?;
            }
            (RowChange::Flip { is_liked }, Some(reaction)) => {
                uow.set_polarity(reaction.id, is_liked).await?;
            }
            (RowChange::Delete, Some(reaction)) => {
                uow.delete_reaction(reaction.id).await?;
            }
            (row, existing) => {
                return Err(ServiceError::internal(format!(
                    "reaction transition {row:?} does not fit existing row {:?}",
                    existing.map(|r| r.id)
                )));
            }
        }

        let next = counters.apply(&transition);
        uow.write_counters(target, next).await?;
        uow.commit().await?;

        info!(
            user_id = %user_id,
            target = target.kind(),
            target_id = %target.id(),
            state = ?transition.next,
            likes = next.likes,
            dislikes = next.dislikes,
            "Reaction toggled"
        );

        Ok(ReactionOutcome {
            state: transition.next,
            likes: next.likes,
            dislikes: next.dislikes,
        })
    }

    /// A user's current disposition toward a target
    #[instrument(skip(self))]
    pub async fn current_state(
        &self,
        user_id: Uuid,
        target: ReactionTarget,
    ) -> ServiceResult<ReactionState> {
        let reaction = self.ctx.reaction_repo().find(user_id, target).await?;
        Ok(ReactionState::of(reaction.as_ref()))
    }
}

fn target_not_found(target: ReactionTarget) -> DomainError {
    match target {
        ReactionTarget::Post(id) => DomainError::PostNotFound(id),
        ReactionTarget::Comment(id) => DomainError::CommentNotFound(id),
    }
}
