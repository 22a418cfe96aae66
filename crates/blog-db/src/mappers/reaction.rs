//! Reaction and counter entity <-> model mappers

use blog_core::entities::{Counters, Reaction, ReactionTarget};
use blog_core::error::DomainError;
use blog_core::value_objects::Lifecycle;

use crate::models::{CountersModel, ReactionModel};

/// Convert ReactionModel to Reaction entity.
///
/// Fails on rows whose target columns violate the single-target constraint
/// or whose user has been purged.
impl TryFrom<ReactionModel> for Reaction {
    type Error = DomainError;

    fn try_from(model: ReactionModel) -> Result<Self, Self::Error> {
        let target = ReactionTarget::from_columns(model.post_id, model.comment_id).ok_or_else(|| {
            DomainError::DatabaseError(format!("reaction {} has no single target", model.id))
        })?;
        let user_id = model.user_id.ok_or_else(|| {
            DomainError::DatabaseError(format!("reaction {} has no user", model.id))
        })?;

        Ok(Reaction {
            id: model.id,
            user_id,
            target,
            is_liked: model.is_liked,
            created_at: model.created_at,
            lifecycle: Lifecycle::from_deleted_at(model.deleted_at),
        })
    }
}

impl From<CountersModel> for Counters {
    fn from(model: CountersModel) -> Self {
        Counters::new(model.likes, model.dislikes)
    }
}
