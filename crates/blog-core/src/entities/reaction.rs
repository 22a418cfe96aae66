//! Reaction entity - a user's like or dislike on a post or a comment
//!
//! The like/dislike toggle is a small state machine per (user, target) pair.
//! [`ReactionState::apply`] is the pure transition table; the service layer
//! executes the resulting [`Transition`] inside one database transaction.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::value_objects::Lifecycle;

/// The content a reaction points at. Exactly one of post or comment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ReactionTarget {
    Post(Uuid),
    Comment(Uuid),
}

impl ReactionTarget {
    /// Id of the targeted row
    #[inline]
    pub fn id(&self) -> Uuid {
        match self {
            Self::Post(id) | Self::Comment(id) => *id,
        }
    }

    /// Human-readable kind, used in logs and not-found errors
    pub fn kind(&self) -> &'static str {
        match self {
            Self::Post(_) => "Post",
            Self::Comment(_) => "Comment",
        }
    }

    /// Build from the two nullable reference columns of a reaction row
    pub fn from_columns(post_id: Option<Uuid>, comment_id: Option<Uuid>) -> Option<Self> {
        match (post_id, comment_id) {
            (Some(post_id), None) => Some(Self::Post(post_id)),
            (None, Some(comment_id)) => Some(Self::Comment(comment_id)),
            _ => None,
        }
    }

    #[inline]
    pub fn post_id(&self) -> Option<Uuid> {
        match self {
            Self::Post(id) => Some(*id),
            Self::Comment(_) => None,
        }
    }

    #[inline]
    pub fn comment_id(&self) -> Option<Uuid> {
        match self {
            Self::Comment(id) => Some(*id),
            Self::Post(_) => None,
        }
    }
}

/// What the user asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionAction {
    Like,
    Dislike,
}

impl ReactionAction {
    #[inline]
    pub fn is_like(&self) -> bool {
        matches!(self, Self::Like)
    }
}

/// Current disposition of a user toward a target
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ReactionState {
    #[default]
    None,
    Liked,
    Disliked,
}

/// Change to apply to the reaction row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowChange {
    Create { is_liked: bool },
    Flip { is_liked: bool },
    Delete,
}

/// Result of applying an action to a state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Transition {
    pub next: ReactionState,
    pub row: RowChange,
    pub likes_delta: i64,
    pub dislikes_delta: i64,
}

impl ReactionState {
    /// State implied by an existing reaction row (or its absence)
    pub fn of(reaction: Option<&Reaction>) -> Self {
        match reaction {
            None => Self::None,
            Some(r) if r.is_liked => Self::Liked,
            Some(_) => Self::Disliked,
        }
    }

    /// Transition table. Applying the current polarity again retracts it.
    pub fn apply(self, action: ReactionAction) -> Transition {
        use ReactionAction::{Dislike, Like};

        match (self, action) {
            (Self::None, Like) => Transition {
                next: Self::Liked,
                row: RowChange::Create { is_liked: true },
                likes_delta: 1,
                dislikes_delta: 0,
            },
            (Self::None, Dislike) => Transition {
                next: Self::Disliked,
                row: RowChange::Create { is_liked: false },
                likes_delta: 0,
                dislikes_delta: 1,
            },
            (Self::Liked, Like) => Transition {
                next: Self::None,
                row: RowChange::Delete,
                likes_delta: -1,
                dislikes_delta: 0,
            },
            (Self::Disliked, Dislike) => Transition {
                next: Self::None,
                row: RowChange::Delete,
                likes_delta: 0,
                dislikes_delta: -1,
            },
            (Self::Liked, Dislike) => Transition {
                next: Self::Disliked,
                row: RowChange::Flip { is_liked: false },
                likes_delta: -1,
                dislikes_delta: 1,
            },
            (Self::Disliked, Like) => Transition {
                next: Self::Liked,
                row: RowChange::Flip { is_liked: true },
                likes_delta: 1,
                dislikes_delta: -1,
            },
        }
    }
}

/// Denormalized like/dislike counters of a post or comment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Counters {
    pub likes: i64,
    pub dislikes: i64,
}

impl Counters {
    pub fn new(likes: i64, dislikes: i64) -> Self {
        Self { likes, dislikes }
    }

    /// Apply a transition's deltas, never going below zero
    pub fn apply(self, transition: &Transition) -> Self {
        Self {
            likes: (self.likes + transition.likes_delta).max(0),
            dislikes: (self.dislikes + transition.dislikes_delta).max(0),
        }
    }
}

/// Reaction entity
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reaction {
    pub id: Uuid,
    pub user_id: Uuid,
    pub target: ReactionTarget,
    pub is_liked: bool,
    pub created_at: DateTime<Utc>,
    pub lifecycle: Lifecycle,
}

impl Reaction {
    /// Create a new live Reaction
    pub fn new(id: Uuid, user_id: Uuid, target: ReactionTarget, is_liked: bool) -> Self {
        Self {
            id,
            user_id,
            target,
            is_liked,
            created_at: Utc::now(),
            lifecycle: Lifecycle::Active,
        }
    }
}
