//! Domain entities - core business objects

mod attachment;
mod comment;
mod post;
mod reaction;
mod user;

pub use attachment::{Attachment, OwnerType};
pub use comment::Comment;
pub use post::Post;
pub use reaction::{
    Counters, Reaction, ReactionAction, ReactionState, ReactionTarget, RowChange, Transition,
};
pub use user::User;
