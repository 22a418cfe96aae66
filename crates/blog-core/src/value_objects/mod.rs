//! Value objects - immutable types that represent domain concepts

mod lifecycle;

pub use lifecycle::Lifecycle;
