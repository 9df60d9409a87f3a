//! Error type for the fallible parts of the collision core.
//!
//! Numerical soft failures (unresolvable overlaps, iteration caps) are not
//! errors: they are logged and surfaced through [`crate::Resolution`] and
//! [`crate::StepProfile`].

use thiserror::Error;

use crate::core::types::ObjectId;

#[derive(Debug, Error, Clone, PartialEq)]
pub enum CollisionError {
    /// A configuration value is out of range.
    #[error("invalid config field `{field}`: {reason}")]
    InvalidConfig { field: &'static str, reason: String },
    /// Two objects share the same id.
    #[error("object {0} is already registered")]
    DuplicateObject(ObjectId),
    /// The id does not name a registered object.
    #[error("object {0} does not exist")]
    UnknownObject(ObjectId),
}

pub type Result<T> = std::result::Result<T, CollisionError>;
