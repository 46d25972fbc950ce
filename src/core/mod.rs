//! Core types shared by every update component.
//!
//! Currently this is the error taxonomy: [`UpdateError`] for collaborator
//! failures, [`FailureKind`] for classifying them, and [`ErrorContext`] for
//! presenting errors on the command line.

pub mod error;

pub use error::{ErrorContext, FailureKind, UpdateError, user_friendly_error};

/// Result alias used by the collaborator traits.
pub type UpdateResult<T> = Result<T, UpdateError>;
