//! Version comparison.
//!
//! The only question this crate ever asks of two version strings is "is the
//! store's version newer than the one installed?". See [`comparison`] for
//! the parsing rule.

pub mod comparison;

pub use comparison::{VersionComparator, is_newer};
