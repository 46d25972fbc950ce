//! Per-flow configuration.
//!
//! [`UpdateFlowConfig`] is the only configuration type. It can be built in
//! code or read from a TOML file with [`UpdateFlowConfig::load_from`].

mod flow;

pub use flow::{UpdateFlowConfig, UpdateMode};
