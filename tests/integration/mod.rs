//! Integration test suite for inapp-update
//!
//! End-to-end tests of the update flows against fake platform services, a
//! mock store lookup server and the compiled binary.
//!
//! # Running Integration Tests
//!
//! ```bash
//! cargo test --test integration
//! ```
//!
//! # Test Organization
//!
//! - **cli**: The `inapp-update` binary
//! - **flexible_flow**: Flexible updates with lifecycle tracking and auto-complete
//! - **lookup**: Store lookup over HTTP
//! - **remote_check**: The store version check flow end to end

mod cli;
mod flexible_flow;
mod lookup;
mod remote_check;
