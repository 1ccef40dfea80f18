//! Library interface for studymate-cli
//!
//! Exposes argument parsing and the command handlers for integration testing.
#![cfg_attr(
    test,
    allow(
        dead_code,
        clippy::expect_used,
        clippy::unwrap_used,
        clippy::panic,
        clippy::missing_panics_doc,
        clippy::missing_errors_doc,
        reason = "Test allows"
    )
)]

/// Command-line argument definitions
pub mod cli;
/// Command handlers and output formatting
pub mod handlers;

pub use cli::{Cli, Commands};
pub use handlers::run;
