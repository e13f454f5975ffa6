// ================================================================
// File: vkmass-common/src/error.rs
// ================================================================

use thiserror::Error;

/// Errors returned by the panel's state operations.
///
/// Provider calls report through `anyhow` inside `vkmass-ai`; by the time they
/// reach the core they are log entries, not errors.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum Error {
    #[error("Invalid settings: {0}")]
    InvalidSettings(String),

    #[error("Unknown AI provider: {0}")]
    UnknownProvider(String),

    #[error("Already running: {0}")]
    AlreadyRunning(String),
}
