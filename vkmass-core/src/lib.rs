// src/lib.rs

pub mod accounts;
pub mod dashboard;
pub mod logs;
pub mod scheduler;
pub mod state;
pub mod tasks;

pub use state::{AppState, SharedState};
pub use vkmass_common::error::Error;
