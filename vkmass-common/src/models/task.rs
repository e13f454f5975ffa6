// File: vkmass-common/src/models/task.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Global process status shown in the panel header.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum TaskStatus {
    #[default]
    Idle,
    Running,
    Initializing,
    Error,
}

impl fmt::Display for TaskStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            TaskStatus::Idle => "IDLE",
            TaskStatus::Running => "RUNNING",
            TaskStatus::Initializing => "INITIALIZING",
            TaskStatus::Error => "ERROR",
        };
        f.write_str(s)
    }
}
