// File: vkmass-common/src/models/log.rs

use std::fmt;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::models::account::Account;

/// Severity / category of a log entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum LogKind {
    Info,
    Success,
    Warning,
    Error,
    /// Anything produced by, or sent to, a text-generation provider.
    Ai,
}

impl fmt::Display for LogKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            LogKind::Info => "info",
            LogKind::Success => "success",
            LogKind::Warning => "warning",
            LogKind::Error => "error",
            LogKind::Ai => "ai",
        };
        f.pad(s)
    }
}

/// Who an entry is about.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum LogSource {
    System,
    Account { id: String, name: String },
}

impl LogSource {
    pub fn account(account: &Account) -> Self {
        LogSource::Account {
            id: account.id.clone(),
            name: account.name.clone(),
        }
    }

    /// `"system"` for the system sentinel, otherwise the account id.
    pub fn id(&self) -> &str {
        match self {
            LogSource::System => "system",
            LogSource::Account { id, .. } => id,
        }
    }

    pub fn display_name(&self) -> &str {
        match self {
            LogSource::System => "System",
            LogSource::Account { name, .. } => name,
        }
    }
}

/// One immutable line of the event log.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LogEntry {
    pub id: String,
    pub timestamp: DateTime<Utc>,
    pub source: LogSource,
    pub message: String,
    pub kind: LogKind,
}

impl LogEntry {
    pub fn new(kind: LogKind, source: LogSource, message: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4().simple().to_string(),
            timestamp: Utc::now(),
            source,
            message: message.into(),
            kind,
        }
    }

    pub fn system(kind: LogKind, message: impl Into<String>) -> Self {
        Self::new(kind, LogSource::System, message)
    }
}
