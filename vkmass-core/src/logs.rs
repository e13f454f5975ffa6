// File: src/logs.rs

use std::collections::VecDeque;

use tracing::{error, info, warn};
use vkmass_common::models::{LogEntry, LogKind, LogSource};

/// Cap used by the panel.
pub const DEFAULT_LOG_CAP: usize = 100;

/// Bounded, most-recent-first event log.
///
/// Every appended entry is also mirrored to `tracing` under the
/// `vkmass::events` target.
#[derive(Debug, Clone)]
pub struct LogSink {
    entries: VecDeque<LogEntry>,
    cap: usize,
}

impl Default for LogSink {
    fn default() -> Self {
        Self::new(DEFAULT_LOG_CAP)
    }
}

impl LogSink {
    pub fn new(cap: usize) -> Self {
        Self {
            entries: VecDeque::with_capacity(cap.min(1024)),
            cap: cap.max(1),
        }
    }

    pub fn cap(&self) -> usize {
        self.cap
    }

    /// Prepends `entry` and evicts the oldest entries beyond the cap.
    pub fn append(&mut self, entry: LogEntry) {
        mirror(&entry);
        self.entries.push_front(entry);
        self.entries.truncate(self.cap);
    }

    /// Builds and appends an entry, returning a copy of it.
    pub fn record(&mut self, kind: LogKind, source: LogSource, message: impl Into<String>) -> LogEntry {
        let entry = LogEntry::new(kind, source, message);
        self.append(entry.clone());
        entry
    }

    /// Newest first.
    pub fn iter(&self) -> impl Iterator<Item = &LogEntry> {
        self.entries.iter()
    }

    pub fn latest(&self, n: usize) -> Vec<LogEntry> {
        self.entries.iter().take(n).cloned().collect()
    }

    pub fn newest(&self) -> Option<&LogEntry> {
        self.entries.front()
    }

    pub fn by_kind(&self, kind: LogKind) -> Vec<LogEntry> {
        self.entries.iter().filter(|e| e.kind == kind).cloned().collect()
    }

    pub fn count_kind(&self, kind: LogKind) -> usize {
        self.entries.iter().filter(|e| e.kind == kind).count()
    }

    /// Entries about one account, newest first.
    pub fn for_source(&self, source_id: &str) -> Vec<LogEntry> {
        self.entries
            .iter()
            .filter(|e| e.source.id() == source_id)
            .cloned()
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }
}

fn mirror(entry: &LogEntry) {
    let who = entry.source.display_name();
    match entry.kind {
        LogKind::Error => error!(target: "vkmass::events", "[{}] {}", who, entry.message),
        LogKind::Warning => warn!(target: "vkmass::events", "[{}] {}", who, entry.message),
        LogKind::Info | LogKind::Success | LogKind::Ai => {
            info!(target: "vkmass::events", kind = %entry.kind, "[{}] {}", who, entry.message)
        }
    }
}

/// Shortens `text` to at most `max_chars` characters for display, adding an
/// ellipsis when anything was cut.
pub fn truncate_for_display(text: &str, max_chars: usize) -> String {
    let mut chars = text.chars();
    let head: String = chars.by_ref().take(max_chars).collect();
    if chars.next().is_some() {
        format!("{}…", head)
    } else {
        head
    }
}
