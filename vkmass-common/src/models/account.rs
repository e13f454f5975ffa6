// File: vkmass-common/src/models/account.rs

use std::fmt;

use serde::{Deserialize, Serialize};

/// Connection state of a simulated account.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AccountStatus {
    Online,
    Offline,
    Banned,
}

impl fmt::Display for AccountStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            AccountStatus::Online => "online",
            AccountStatus::Offline => "offline",
            AccountStatus::Banned => "banned",
        };
        f.write_str(s)
    }
}

/// The step an account is currently on.
///
/// `Idle` and `Step0Filling` sit outside the automation cycle. The cycle itself
/// is [`AutomationStep::CYCLE`], walked in order and wrapping forever.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum AutomationStep {
    Idle,
    #[serde(rename = "STEP_0_FILLING")]
    Step0Filling,
    Profiling,
    Searching,
    Subscribing,
    Monitoring,
    Clips,
}

impl AutomationStep {
    pub const CYCLE: [AutomationStep; 5] = [
        AutomationStep::Profiling,
        AutomationStep::Searching,
        AutomationStep::Subscribing,
        AutomationStep::Monitoring,
        AutomationStep::Clips,
    ];

    /// Position inside [`AutomationStep::CYCLE`], if this step belongs to it.
    pub fn cycle_index(&self) -> Option<usize> {
        Self::CYCLE.iter().position(|s| s == self)
    }

    /// The step that follows this one. Steps outside the cycle restart it.
    pub fn next_in_cycle(&self) -> AutomationStep {
        match self.cycle_index() {
            Some(idx) => Self::CYCLE[(idx + 1) % Self::CYCLE.len()],
            None => Self::CYCLE[0],
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            AutomationStep::Idle => "IDLE",
            AutomationStep::Step0Filling => "STEP_0_FILLING",
            AutomationStep::Profiling => "PROFILING",
            AutomationStep::Searching => "SEARCHING",
            AutomationStep::Subscribing => "SUBSCRIBING",
            AutomationStep::Monitoring => "MONITORING",
            AutomationStep::Clips => "CLIPS",
        }
    }
}

impl fmt::Display for AutomationStep {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Cumulative counters mutated by the cycle.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountStats {
    pub friends_added: u32,
    pub groups_joined: u32,
    pub comments_posted: u32,
    pub clips_commented: u32,
}

/// Daily caps for the counters above.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccountLimits {
    pub friends: u32,
    pub groups: u32,
    pub comments: u32,
    pub clips: u32,
}

impl Default for AccountLimits {
    fn default() -> Self {
        Self {
            friends: 50,
            groups: 40,
            comments: 100,
            clips: 50,
        }
    }
}

/// A simulated account record.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Account {
    pub id: String,
    pub name: String,
    pub avatar: String,
    pub status: AccountStatus,
    /// Opaque mock value; nothing ever sends it anywhere.
    pub token: String,
    pub proxy: String,
    pub current_step: AutomationStep,
    /// Profile completeness, 0..=100.
    pub progress: u8,
    pub stats: AccountStats,
    pub limits: AccountLimits,
}

impl Account {
    pub fn new(id: &str, name: &str, proxy: &str) -> Self {
        Self {
            id: id.to_string(),
            name: name.to_string(),
            avatar: format!("https://i.pravatar.cc/150?u={}", id),
            status: AccountStatus::Online,
            token: String::new(),
            proxy: proxy.to_string(),
            current_step: AutomationStep::Idle,
            progress: 0,
            stats: AccountStats::default(),
            limits: AccountLimits::default(),
        }
    }

    pub fn is_ready(&self) -> bool {
        self.progress >= 100
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cycle_wraps_after_clips() {
        assert_eq!(AutomationStep::Clips.next_in_cycle(), AutomationStep::Profiling);
        assert_eq!(AutomationStep::Subscribing.next_in_cycle(), AutomationStep::Monitoring);
    }

    #[test]
    fn steps_outside_cycle_restart_it() {
        assert_eq!(AutomationStep::Idle.next_in_cycle(), AutomationStep::Profiling);
        assert_eq!(AutomationStep::Step0Filling.next_in_cycle(), AutomationStep::Profiling);
        assert_eq!(AutomationStep::Idle.cycle_index(), None);
    }

    #[test]
    fn step_serializes_like_dashboard_labels() {
        let json = serde_json::to_string(&AutomationStep::Step0Filling).unwrap();
        assert_eq!(json, "\"STEP_0_FILLING\"");
        let json = serde_json::to_string(&AutomationStep::Monitoring).unwrap();
        assert_eq!(json, "\"MONITORING\"");
    }
}
