// src/dashboard.rs

use std::fmt;

use serde::Serialize;
use vkmass_common::models::{AiProviderId, LogKind, TaskStatus};

use crate::state::AppState;

/// Headline numbers shown above the account table.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DashboardSummary {
    pub ready_profiles: usize,
    pub total_accounts: usize,
    pub total_comments: u64,
    pub proxy_nodes: usize,
    pub ai_operations: usize,
    pub active_provider: AiProviderId,
    pub status: TaskStatus,
}

impl DashboardSummary {
    pub fn from_state(state: &AppState) -> Self {
        let accounts = state.accounts();
        Self {
            ready_profiles: accounts.iter().filter(|a| a.is_ready()).count(),
            total_accounts: accounts.len(),
            total_comments: accounts.iter().map(|a| u64::from(a.stats.comments_posted)).sum(),
            proxy_nodes: accounts.len(),
            ai_operations: state.logs().count_kind(LogKind::Ai),
            active_provider: state.settings().active_ai_provider,
            status: state.status(),
        }
    }
}

impl fmt::Display for DashboardSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "ready profiles {}/{} | comments {} | proxy nodes {} | AI operations {} | provider {} | status {}",
            self.ready_profiles,
            self.total_accounts,
            self.total_comments,
            self.proxy_nodes,
            self.ai_operations,
            self.active_provider,
            self.status
        )
    }
}

/// One bar of the profile-progress chart.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ProgressRow {
    pub name: String,
    pub progress: u8,
    pub ready: bool,
}

pub fn progress_rows(state: &AppState) -> Vec<ProgressRow> {
    state
        .accounts()
        .iter()
        .map(|a| ProgressRow {
            name: a.name.clone(),
            progress: a.progress,
            ready: a.is_ready(),
        })
        .collect()
}
