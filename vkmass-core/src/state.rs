// File: src/state.rs

use std::sync::Arc;

use tokio::sync::Mutex;
use tracing::info;
use vkmass_common::Error;
use vkmass_common::models::{
    Account, AiAccount, AiProviderId, AutomationSettings, LogEntry, LogKind, LogSource, TaskStatus,
};
use vkmass_common::seed::{mock_accounts, mock_ai_accounts};

use crate::accounts::AccountRegistry;
use crate::logs::{DEFAULT_LOG_CAP, LogSink};

/// State shared between the automation task, mass fill and whatever renders it.
pub type SharedState = Arc<Mutex<AppState>>;

/// Everything the panel knows about, owned in one place.
#[derive(Debug, Clone)]
pub struct AppState {
    accounts: AccountRegistry,
    logs: LogSink,
    settings: AutomationSettings,
    ai_accounts: Vec<AiAccount>,
    status: TaskStatus,
    filling: bool,
}

impl AppState {
    /// Builds state from the given accounts and settings. Settings are validated.
    pub fn new(accounts: Vec<Account>, settings: AutomationSettings) -> Result<Self, Error> {
        settings.validate()?;
        let mut state = Self {
            accounts: AccountRegistry::new(accounts),
            logs: LogSink::new(DEFAULT_LOG_CAP),
            settings,
            ai_accounts: mock_ai_accounts(),
            status: TaskStatus::Idle,
            filling: false,
        };
        state.sync_ai_accounts();
        Ok(state)
    }

    /// The static seed every session starts from.
    pub fn seeded() -> Self {
        Self {
            accounts: AccountRegistry::new(mock_accounts()),
            logs: LogSink::new(DEFAULT_LOG_CAP),
            settings: AutomationSettings::default(),
            ai_accounts: mock_ai_accounts(),
            status: TaskStatus::Idle,
            filling: false,
        }
    }

    pub fn with_log_cap(mut self, cap: usize) -> Self {
        self.logs = LogSink::new(cap);
        self
    }

    pub fn into_shared(self) -> SharedState {
        Arc::new(Mutex::new(self))
    }

    // ---- accounts ----

    pub fn accounts(&self) -> &AccountRegistry {
        &self.accounts
    }

    pub fn account(&self, id: &str) -> Option<Arc<Account>> {
        self.accounts.get(id)
    }

    pub fn update_account<F>(&mut self, id: &str, f: F) -> Option<Arc<Account>>
    where
        F: FnOnce(&mut Account),
    {
        self.accounts.update(id, f)
    }

    // ---- logs ----

    pub fn logs(&self) -> &LogSink {
        &self.logs
    }

    pub fn log(&mut self, kind: LogKind, source: LogSource, message: impl Into<String>) -> LogEntry {
        self.logs.record(kind, source, message)
    }

    pub fn log_system(&mut self, kind: LogKind, message: impl Into<String>) -> LogEntry {
        self.logs.record(kind, LogSource::System, message)
    }

    pub fn log_account(&mut self, kind: LogKind, account: &Account, message: impl Into<String>) -> LogEntry {
        self.logs.record(kind, LogSource::account(account), message)
    }

    // ---- settings & providers ----

    pub fn settings(&self) -> &AutomationSettings {
        &self.settings
    }

    /// Swaps in new settings after validating them.
    pub fn replace_settings(&mut self, settings: AutomationSettings) -> Result<(), Error> {
        settings.validate()?;
        self.settings = settings;
        self.sync_ai_accounts();
        info!("Settings updated; active provider is {}", self.settings.active_ai_provider);
        Ok(())
    }

    /// Makes `id` the single active provider.
    pub fn select_provider(&mut self, id: AiProviderId) -> Result<(), Error> {
        self.settings.select_provider(id)?;
        self.sync_ai_accounts();
        self.log_system(LogKind::Info, format!("AI provider switched to {}", id));
        Ok(())
    }

    pub fn ai_accounts(&self) -> &[AiAccount] {
        &self.ai_accounts
    }

    pub fn active_ai_account(&self) -> Option<&AiAccount> {
        self.ai_accounts.iter().find(|a| a.is_active)
    }

    /// Counts one successful generation against `id`.
    pub fn record_ai_usage(&mut self, id: AiProviderId) {
        if let Some(record) = self.ai_accounts.iter_mut().find(|a| a.id == id) {
            record.usage_count += 1;
        }
    }

    fn sync_ai_accounts(&mut self) {
        let active = self.settings.active_ai_provider;
        for record in &mut self.ai_accounts {
            record.is_active = record.id == active;
            if let Some(config) = self.settings.ai_configs.get(&record.id) {
                record.model = config.model.clone();
            }
        }
    }

    // ---- status ----

    pub fn status(&self) -> TaskStatus {
        self.status
    }

    pub fn set_status(&mut self, status: TaskStatus) {
        self.status = status;
    }

    pub fn is_filling(&self) -> bool {
        self.filling
    }

    /// Claims the mass-fill slot.
    pub(crate) fn begin_fill(&mut self) -> Result<(), Error> {
        if self.filling {
            return Err(Error::AlreadyRunning("mass fill".to_string()));
        }
        self.filling = true;
        Ok(())
    }

    pub(crate) fn end_fill(&mut self) {
        self.filling = false;
    }
}

impl Default for AppState {
    fn default() -> Self {
        Self::seeded()
    }
}
