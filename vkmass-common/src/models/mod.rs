pub mod account;
pub mod ai;
pub mod log;
pub mod settings;
pub mod task;

pub use account::{Account, AccountLimits, AccountStats, AccountStatus, AutomationStep};
pub use ai::{AiAccount, AiProviderConfig, AiProviderId, GeneratedProfile};
pub use log::{LogEntry, LogKind, LogSource};
pub use settings::AutomationSettings;
pub use task::TaskStatus;
