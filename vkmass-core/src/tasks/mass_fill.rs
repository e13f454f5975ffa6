// vkmass-core/src/tasks/mass_fill.rs

use std::time::Duration;

use rand::Rng;
use tokio::time::sleep;
use tracing::{info, warn};
use vkmass_ai::AiClient;
use vkmass_common::Error;
use vkmass_common::models::{AutomationStep, GeneratedProfile, LogKind, TaskStatus};

use crate::state::SharedState;

/// Progress milestones walked for every account that is not ready yet.
const FILL_STEPS: [(u8, &str); 4] = [
    (25, "Proxy checked and connected"),
    (50, "Avatar uploaded"),
    (75, "Bio and status saved"),
    (100, "Privacy settings applied"),
];

/// Pause between fill milestones.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct FillPacing {
    pub min: Duration,
    pub max: Duration,
}

impl Default for FillPacing {
    fn default() -> Self {
        Self {
            min: Duration::from_millis(800),
            max: Duration::from_millis(1200),
        }
    }
}

impl FillPacing {
    pub fn none() -> Self {
        Self { min: Duration::ZERO, max: Duration::ZERO }
    }

    /// Pause bounds in milliseconds, saturating and ordered.
    fn bounds_ms(&self) -> (u64, u64) {
        let lo = u64::try_from(self.min.as_millis()).unwrap_or(u64::MAX);
        let hi = u64::try_from(self.max.as_millis()).unwrap_or(u64::MAX).max(lo);
        (lo, hi)
    }

    async fn pause(&self) {
        let (lo, hi) = self.bounds_ms();
        let ms = if lo == hi { lo } else { rand::rng().random_range(lo..=hi) };
        if ms > 0 {
            sleep(Duration::from_millis(ms)).await;
        }
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MassFillReport {
    pub completed: Vec<String>,
    pub skipped: Vec<String>,
    pub failed: Vec<String>,
}

impl MassFillReport {
    pub fn total(&self) -> usize {
        self.completed.len() + self.skipped.len() + self.failed.len()
    }
}

/// Generates a persona for every account that is not ready yet and walks its
/// progress to 100. One failing account does not stop the run.
///
/// Refused while the automation cycle is running, since the fill rewrites the
/// accounts' step and the task status.
pub async fn run_mass_fill(
    state: &SharedState,
    ai: &AiClient,
    pacing: FillPacing,
) -> Result<MassFillReport, Error> {
    let (accounts, settings) = {
        let mut st = state.lock().await;
        if st.status() == TaskStatus::Running {
            return Err(Error::AlreadyRunning("automation cycle".to_string()));
        }
        st.begin_fill()?;
        st.set_status(TaskStatus::Initializing);
        let provider = st.settings().active_ai_provider;
        st.log_system(
            LogKind::Warning,
            format!("Starting Step 0: AI profile filling via {}", provider.as_str().to_uppercase()),
        );
        (st.accounts().snapshot(), st.settings().clone())
    };
    info!("Mass fill started for {} account(s)", accounts.len());

    let provider = settings.active_ai_provider;
    let config = settings.active_config().cloned();
    let mut report = MassFillReport::default();

    for account in accounts {
        if account.is_ready() {
            state
                .lock()
                .await
                .log_account(LogKind::Info, &account, "Profile already ready; skipping");
            report.skipped.push(account.id.clone());
            continue;
        }

        state.lock().await.log_account(
            LogKind::Ai,
            &account,
            format!("Generating persona: {}", settings.profile_theme),
        );

        let profile = match &config {
            Some(config) if config.enabled => {
                ai.generate_profile(Some(provider), Some(&config.model), &settings.profile_theme, &account.name)
                    .await
            }
            _ => {
                warn!("{} is disabled; {} gets an empty profile", provider, account.name);
                Ok(GeneratedProfile::default())
            }
        };

        let profile = match profile {
            Ok(profile) => profile,
            Err(e) => {
                state.lock().await.log_account(
                    LogKind::Error,
                    &account,
                    format!("Profile generation failed: {:#}", e),
                );
                report.failed.push(account.id.clone());
                continue;
            }
        };

        let status_line = if profile.status.is_empty() {
            "Persona ready (empty profile)".to_string()
        } else {
            format!("Persona ready: \"{}\"", profile.status)
        };
        state.lock().await.log_account(LogKind::Success, &account, status_line);

        for (progress, label) in FILL_STEPS {
            pacing.pause().await;
            let mut st = state.lock().await;
            st.update_account(&account.id, |a| {
                a.progress = progress;
                a.current_step = AutomationStep::Step0Filling;
            });
            st.log_account(LogKind::Info, &account, format!("{} ({}%)", label, progress));
        }

        state
            .lock()
            .await
            .log_account(LogKind::Success, &account, "Profile filled and ready");
        report.completed.push(account.id.clone());
    }

    {
        let mut st = state.lock().await;
        st.set_status(TaskStatus::Idle);
        st.end_fill();
        st.log_system(
            LogKind::Success,
            format!(
                "Step 0 finished: {} filled, {} already ready, {} failed",
                report.completed.len(),
                report.skipped.len(),
                report.failed.len()
            ),
        );
    }
    info!("Mass fill finished: {:?}", report);
    Ok(report)
}
