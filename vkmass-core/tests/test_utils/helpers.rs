// vkmass-core/tests/test_utils/helpers.rs

#![allow(dead_code)]

use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;
use vkmass_ai::{AiClient, GenerationRequest, ModelProvider, ProviderRegistry};
use vkmass_common::models::{Account, AiProviderId, AutomationSettings, AutomationStep};
use vkmass_core::scheduler::{CycleDriver, FixedDelay, ManualClock};
use vkmass_core::{AppState, SharedState};

/// Provider that answers every call the same way and counts calls.
pub struct ScriptedProvider {
    pub id: AiProviderId,
    pub reply: Result<String, String>,
    pub credential: bool,
    pub calls: Arc<AtomicUsize>,
}

impl ScriptedProvider {
    pub fn ok(text: &str) -> Self {
        Self {
            id: AiProviderId::Gemini,
            reply: Ok(text.to_string()),
            credential: true,
            calls: Arc::new(AtomicUsize::new(0)),
        }
    }

    pub fn failing(msg: &str) -> Self {
        Self {
            reply: Err(msg.to_string()),
            ..Self::ok("")
        }
    }

    pub fn without_credential() -> Self {
        Self {
            credential: false,
            ..Self::ok("never used")
        }
    }

    pub fn calls(&self) -> Arc<AtomicUsize> {
        self.calls.clone()
    }
}

#[async_trait]
impl ModelProvider for ScriptedProvider {
    fn id(&self) -> AiProviderId {
        self.id
    }

    fn has_credential(&self) -> bool {
        self.credential
    }

    async fn generate(&self, _request: GenerationRequest) -> anyhow::Result<String> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        match &self.reply {
            Ok(text) => Ok(text.clone()),
            Err(msg) => Err(anyhow::anyhow!("{}", msg)),
        }
    }
}

pub fn call_count(calls: &Arc<AtomicUsize>) -> usize {
    calls.load(Ordering::SeqCst)
}

pub async fn ai_with(provider: ScriptedProvider) -> Arc<AiClient> {
    let registry = Arc::new(ProviderRegistry::new());
    let id = provider.id;
    registry.register(provider).await;
    Arc::new(AiClient::new(registry, id))
}

pub fn account(id: &str) -> Account {
    let mut account = Account::new(id, &format!("Account {}", id), "10.0.0.1:3128");
    account.current_step = AutomationStep::Profiling;
    account
}

pub fn shared_state(accounts: Vec<Account>) -> SharedState {
    AppState::new(accounts, AutomationSettings::default())
        .expect("default settings are valid")
        .into_shared()
}

/// Driver on a manual clock with a fixed delay.
pub fn manual_driver(ai: Arc<AiClient>, delay: Duration) -> (CycleDriver, ManualClock) {
    let clock = ManualClock::new();
    let driver = CycleDriver::new(ai, Arc::new(clock.clone()), Box::new(FixedDelay(delay)));
    (driver, clock)
}
