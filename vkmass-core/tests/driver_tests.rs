// vkmass-core/tests/driver_tests.rs

mod test_utils;

use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use vkmass_ai::{AiClient, GenerationRequest, ModelProvider, ProviderRegistry};
use vkmass_common::models::{AccountStatus, AiProviderId, AutomationStep, LogKind, TaskStatus};
use vkmass_core::scheduler::COMMENT_DISPLAY_CHARS;
use vkmass_core::tasks::{AutomationControl, FillPacing, run_mass_fill};

use test_utils::helpers::*;

#[tokio::test]
async fn two_accounts_come_full_circle_after_five_firings() {
    let ai = ai_with(ScriptedProvider::ok("Nice post!")).await;
    let state = shared_state(vec![account("A"), account("B")]);
    let (mut driver, _clock) = manual_driver(ai, Duration::ZERO);

    assert_eq!(driver.start(&state).await, 2);
    for _ in 0..5 {
        assert_eq!(driver.run_due(&state).await, 2);
    }

    let st = state.lock().await;
    for id in ["A", "B"] {
        let account = st.account(id).unwrap();
        assert_eq!(account.current_step, AutomationStep::Profiling);
        assert_eq!(account.stats.comments_posted, 1);
        assert_eq!(account.stats.friends_added, 1);
        assert_eq!(account.stats.groups_joined, 1);
        assert_eq!(account.stats.clips_commented, 1);
    }
}

#[tokio::test]
async fn steps_follow_the_cycle_from_any_start() {
    let ai = ai_with(ScriptedProvider::ok("ok")).await;
    let mut late = account("late");
    late.current_step = AutomationStep::Clips;
    let mut fresh = account("fresh");
    fresh.current_step = AutomationStep::Idle;
    let state = shared_state(vec![late, fresh]);
    let (mut driver, _clock) = manual_driver(ai, Duration::ZERO);
    driver.start(&state).await;

    let cycle = AutomationStep::CYCLE;
    for n in 0..13 {
        driver.run_due(&state).await;
        let st = state.lock().await;
        // "late" starts at index 4, "fresh" outside the cycle.
        assert_eq!(st.account("late").unwrap().current_step, cycle[n % 5]);
        assert_eq!(st.account("fresh").unwrap().current_step, cycle[n % 5]);
    }
}

#[tokio::test]
async fn each_round_fires_only_what_was_due() {
    let ai = ai_with(ScriptedProvider::ok("ok")).await;
    let state = shared_state(vec![account("A")]);
    let (mut driver, clock) = manual_driver(ai, Duration::from_secs(5));
    driver.start(&state).await;

    assert_eq!(driver.run_due(&state).await, 0);
    clock.advance(Duration::from_secs(4));
    assert_eq!(driver.run_due(&state).await, 0);
    clock.advance(Duration::from_secs(1));
    assert_eq!(driver.run_due(&state).await, 1);
    assert_eq!(driver.pending(), 1);
    assert_eq!(driver.next_deadline(), Some(Duration::from_secs(10)));
}

#[tokio::test]
async fn remote_failure_logs_error_and_cycle_continues() {
    let provider = ScriptedProvider::failing("503 from upstream");
    let calls = provider.calls();
    let ai = ai_with(provider).await;
    let mut acc = account("A");
    acc.current_step = AutomationStep::Subscribing;
    let state = shared_state(vec![acc]);
    let (mut driver, _clock) = manual_driver(ai, Duration::ZERO);
    driver.start(&state).await;

    driver.run_due(&state).await;
    driver.run_due(&state).await;

    assert_eq!(call_count(&calls), 1);
    let st = state.lock().await;
    let account = st.account("A").unwrap();
    assert_eq!(account.current_step, AutomationStep::Clips);
    assert_eq!(account.stats.comments_posted, 1);
    assert_eq!(st.logs().count_kind(LogKind::Error), 1);
    assert_eq!(st.logs().count_kind(LogKind::Ai), 1);
    assert_eq!(st.ai_accounts().iter().map(|a| a.usage_count).sum::<u64>(), 0);
}

#[tokio::test]
async fn generated_comment_is_truncated_and_counted() {
    let long = "x".repeat(COMMENT_DISPLAY_CHARS + 40);
    let ai = ai_with(ScriptedProvider::ok(&long)).await;
    let mut acc = account("A");
    acc.current_step = AutomationStep::Subscribing;
    let state = shared_state(vec![acc]);
    let (driver, _clock) = manual_driver(ai, Duration::ZERO);
    let mut driver = driver.with_topics(vec!["Launch day".to_string()]);
    driver.start(&state).await;
    driver.run_due(&state).await;

    let st = state.lock().await;
    let ai_entries = st.logs().by_kind(LogKind::Ai);
    let entry = &ai_entries[0];
    assert!(entry.message.contains("Launch day"));
    let shown = format!("{}…", "x".repeat(COMMENT_DISPLAY_CHARS));
    assert!(entry.message.ends_with(&shown), "got {}", entry.message);
    assert_eq!(entry.source.id(), "A");
    assert_eq!(st.logs().count_kind(LogKind::Error), 0);

    let gemini = st.ai_accounts().iter().find(|a| a.id == AiProviderId::Gemini).unwrap();
    assert_eq!(gemini.usage_count, 1);
}

#[tokio::test]
async fn missing_credential_uses_fallback_without_error() {
    let provider = ScriptedProvider::without_credential();
    let calls = provider.calls();
    let ai = ai_with(provider).await;
    let mut acc = account("A");
    acc.current_step = AutomationStep::Subscribing;
    let state = shared_state(vec![acc]);
    let (mut driver, _clock) = manual_driver(ai, Duration::ZERO);
    driver.start(&state).await;
    driver.run_due(&state).await;

    assert_eq!(call_count(&calls), 0);
    let st = state.lock().await;
    assert_eq!(st.logs().count_kind(LogKind::Ai), 1);
    assert_eq!(st.logs().count_kind(LogKind::Error), 0);
    assert_eq!(st.account("A").unwrap().stats.comments_posted, 1);
}

#[tokio::test]
async fn stop_cancels_every_pending_firing() {
    let ai = ai_with(ScriptedProvider::ok("ok")).await;
    let state = shared_state(vec![account("A"), account("B")]);
    let (mut driver, clock) = manual_driver(ai, Duration::from_secs(3));
    driver.start(&state).await;
    assert_eq!(driver.pending(), 2);

    driver.stop(&state).await;
    assert_eq!(driver.pending(), 0);
    assert_eq!(driver.next_deadline(), None);

    let before = state.lock().await.accounts().snapshot();
    clock.advance(Duration::from_secs(60));
    assert_eq!(driver.run_due(&state).await, 0);

    let st = state.lock().await;
    assert_eq!(st.status(), TaskStatus::Idle);
    for old in before {
        assert_eq!(*st.account(&old.id).unwrap(), *old);
    }
}

#[tokio::test]
async fn run_due_before_start_fires_nothing() {
    let ai = ai_with(ScriptedProvider::ok("ok")).await;
    let state = shared_state(vec![account("A")]);
    let (mut driver, _clock) = manual_driver(ai, Duration::ZERO);
    assert_eq!(driver.run_due(&state).await, 0);
    assert!(state.lock().await.logs().is_empty());
}

#[tokio::test]
async fn only_online_accounts_are_scheduled() {
    let ai = ai_with(ScriptedProvider::ok("ok")).await;
    let mut banned = account("banned");
    banned.status = AccountStatus::Banned;
    let mut offline = account("offline");
    offline.status = AccountStatus::Offline;
    let state = shared_state(vec![account("A"), banned, offline]);
    let (mut driver, _clock) = manual_driver(ai, Duration::ZERO);

    assert_eq!(driver.start(&state).await, 1);
    assert!(driver.is_pending("A"));
    assert!(!driver.is_pending("banned"));
    for _ in 0..3 {
        driver.run_due(&state).await;
    }

    let st = state.lock().await;
    assert_eq!(st.account("banned").unwrap().current_step, AutomationStep::Profiling);
    assert_eq!(st.account("offline").unwrap().current_step, AutomationStep::Profiling);
    let skipped: Vec<_> = st
        .logs()
        .by_kind(LogKind::Warning)
        .into_iter()
        .filter(|e| e.message.starts_with("Skipped"))
        .collect();
    assert_eq!(skipped.len(), 2);
}

#[tokio::test]
async fn counter_at_limit_is_not_incremented() {
    let ai = ai_with(ScriptedProvider::ok("ok")).await;
    let mut acc = account("A");
    acc.limits.friends = 3;
    acc.stats.friends_added = 3;
    let state = shared_state(vec![acc]);
    let (mut driver, _clock) = manual_driver(ai, Duration::ZERO);
    driver.start(&state).await;
    driver.run_due(&state).await;

    let st = state.lock().await;
    let account = st.account("A").unwrap();
    assert_eq!(account.current_step, AutomationStep::Searching);
    assert_eq!(account.stats.friends_added, 3);
    assert!(
        st.logs()
            .by_kind(LogKind::Warning)
            .iter()
            .any(|e| e.message.contains("friends limit"))
    );
}

/// Provider that toggles the run flag while its call is in flight.
struct TogglingProvider {
    control: AutomationControl,
    restart: bool,
}

#[async_trait]
impl ModelProvider for TogglingProvider {
    fn id(&self) -> AiProviderId {
        AiProviderId::Gemini
    }

    fn has_credential(&self) -> bool {
        true
    }

    async fn generate(&self, _request: GenerationRequest) -> anyhow::Result<String> {
        self.control.stop();
        if self.restart {
            self.control.start();
        }
        Ok("too late".to_string())
    }
}

async fn toggled_mid_generation(restart: bool) {
    let control = AutomationControl::new();
    control.start();
    let rx = control.subscribe();
    let registry = Arc::new(ProviderRegistry::new());
    registry.register(TogglingProvider { control, restart }).await;
    let ai = Arc::new(AiClient::new(registry, AiProviderId::Gemini));

    let mut acc = account("A");
    acc.current_step = AutomationStep::Subscribing;
    let state = shared_state(vec![acc]);
    let (driver, _clock) = manual_driver(ai, Duration::ZERO);
    let mut driver = driver.with_control(rx);
    driver.start(&state).await;

    assert_eq!(driver.run_due(&state).await, 0);

    let st = state.lock().await;
    let account = st.account("A").unwrap();
    assert_eq!(account.current_step, AutomationStep::Subscribing);
    assert_eq!(account.stats.comments_posted, 0);
    assert_eq!(st.logs().count_kind(LogKind::Ai), 0);
    drop(st);
    assert_eq!(driver.run_due(&state).await, 0);
}

#[tokio::test]
async fn stop_during_generation_applies_no_mutation() {
    toggled_mid_generation(false).await;
}

#[tokio::test]
async fn restart_during_generation_discards_the_old_firing() {
    toggled_mid_generation(true).await;
}

#[tokio::test]
async fn start_is_refused_while_mass_fill_runs() {
    let ai = ai_with(ScriptedProvider::ok("ok")).await;
    let state = shared_state(vec![account("A")]);
    let (mut driver, _clock) = manual_driver(ai.clone(), Duration::ZERO);

    let fill = {
        let state = state.clone();
        tokio::spawn(async move { run_mass_fill(&state, &ai, FillPacing::default()).await })
    };
    // Wait until the fill holds its slot.
    while !state.lock().await.is_filling() {
        tokio::task::yield_now().await;
    }

    assert_eq!(driver.start(&state).await, 0);
    assert!(!driver.is_running());
    assert_eq!(state.lock().await.status(), TaskStatus::Initializing);

    fill.abort();
}
