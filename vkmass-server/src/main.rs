use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use tracing::{error, info, warn};
use tracing_subscriber::{EnvFilter, fmt};

use vkmass_ai::{AiClient, Credential, ProviderConfig, ProviderRegistry};
use vkmass_common::models::{AiProviderId, AutomationSettings};
use vkmass_common::seed::mock_accounts;
use vkmass_core::AppState;
use vkmass_core::dashboard::{DashboardSummary, progress_rows};
use vkmass_core::scheduler::{CycleDriver, TokioClock, UniformDelay};
use vkmass_core::tasks::{AutomationControl, FillPacing, run_mass_fill, spawn_automation_task};

mod config;
use config::{Args, load_settings};

fn init_tracing() {
    if let Err(e) = tracing_log::LogTracer::init() {
        eprintln!("log bridge not installed: {}", e);
    }
    let filter = EnvFilter::from_default_env()
        .add_directive("vkmass=info".parse().unwrap_or_default());
    let sub = fmt().with_env_filter(filter).finish();
    if let Err(e) = tracing::subscriber::set_global_default(sub) {
        eprintln!("Failed to set global subscriber: {}", e);
    }
}

/// Registers one provider per backend; keys are looked up on every call.
async fn build_registry(settings: &AutomationSettings) -> Arc<ProviderRegistry> {
    let model = |id: AiProviderId, fallback: &str| {
        settings
            .ai_configs
            .get(&id)
            .map(|c| c.model.clone())
            .unwrap_or_else(|| fallback.to_string())
    };

    let registry = Arc::new(ProviderRegistry::new());
    registry
        .register(ProviderRegistry::create_gemini(ProviderConfig::new(
            Credential::env(&["GEMINI_API_KEY", "API_KEY"]),
            &model(AiProviderId::Gemini, "gemini-3-flash-preview"),
        )))
        .await;
    registry
        .register(ProviderRegistry::create_openai(ProviderConfig::new(
            Credential::env(&["OPENAI_API_KEY"]),
            &model(AiProviderId::OpenAi, "gpt-4o-mini"),
        )))
        .await;
    registry
        .register(ProviderRegistry::create_grok(ProviderConfig::new(
            Credential::env(&["XAI_API_KEY"]),
            &model(AiProviderId::Grok, "grok-beta"),
        )))
        .await;

    for id in registry.ids().await {
        if let Some(provider) = registry.get(id).await {
            if !provider.has_credential() {
                warn!("No API key for {}; comments will use stock fallbacks", id);
            }
        }
    }
    registry
}

async fn wait_for_shutdown(duration: Option<Duration>) {
    match duration {
        Some(d) => {
            tokio::select! {
                _ = tokio::time::sleep(d) => info!("Run duration of {:?} elapsed", d),
                _ = tokio::signal::ctrl_c() => info!("Ctrl+C received"),
            }
        }
        None => {
            if let Err(e) = tokio::signal::ctrl_c().await {
                error!("Failed to listen for Ctrl+C: {}", e);
            }
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    dotenv::dotenv().ok();
    init_tracing();
    let args = Args::parse();

    let settings = load_settings(&args)?;
    info!(
        "vkmass starting. provider={}, delay={}-{}s, mass_fill={}",
        settings.active_ai_provider, settings.min_delay, settings.max_delay, args.mass_fill
    );

    let registry = build_registry(&settings).await;
    let ai = Arc::new(AiClient::new(registry, settings.active_ai_provider));
    let state = AppState::new(mock_accounts(), settings)?.into_shared();

    if args.mass_fill {
        match run_mass_fill(&state, &ai, FillPacing::default()).await {
            Ok(report) => info!(
                "Step 0 done: {} filled, {} skipped, {} failed",
                report.completed.len(),
                report.skipped.len(),
                report.failed.len()
            ),
            Err(e) => error!("Step 0 did not run: {}", e),
        }
    }

    let driver = CycleDriver::new(
        ai.clone(),
        Arc::new(TokioClock::new()),
        Box::new(UniformDelay::from_os_rng()),
    );
    let control = AutomationControl::new();
    let handle = spawn_automation_task(driver, state.clone(), &control);
    control.start();

    wait_for_shutdown(args.duration_secs.map(Duration::from_secs)).await;

    control.stop();
    drop(control);
    if let Err(e) = handle.await {
        error!("Automation task panicked: {:?}", e);
    }

    let st = state.lock().await;
    println!("{}", DashboardSummary::from_state(&st));
    for row in progress_rows(&st) {
        println!("  {:<12} {:>3}%{}", row.name, row.progress, if row.ready { "  ready" } else { "" });
    }
    println!("Recent events:");
    for entry in st.logs().latest(args.recent_logs).iter().rev() {
        println!(
            "  {} [{:<7}] {}: {}",
            entry.timestamp.format("%H:%M:%S"),
            entry.kind,
            entry.source.display_name(),
            entry.message
        );
    }
    Ok(())
}
