// vkmass-server/src/config.rs

use std::fs;
use std::path::PathBuf;

use anyhow::Context;
use clap::Parser;
use vkmass_common::models::{AiProviderId, AutomationSettings};

#[derive(Parser, Debug, Clone)]
#[command(name = "vkmass")]
#[command(author, version, about = "VK mass-automation panel - headless simulation runner")]
pub struct Args {
    /// How long to keep the cycle running, in seconds. Runs until Ctrl+C when omitted.
    #[arg(long)]
    pub duration_secs: Option<u64>,

    /// Run Step 0 (AI profile filling) before starting the cycle.
    #[arg(long, default_value = "false")]
    pub mass_fill: bool,

    /// Path to a JSON file with automation settings. Missing keys keep their defaults.
    #[arg(long)]
    pub settings: Option<PathBuf>,

    /// Active AI provider: gemini, openai or grok.
    #[arg(long)]
    pub provider: Option<AiProviderId>,

    /// Lower bound of the per-firing delay, in seconds.
    #[arg(long)]
    pub min_delay: Option<u64>,

    /// Upper bound of the per-firing delay, in seconds.
    #[arg(long)]
    pub max_delay: Option<u64>,

    /// Number of log entries printed when the run ends.
    #[arg(long, default_value_t = 20)]
    pub recent_logs: usize,
}

/// Parses settings JSON, naming the offending key on failure.
pub fn parse_settings(text: &str) -> anyhow::Result<AutomationSettings> {
    let de = &mut serde_json::Deserializer::from_str(text);
    serde_path_to_error::deserialize(de).map_err(|e| {
        let path = e.path().to_string();
        anyhow::anyhow!("invalid settings at '{}': {}", path, e.into_inner())
    })
}

/// Settings file (or defaults) with command-line overrides applied, validated.
pub fn load_settings(args: &Args) -> anyhow::Result<AutomationSettings> {
    let mut settings = match &args.settings {
        Some(path) => {
            let text = fs::read_to_string(path)
                .with_context(|| format!("reading settings from {}", path.display()))?;
            parse_settings(&text)?
        }
        None => AutomationSettings::default(),
    };

    if let Some(min) = args.min_delay {
        settings.min_delay = min;
    }
    if let Some(max) = args.max_delay {
        settings.max_delay = max;
    }
    if let Some(provider) = args.provider {
        settings.select_provider(provider)?;
    }

    settings.validate()?;
    Ok(settings)
}
