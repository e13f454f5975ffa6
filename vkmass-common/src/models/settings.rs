// File: vkmass-common/src/models/settings.rs

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::Error;
use crate::models::ai::{AiProviderConfig, AiProviderId};

/// User-tunable knobs for the cycle and the text-generation calls.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct AutomationSettings {
    pub keywords: Vec<String>,
    /// Tone of voice handed to the comment prompt.
    pub comment_template: String,
    /// Lower bound of the per-firing delay, in seconds.
    pub min_delay: u64,
    /// Upper bound of the per-firing delay, in seconds (inclusive).
    pub max_delay: u64,
    pub profile_theme: String,
    pub active_ai_provider: AiProviderId,
    pub ai_configs: BTreeMap<AiProviderId, AiProviderConfig>,
}

impl Default for AutomationSettings {
    fn default() -> Self {
        let mut ai_configs = BTreeMap::new();
        ai_configs.insert(
            AiProviderId::Gemini,
            AiProviderConfig { model: "gemini-3-flash-preview".to_string(), enabled: true },
        );
        ai_configs.insert(
            AiProviderId::OpenAi,
            AiProviderConfig { model: "gpt-4o-mini".to_string(), enabled: false },
        );
        ai_configs.insert(
            AiProviderId::Grok,
            AiProviderConfig { model: "grok-beta".to_string(), enabled: false },
        );

        Self {
            keywords: vec![
                "business".to_string(),
                "crypto".to_string(),
                "neural networks".to_string(),
                "marketing".to_string(),
            ],
            comment_template: "Smart expert".to_string(),
            min_delay: 3,
            max_delay: 8,
            profile_theme: "Tech entrepreneur / AI enthusiast".to_string(),
            active_ai_provider: AiProviderId::Gemini,
            ai_configs,
        }
    }
}

impl AutomationSettings {
    /// Checks `0 < min_delay <= max_delay` and that the active provider is configured.
    pub fn validate(&self) -> Result<(), Error> {
        if self.min_delay == 0 {
            return Err(Error::InvalidSettings("min_delay must be positive".to_string()));
        }
        if self.min_delay > self.max_delay {
            return Err(Error::InvalidSettings(format!(
                "min_delay ({}) is greater than max_delay ({})",
                self.min_delay, self.max_delay
            )));
        }
        if !self.ai_configs.contains_key(&self.active_ai_provider) {
            return Err(Error::UnknownProvider(self.active_ai_provider.to_string()));
        }
        Ok(())
    }

    /// Makes `id` the active provider and enables its config.
    pub fn select_provider(&mut self, id: AiProviderId) -> Result<(), Error> {
        let config = self
            .ai_configs
            .get_mut(&id)
            .ok_or_else(|| Error::UnknownProvider(id.to_string()))?;
        config.enabled = true;
        self.active_ai_provider = id;
        Ok(())
    }

    pub fn active_config(&self) -> Option<&AiProviderConfig> {
        self.ai_configs.get(&self.active_ai_provider)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        AutomationSettings::default().validate().unwrap();
    }

    #[test]
    fn rejects_inverted_delays() {
        let settings = AutomationSettings { min_delay: 9, max_delay: 8, ..Default::default() };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn rejects_zero_delay() {
        let settings = AutomationSettings { min_delay: 0, max_delay: 0, ..Default::default() };
        assert!(matches!(settings.validate(), Err(Error::InvalidSettings(_))));
    }

    #[test]
    fn rejects_unconfigured_active_provider() {
        let mut settings = AutomationSettings::default();
        settings.ai_configs.remove(&AiProviderId::Gemini);
        assert!(matches!(settings.validate(), Err(Error::UnknownProvider(_))));
    }

    #[test]
    fn selecting_missing_provider_leaves_settings_untouched() {
        let mut settings = AutomationSettings::default();
        settings.ai_configs.remove(&AiProviderId::Grok);
        let before = settings.clone();
        assert!(settings.select_provider(AiProviderId::Grok).is_err());
        assert_eq!(settings, before);
    }

    #[test]
    fn selecting_enables_target_config() {
        let mut settings = AutomationSettings::default();
        settings.select_provider(AiProviderId::OpenAi).unwrap();
        assert_eq!(settings.active_ai_provider, AiProviderId::OpenAi);
        assert!(settings.active_config().unwrap().enabled);
    }
}
