// File: vkmass-common/src/models/ai.rs

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::Error;

/// The closed set of text-generation providers the panel knows about.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AiProviderId {
    Gemini,
    OpenAi,
    Grok,
}

impl AiProviderId {
    pub const ALL: [AiProviderId; 3] = [AiProviderId::Gemini, AiProviderId::OpenAi, AiProviderId::Grok];

    pub fn as_str(&self) -> &'static str {
        match self {
            AiProviderId::Gemini => "gemini",
            AiProviderId::OpenAi => "openai",
            AiProviderId::Grok => "grok",
        }
    }
}

impl fmt::Display for AiProviderId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AiProviderId {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "gemini" => Ok(AiProviderId::Gemini),
            "openai" => Ok(AiProviderId::OpenAi),
            "grok" => Ok(AiProviderId::Grok),
            other => Err(Error::UnknownProvider(other.to_string())),
        }
    }
}

/// Per-provider settings held in [`crate::models::settings::AutomationSettings`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiProviderConfig {
    pub model: String,
    pub enabled: bool,
}

/// Display/usage record for one provider.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AiAccount {
    pub id: AiProviderId,
    pub name: String,
    pub provider: String,
    pub model: String,
    pub is_active: bool,
    pub usage_count: u64,
}

impl AiAccount {
    pub fn new(id: AiProviderId, name: &str, provider: &str, model: &str) -> Self {
        Self {
            id,
            name: name.to_string(),
            provider: provider.to_string(),
            model: model.to_string(),
            is_active: false,
            usage_count: 0,
        }
    }
}

/// Persona produced by the structured profile request.
///
/// Every field defaults to empty so a malformed response can degrade to
/// `GeneratedProfile::default()`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct GeneratedProfile {
    pub bio: String,
    pub status: String,
    /// Comma separated.
    pub interests: String,
}

impl GeneratedProfile {
    pub fn is_empty(&self) -> bool {
        self.bio.is_empty() && self.status.is_empty() && self.interests.is_empty()
    }

    pub fn interest_list(&self) -> Vec<String> {
        self.interests
            .split(',')
            .map(|s| s.trim())
            .filter(|s| !s.is_empty())
            .map(|s| s.to_string())
            .collect()
    }
}
