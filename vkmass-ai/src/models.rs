use serde::{Deserialize, Serialize};

/// Where a provider's API key comes from.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Credential {
    /// A fixed key, mostly for tests.
    Static(String),
    /// Environment variables tried in order; the first non-empty one wins.
    Env(Vec<String>),
    Missing,
}

impl Credential {
    pub fn env(names: &[&str]) -> Self {
        Credential::Env(names.iter().map(|n| n.to_string()).collect())
    }

    /// Resolves the key. Environment lookups happen on every call so a key
    /// exported after startup is picked up.
    pub fn resolve(&self) -> Option<String> {
        match self {
            Credential::Static(key) if !key.trim().is_empty() => Some(key.clone()),
            Credential::Static(_) | Credential::Missing => None,
            Credential::Env(names) => names
                .iter()
                .filter_map(|name| std::env::var(name).ok())
                .find(|value| !value.trim().is_empty()),
        }
    }
}

/// Configuration for an AI provider
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProviderConfig {
    /// Base URL for API requests; each provider has its own default.
    pub api_base: Option<String>,

    pub credential: Credential,

    /// Model used when the request does not name one.
    pub default_model: String,
}

impl ProviderConfig {
    pub fn new(credential: Credential, default_model: &str) -> Self {
        Self {
            api_base: None,
            credential,
            default_model: default_model.to_string(),
        }
    }

    pub fn with_api_base(mut self, api_base: &str) -> Self {
        self.api_base = Some(api_base.trim_end_matches('/').to_string());
        self
    }
}

/// A single generation call, independent of the backend.
#[derive(Debug, Clone, PartialEq)]
pub struct GenerationRequest {
    pub prompt: String,
    pub system_instruction: Option<String>,
    /// Overrides [`ProviderConfig::default_model`].
    pub model: Option<String>,
    pub temperature: f32,
    /// JSON-schema-like description of the expected object, for structured output.
    pub response_schema: Option<serde_json::Value>,
}

impl GenerationRequest {
    pub fn new(prompt: impl Into<String>) -> Self {
        Self {
            prompt: prompt.into(),
            system_instruction: None,
            model: None,
            temperature: 1.0,
            response_schema: None,
        }
    }

    pub fn with_system_instruction(mut self, instruction: impl Into<String>) -> Self {
        self.system_instruction = Some(instruction.into());
        self
    }

    pub fn with_model(mut self, model: Option<&str>) -> Self {
        self.model = model.map(|m| m.to_string());
        self
    }

    pub fn with_schema(mut self, schema: serde_json::Value) -> Self {
        self.response_schema = Some(schema);
        self
    }

    pub fn with_temperature(mut self, temperature: f32) -> Self {
        self.temperature = temperature;
        self
    }
}
