use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use reqwest::Client;
use serde_json::{Value, json};
use tokio::sync::RwLock;
use vkmass_common::models::AiProviderId;

use crate::models::{GenerationRequest, ProviderConfig};
use crate::traits::ModelProvider;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta";
const OPENAI_API_BASE: &str = "https://api.openai.com/v1";
const GROK_API_BASE: &str = "https://api.x.ai/v1";

/// Google Gemini provider implementation
pub struct GeminiProvider {
    config: ProviderConfig,
    client: Client,
}

impl GeminiProvider {
    /// Create a new Gemini provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }
}

#[async_trait]
impl ModelProvider for GeminiProvider {
    fn id(&self) -> AiProviderId {
        AiProviderId::Gemini
    }

    fn has_credential(&self) -> bool {
        self.config.credential.resolve().is_some()
    }

    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String> {
        let api_key = self
            .config
            .credential
            .resolve()
            .ok_or_else(|| anyhow::anyhow!("No API key configured for gemini"))?;
        let api_base = self.config.api_base.clone().unwrap_or_else(|| GEMINI_API_BASE.to_string());
        let model = request.model.clone().unwrap_or_else(|| self.config.default_model.clone());

        let payload = gemini_payload(&request);
        tracing::debug!("Making API call to {}/models/{}:generateContent", api_base, model);

        let response = self
            .client
            .post(format!("{}/models/{}:generateContent", api_base, model))
            .header("x-goog-api-key", api_key)
            .json(&payload)
            .send()
            .await?;

        let data = read_json_body(response).await?;
        extract_gemini_text(&data)
    }
}

/// OpenAI provider implementation
pub struct OpenAIProvider {
    config: ProviderConfig,
    client: Client,
}

impl OpenAIProvider {
    /// Create a new OpenAI provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }
}

#[async_trait]
impl ModelProvider for OpenAIProvider {
    fn id(&self) -> AiProviderId {
        AiProviderId::OpenAi
    }

    fn has_credential(&self) -> bool {
        self.config.credential.resolve().is_some()
    }

    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String> {
        chat_completion(&self.client, &self.config, OPENAI_API_BASE, "openai", &request).await
    }
}

/// xAI Grok provider implementation. The API speaks the chat-completions dialect.
pub struct GrokProvider {
    config: ProviderConfig,
    client: Client,
}

impl GrokProvider {
    /// Create a new Grok provider with the given configuration
    pub fn new(config: ProviderConfig) -> Self {
        let client = Client::new();
        Self { config, client }
    }
}

#[async_trait]
impl ModelProvider for GrokProvider {
    fn id(&self) -> AiProviderId {
        AiProviderId::Grok
    }

    fn has_credential(&self) -> bool {
        self.config.credential.resolve().is_some()
    }

    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String> {
        chat_completion(&self.client, &self.config, GROK_API_BASE, "grok", &request).await
    }
}

async fn chat_completion(
    client: &Client,
    config: &ProviderConfig,
    default_base: &str,
    name: &str,
    request: &GenerationRequest,
) -> anyhow::Result<String> {
    let api_key = config
        .credential
        .resolve()
        .ok_or_else(|| anyhow::anyhow!("No API key configured for {}", name))?;
    let api_base = config.api_base.clone().unwrap_or_else(|| default_base.to_string());
    let model = request.model.clone().unwrap_or_else(|| config.default_model.clone());

    let payload = chat_payload(&model, request);
    tracing::debug!("Making API call to {}/chat/completions (model={})", api_base, model);

    let response = client
        .post(format!("{}/chat/completions", api_base))
        .header("Authorization", format!("Bearer {}", api_key))
        .json(&payload)
        .send()
        .await?;

    let data = read_json_body(response).await?;
    extract_chat_text(&data)
}

async fn read_json_body(response: reqwest::Response) -> anyhow::Result<Value> {
    let status = response.status();
    // Get the raw response text first for better error handling
    let response_text = response.text().await?;
    tracing::trace!("Raw API response: {}", response_text);

    let data = serde_json::from_str::<Value>(&response_text).map_err(|e| {
        tracing::error!("Failed to parse API response as JSON (status {}): {:?}", status, e);
        anyhow::anyhow!("API returned non-JSON response ({}): {}", status, e)
    })?;

    if let Some(error) = data.get("error") {
        let error_message = error
            .get("message")
            .and_then(|m| m.as_str())
            .unwrap_or("Unknown error");
        return Err(anyhow::anyhow!("API error ({}): {}", status, error_message));
    }
    if !status.is_success() {
        return Err(anyhow::anyhow!("API request failed with status {}", status));
    }
    Ok(data)
}

/// Builds a `generateContent` body.
pub fn gemini_payload(request: &GenerationRequest) -> Value {
    let mut payload = json!({
        "contents": [{
            "role": "user",
            "parts": [{ "text": request.prompt }]
        }],
        "generationConfig": {
            "temperature": request.temperature,
        }
    });

    if let Some(system) = &request.system_instruction {
        payload["systemInstruction"] = json!({ "parts": [{ "text": system }] });
    }
    if let Some(schema) = &request.response_schema {
        payload["generationConfig"]["responseMimeType"] = json!("application/json");
        payload["generationConfig"]["responseSchema"] = gemini_schema(schema);
    }
    payload
}

/// Gemini's schema dialect spells type names in upper case.
fn gemini_schema(schema: &Value) -> Value {
    match schema {
        Value::Object(map) => Value::Object(
            map.iter()
                .map(|(k, v)| {
                    let v = match (k.as_str(), v) {
                        ("type", Value::String(t)) => Value::String(t.to_ascii_uppercase()),
                        _ => gemini_schema(v),
                    };
                    (k.clone(), v)
                })
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.iter().map(gemini_schema).collect()),
        other => other.clone(),
    }
}

/// Builds a chat-completions body.
pub fn chat_payload(model: &str, request: &GenerationRequest) -> Value {
    let mut messages = Vec::new();
    if let Some(system) = &request.system_instruction {
        messages.push(json!({ "role": "system", "content": system }));
    }
    messages.push(json!({ "role": "user", "content": request.prompt }));

    let mut payload = json!({
        "model": model,
        "messages": messages,
        "temperature": request.temperature,
        "max_tokens": 400,
    });

    if let Some(schema) = &request.response_schema {
        let mut schema = schema.clone();
        if let Some(obj) = schema.as_object_mut() {
            obj.remove("propertyOrdering");
        }
        payload["response_format"] = json!({
            "type": "json_schema",
            "json_schema": { "name": "structured_output", "schema": schema }
        });
    }
    payload
}

/// Concatenates the text parts of the first Gemini candidate.
pub fn extract_gemini_text(data: &Value) -> anyhow::Result<String> {
    let parts = data
        .get("candidates")
        .and_then(|c| c.as_array())
        .and_then(|c| c.first())
        .and_then(|c| c.get("content"))
        .and_then(|c| c.get("parts"))
        .and_then(|p| p.as_array())
        .ok_or_else(|| anyhow::anyhow!("Response missing candidate content"))?;

    let text: String = parts
        .iter()
        .filter_map(|p| p.get("text").and_then(|t| t.as_str()))
        .collect();
    Ok(text)
}

/// Content of the first chat-completions choice.
pub fn extract_chat_text(data: &Value) -> anyhow::Result<String> {
    let choices = data
        .get("choices")
        .and_then(|c| c.as_array())
        .ok_or_else(|| anyhow::anyhow!("Response missing 'choices' array"))?;

    let first = choices
        .first()
        .ok_or_else(|| anyhow::anyhow!("No completions returned"))?;

    let content = first
        .get("message")
        .and_then(|m| m.get("content"))
        .and_then(|c| c.as_str())
        .ok_or_else(|| anyhow::anyhow!("Response message missing 'content'"))?;
    Ok(content.to_string())
}

/// Lookup table of providers keyed by id.
pub struct ProviderRegistry {
    providers: Arc<RwLock<HashMap<AiProviderId, Arc<dyn ModelProvider>>>>,
}

impl Default for ProviderRegistry {
    fn default() -> Self {
        Self::new()
    }
}

impl ProviderRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            providers: Arc::new(RwLock::new(HashMap::new())),
        }
    }

    /// Register a provider, replacing any previous one with the same id
    pub async fn register<P: ModelProvider + 'static>(&self, provider: P) {
        self.register_arc(Arc::new(provider)).await;
    }

    pub async fn register_arc(&self, provider: Arc<dyn ModelProvider>) {
        let mut providers = self.providers.write().await;
        providers.insert(provider.id(), provider);
    }

    /// Get a provider by id
    pub async fn get(&self, id: AiProviderId) -> Option<Arc<dyn ModelProvider>> {
        let providers = self.providers.read().await;
        providers.get(&id).cloned()
    }

    /// Ids of every registered provider, sorted
    pub async fn ids(&self) -> Vec<AiProviderId> {
        let providers = self.providers.read().await;
        let mut ids: Vec<_> = providers.keys().copied().collect();
        ids.sort();
        ids
    }

    pub fn create_gemini(config: ProviderConfig) -> GeminiProvider {
        GeminiProvider::new(config)
    }

    pub fn create_openai(config: ProviderConfig) -> OpenAIProvider {
        OpenAIProvider::new(config)
    }

    pub fn create_grok(config: ProviderConfig) -> GrokProvider {
        GrokProvider::new(config)
    }
}
