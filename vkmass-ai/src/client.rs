use std::sync::Arc;

use rand::seq::IndexedRandom;
use tracing::{debug, error, warn};
use vkmass_common::models::{AiProviderId, GeneratedProfile};

use crate::models::GenerationRequest;
use crate::prompts::{
    COMMENT_SYSTEM_INSTRUCTION, FALLBACK_COMMENTS, comment_prompt, parse_profile, profile_prompt,
    profile_schema,
};
use crate::provider::ProviderRegistry;
use crate::traits::ModelProvider;

/// Why a fallback comment was used instead of a generated one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FallbackReason {
    /// The provider has no API key; a configuration condition, not an error.
    MissingCredential,
    /// The provider is switched off in the settings.
    Disabled,
    /// Nothing is registered under the requested id.
    UnknownProvider(AiProviderId),
    /// The call went out and failed.
    RemoteFailure(String),
    /// The call succeeded with no text.
    EmptyResponse,
}

impl FallbackReason {
    /// Only real call failures surface as error entries in the event log.
    pub fn is_failure(&self) -> bool {
        matches!(self, FallbackReason::RemoteFailure(_))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommentSource {
    Generated(AiProviderId),
    Fallback(FallbackReason),
}

/// A comment together with how it was obtained.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommentOutcome {
    pub text: String,
    pub source: CommentSource,
}

impl CommentOutcome {
    pub fn is_generated(&self) -> bool {
        matches!(self.source, CommentSource::Generated(_))
    }
}

/// Input for [`AiClient::comment`].
#[derive(Debug, Clone)]
pub struct CommentRequest<'a> {
    pub topic: &'a str,
    pub keywords: &'a [String],
    pub template: &'a str,
    /// `None` uses the client's default provider.
    pub provider: Option<AiProviderId>,
    pub model: Option<&'a str>,
    pub enabled: bool,
}

impl<'a> CommentRequest<'a> {
    pub fn new(topic: &'a str, keywords: &'a [String], template: &'a str) -> Self {
        Self {
            topic,
            keywords,
            template,
            provider: None,
            model: None,
            enabled: true,
        }
    }

    pub fn via(mut self, provider: AiProviderId, model: Option<&'a str>, enabled: bool) -> Self {
        self.provider = Some(provider);
        self.model = model;
        self.enabled = enabled;
        self
    }
}

/// Text-generation adapter used by the cycle and by mass fill.
pub struct AiClient {
    /// Provider registry for different AI models
    registry: Arc<ProviderRegistry>,

    /// Default provider to use
    default_provider: AiProviderId,
}

impl AiClient {
    pub fn new(registry: Arc<ProviderRegistry>, default_provider: AiProviderId) -> Self {
        Self {
            registry,
            default_provider,
        }
    }

    /// Short comment for a post. Never fails: any problem yields one of
    /// [`FALLBACK_COMMENTS`].
    pub async fn generate_comment(&self, topic: &str, keywords: &[String], template: &str) -> String {
        self.comment(CommentRequest::new(topic, keywords, template)).await.text
    }

    /// Like [`generate_comment`](Self::generate_comment) but reports where the text came from.
    pub async fn comment(&self, request: CommentRequest<'_>) -> CommentOutcome {
        let provider_id = request.provider.unwrap_or(self.default_provider);

        if !request.enabled {
            return fallback(FallbackReason::Disabled);
        }
        let provider = match self.ready_provider(provider_id).await {
            Ok(provider) => provider,
            Err(reason) => return fallback(reason),
        };

        let generation = GenerationRequest::new(comment_prompt(request.topic, request.keywords, request.template))
            .with_system_instruction(COMMENT_SYSTEM_INSTRUCTION)
            .with_model(request.model)
            .with_temperature(1.0);

        match provider.generate(generation).await {
            Ok(text) if text.trim().is_empty() => fallback(FallbackReason::EmptyResponse),
            Ok(text) => {
                debug!("Generated comment via {}: {}", provider_id, text);
                CommentOutcome {
                    text: text.trim().to_string(),
                    source: CommentSource::Generated(provider_id),
                }
            }
            Err(e) => {
                error!("{} API error: {:#}", provider_id, e);
                fallback(FallbackReason::RemoteFailure(format!("{:#}", e)))
            }
        }
    }

    /// Structured persona for mass fill.
    ///
    /// Missing credentials or an unparseable payload give the empty profile;
    /// a failed call is returned as an error so the caller can report it.
    pub async fn generate_profile(
        &self,
        provider: Option<AiProviderId>,
        model: Option<&str>,
        theme: &str,
        name: &str,
    ) -> anyhow::Result<GeneratedProfile> {
        let provider_id = provider.unwrap_or(self.default_provider);
        let provider = match self.ready_provider(provider_id).await {
            Ok(provider) => provider,
            Err(FallbackReason::UnknownProvider(id)) => {
                return Err(anyhow::anyhow!("Provider not registered: {}", id));
            }
            Err(_) => {
                warn!("No API key for {}; using an empty profile for {}", provider_id, name);
                return Ok(GeneratedProfile::default());
            }
        };

        let generation = GenerationRequest::new(profile_prompt(theme, name))
            .with_model(model)
            .with_schema(profile_schema());

        let text = provider.generate(generation).await?;
        Ok(parse_profile(&text))
    }

    async fn ready_provider(&self, id: AiProviderId) -> Result<Arc<dyn ModelProvider>, FallbackReason> {
        let provider = self
            .registry
            .get(id)
            .await
            .ok_or(FallbackReason::UnknownProvider(id))?;
        if !provider.has_credential() {
            warn!("API key for {} is missing. Using fallback.", id);
            return Err(FallbackReason::MissingCredential);
        }
        Ok(provider)
    }
}

/// One of the fixed fallback comments, chosen at random.
pub fn fallback_comment() -> &'static str {
    FALLBACK_COMMENTS[..]
        .choose(&mut rand::rng())
        .copied()
        .unwrap_or(FALLBACK_COMMENTS[0])
}

fn fallback(reason: FallbackReason) -> CommentOutcome {
    CommentOutcome {
        text: fallback_comment().to_string(),
        source: CommentSource::Fallback(reason),
    }
}
