pub mod client;
pub mod models;
pub mod prompts;
pub mod provider;
pub mod traits;

// Re-export public APIs
pub use client::{AiClient, CommentOutcome, CommentRequest, CommentSource, FallbackReason};
pub use models::{Credential, GenerationRequest, ProviderConfig};
pub use provider::{GeminiProvider, GrokProvider, OpenAIProvider, ProviderRegistry};
pub use traits::ModelProvider;
