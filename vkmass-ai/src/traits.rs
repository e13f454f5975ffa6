use async_trait::async_trait;
use vkmass_common::models::AiProviderId;

use crate::models::GenerationRequest;

/// One text-generation backend.
///
/// Implementations make exactly one outbound request per [`generate`](ModelProvider::generate)
/// call and never retry.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ModelProvider: Send + Sync {
    fn id(&self) -> AiProviderId;

    /// Whether a credential is available right now. Read on every call.
    fn has_credential(&self) -> bool;

    /// Returns the raw text payload of the first candidate.
    async fn generate(&self, request: GenerationRequest) -> anyhow::Result<String>;
}
