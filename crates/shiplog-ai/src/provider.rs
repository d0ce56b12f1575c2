//! Text-generation capability

use async_trait::async_trait;

use crate::error::ProviderError;
use crate::payload::{GenerationOutput, GenerationRequest};

/// A backend able to answer generation requests
///
/// Implementations are interchangeable; the enhancer only relies on this
/// contract.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Backend name, used for attribution
    fn name(&self) -> &str;

    /// Model name, used for attribution
    fn model(&self) -> &str;

    /// Answer one request
    async fn invoke(&self, request: &GenerationRequest) -> Result<GenerationOutput, ProviderError>;

    /// Reachability check run before the main calls
    async fn check_connectivity(&self) -> bool;
}
