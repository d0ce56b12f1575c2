//! Shiplog AI - optional narrative enhancement
//!
//! A [`TextGenerator`] backend (Ollama, Anthropic or xAI) is asked for a
//! short summary of an assembled changelog and, optionally, a second opinion
//! on its breaking-change list. Every call is bounded and retried; a failing
//! backend leaves the deterministic document untouched.

pub mod enhancer;
pub mod error;
pub mod factory;
pub mod payload;
pub mod provider;
pub mod providers;
pub mod retry;

pub use enhancer::{EnhancementReport, Enhancer, StepOutcome};
pub use error::ProviderError;
pub use factory::build_provider;
pub use payload::{BreakingReview, GenerationOutput, GenerationPayload, GenerationRequest};
pub use provider::TextGenerator;
pub use retry::RetryPolicy;
