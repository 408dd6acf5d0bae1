//! Text generator seam.
//!
//! The pipeline only needs "prompt segments in, text out". `GeminiGenerator`
//! is the production implementation; tests script their own.

pub mod gemini;

use std::time::Duration;

use async_trait::async_trait;

pub use gemini::GeminiGenerator;

/// Marker every upstream failure text starts with.
pub const ERROR_SENTINEL: &str = "Error:";

/// One segment of a multimodal prompt.
#[derive(Debug, Clone, PartialEq)]
pub enum PromptPart {
    Text(String),
    Image { mime_type: String, data: Vec<u8> },
}

impl PromptPart {
    pub fn text(s: impl Into<String>) -> Self {
        Self::Text(s.into())
    }

    fn is_blank(&self) -> bool {
        match self {
            Self::Text(s) => s.trim().is_empty(),
            Self::Image { data, .. } => data.is_empty(),
        }
    }
}

/// Upstream generation failures. Every message carries the error sentinel.
#[derive(Debug, thiserror::Error)]
pub enum GeneratorError {
    #[error("Error: Prompt cannot be empty.")]
    EmptyPrompt,

    #[error("Error: Text generator is not configured.")]
    NotConfigured,

    #[error("Error: Failed to generate content due to: {0}")]
    Request(String),

    #[error("Error: Generator API returned {status}: {body}")]
    Api { status: u16, body: String },

    #[error("Error: Content generation blocked due to {0}.")]
    Blocked(String),

    #[error("Error: Failed to extract valid text content from generator response.")]
    EmptyResponse,

    #[error("Error: Generator did not respond within {0} seconds.")]
    Timeout(u64),
}

/// A generative text model.
#[async_trait]
pub trait TextGenerator: Send + Sync {
    /// Generate text for an ordered sequence of prompt segments.
    async fn generate(&self, parts: &[PromptPart]) -> Result<String, GeneratorError>;
}

/// Invoke `generator` with an upper bound on latency.
///
/// Empty prompts are rejected before any call is made.
pub async fn generate_with_timeout(
    generator: &dyn TextGenerator,
    parts: &[PromptPart],
    timeout: Duration,
) -> Result<String, GeneratorError> {
    if parts.is_empty() || parts.iter().all(PromptPart::is_blank) {
        return Err(GeneratorError::EmptyPrompt);
    }

    match tokio::time::timeout(timeout, generator.generate(parts)).await {
        Ok(result) => result,
        Err(_) => Err(GeneratorError::Timeout(timeout.as_secs())),
    }
}
