use async_trait::async_trait;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("request to LLM endpoint failed: {reason}")]
    Transport { reason: String },
    #[error("LLM endpoint timed out")]
    Timeout,
    #[error("LLM endpoint returned status {status}")]
    Status { status: u16 },
    #[error("LLM endpoint returned an unreadable body: {reason}")]
    InvalidBody { reason: String },
    #[error("LLM API error - {message}")]
    Api { message: String },
    #[error("unexpected response from LLM endpoint")]
    UnexpectedResponse,
}

impl LlmError {
    /// True when the endpoint never produced an answer worth interpreting.
    pub fn is_unavailable(&self) -> bool {
        matches!(
            self,
            Self::Transport { .. } | Self::Timeout | Self::Status { .. } | Self::InvalidBody { .. }
        )
    }
}

/// A text-completion backend. Implementations send one prompt and return the
/// raw completion text, which callers expect to be a JSON document.
#[async_trait]
pub trait LlmClient: Send + Sync {
    fn model(&self) -> &str;
    async fn generate(&self, prompt: &str) -> Result<String, LlmError>;
}
