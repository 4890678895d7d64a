use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    #[error("completion API key is empty")]
    MissingCredential,

    #[error("completion request failed: {0}")]
    Transport(#[from] reqwest::Error),

    #[error("completion service returned {status}: {message}")]
    Api { status: u16, message: String },
}

impl LlmError {
    /// Transient failures worth another attempt: timeouts, connection
    /// failures, rate limiting and server-side errors.
    pub fn is_retryable(&self) -> bool {
        match self {
            LlmError::Transport(e) => e.is_timeout() || e.is_connect(),
            LlmError::Api { status, .. } => *status == 429 || *status >= 500,
            LlmError::MissingCredential => false,
        }
    }
}
