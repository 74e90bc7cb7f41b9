use thiserror::Error;

#[derive(Debug, Error)]
pub enum LlmError {
    /// Client could not be built from the supplied settings.
    #[error("Configuration error: {0}")]
    Configuration(String),

    #[error("Transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// The endpoint answered with a status other than 200.
    #[error("HTTP {status}: {body}")]
    Request { status: u16, body: String },

    /// The endpoint answered 200 but the payload could not be used.
    #[error("Protocol error: {0}")]
    Protocol(String),

    #[error("Completion task failed: {0}")]
    Task(String),
}

impl From<serde_json::Error> for LlmError {
    fn from(err: serde_json::Error) -> Self {
        LlmError::Protocol(format!("invalid JSON payload: {}", err))
    }
}

impl From<tokio::task::JoinError> for LlmError {
    fn from(err: tokio::task::JoinError) -> Self {
        LlmError::Task(err.to_string())
    }
}
