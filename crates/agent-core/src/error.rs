//! Error Types

use thiserror::Error;

/// Result type alias for agent operations
pub type Result<T> = std::result::Result<T, AgentError>;

/// Failure of one agent run
///
/// Tool failures surface here only when the run's policy aborts on them;
/// otherwise they are reported back to the model as tool results.
#[derive(Error, Debug)]
pub enum AgentError {
    #[error("Provider error: {0}")]
    Provider(String),

    /// Backend unreachable or not responding
    #[error("Provider unavailable: {0}")]
    ProviderUnavailable(String),

    #[error("Rate limited: {0}")]
    RateLimited(String),

    #[error("Authentication failed: {0}")]
    Auth(String),

    #[error("Tool not found: {0}")]
    ToolNotFound(String),

    /// Arguments did not satisfy the tool's parameter schema
    #[error("Tool validation error: {0}")]
    ToolValidation(String),

    #[error("Tool execution error: {0}")]
    ToolExecution(String),

    /// Tool failed with a typed domain error; callers recover it by downcasting
    #[error("{0}")]
    ToolFailed(#[source] Box<dyn std::error::Error + Send + Sync>),

    /// Final answer did not parse into the declared output type
    #[error("Schema violation: {0}")]
    SchemaViolation(String),

    #[error("Maximum iterations ({0}) reached")]
    MaxIterations(usize),

    #[error("Configuration error: {0}")]
    Config(String),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

impl AgentError {
    /// Wraps a tool's own error so it survives the run unchanged
    pub fn tool_failure(err: impl std::error::Error + Send + Sync + 'static) -> Self {
        Self::ToolFailed(Box::new(err))
    }

    /// Transient backend failures a caller may retry as-is
    ///
    /// The reasoning loop never retries on its own.
    pub const fn is_retryable(&self) -> bool {
        matches!(self, Self::ProviderUnavailable(_) | Self::RateLimited(_))
    }

    /// Message safe to show an end user
    pub fn user_message(&self) -> String {
        match self {
            Self::Provider(msg) => format!("The AI service encountered an error: {msg}"),
            Self::ProviderUnavailable(_) => {
                "The AI service is currently unavailable. Please try again.".into()
            }
            Self::RateLimited(_) => "Too many requests to the AI service. Please wait a moment.".into(),
            Self::Auth(_) => "The AI service rejected the configured credential.".into(),
            Self::ToolNotFound(name) => format!("The model asked for an unknown tool '{name}'."),
            Self::ToolValidation(msg) => format!("Invalid tool input: {msg}"),
            Self::ToolExecution(msg) => format!("Tool error: {msg}"),
            Self::ToolFailed(err) => err.to_string(),
            Self::SchemaViolation(msg) => {
                format!("The AI returned an answer in an unexpected format: {msg}")
            }
            Self::MaxIterations(n) => {
                format!("The assessment did not finish within {n} model turns. Try a simpler task.")
            }
            Self::Config(msg) => format!("The agent is misconfigured: {msg}"),
            Self::Json(_) => "An unexpected error occurred.".into(),
        }
    }
}
