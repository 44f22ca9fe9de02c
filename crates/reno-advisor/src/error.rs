//! Error Types for Reno Advisor

use agent_core::AgentError;
use thiserror::Error;

pub type Result<T> = std::result::Result<T, AdvisorError>;

#[derive(Error, Debug)]
pub enum AdvisorError {
    /// Address is not an exact key of the house store
    #[error("House not found: {0}")]
    NotFound(String),

    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// The agent run failed after input was accepted
    #[error(transparent)]
    Agent(AgentError),
}

/// Domain errors raised inside a tool come back out as themselves
impl From<AgentError> for AdvisorError {
    fn from(err: AgentError) -> Self {
        match err {
            AgentError::ToolFailed(source) => match source.downcast::<Self>() {
                Ok(advisor) => *advisor,
                Err(source) => Self::Agent(AgentError::ToolFailed(source)),
            },
            other => Self::Agent(other),
        }
    }
}

impl AdvisorError {
    /// Text safe to show in the results panel
    pub fn user_message(&self) -> String {
        match self {
            Self::Agent(e) => e.user_message(),
            other => other.to_string(),
        }
    }
}

/// Input rejected by the shell before any external call
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    #[error("Please describe the task before running the assessment.")]
    EmptyTask,

    #[error("No model provider credential is configured. Set it in the environment and restart.")]
    MissingCredential,

    #[error("Address is required.")]
    EmptyAddress,

    #[error("Price must not be negative.")]
    NegativePrice,

    #[error("{field} must be a non-negative number, got '{value}'.")]
    InvalidNumber { field: &'static str, value: String },
}
