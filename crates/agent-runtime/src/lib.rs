//! # agent-runtime
//!
//! Runtime providers for the reno-agent system.
//!
//! ## Providers
//!
//! - **OpenAI**: hosted chat-completions with native function calling and
//!   JSON-schema structured output (any OpenAI-compatible endpoint)
//! - **Ollama** (feature `ollama`, default): local inference via the text tool protocol
//! - **Scripted**: deterministic replay for tests and offline demos
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_runtime::{OpenAiProvider, openai::OpenAiConfig};
//!
//! let provider = OpenAiProvider::from_config(OpenAiConfig::new(api_key))?;
//! let agent = AgentBuilder::new()
//!     .provider(Arc::new(provider))
//!     .build()?;
//! ```

pub mod openai;
pub mod scripted;

#[cfg(feature = "ollama")]
pub mod ollama;

#[cfg(feature = "ollama")]
pub use ollama::OllamaProvider;
pub use openai::OpenAiProvider;
pub use scripted::{ScriptStep, ScriptedProvider};

// Re-export core types for convenience
pub use agent_core::{
    Agent, AgentError, LlmProvider, Message, Result, Role, Tool, ToolRegistry,
};
