//! Model Backends
//!
//! [`LlmProvider`] is the seam between the reasoning loop and a concrete
//! model API. A backend receives the transcript plus [`GenerationOptions`]
//! (sampling, tool schemas, optional response schema) and returns one
//! [`Completion`]: text, native tool calls, or both.
//!
//! ## Usage
//!
//! ```rust,ignore
//! use agent_core::provider::{GenerationOptions, LlmProvider};
//!
//! let provider = OpenAiProvider::from_config(config)?;
//! let completion = provider.complete(&messages, &GenerationOptions::default()).await?;
//! ```

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::error::Result;
use crate::message::Message;
use crate::tool::{ToolCall, ToolSchema};

/// Configuration for LLM generation
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct GenerationOptions {
    /// Model identifier (e.g., "gpt-4o", "llama3.2")
    pub model: String,

    #[serde(default = "GenerationOptions::temperature")]
    pub temperature: f32,

    /// Upper bound on generated tokens per completion
    #[serde(default = "GenerationOptions::max_tokens")]
    pub max_tokens: u32,

    #[serde(default = "GenerationOptions::top_p")]
    pub top_p: f32,

    /// Tools the model may call (native function calling)
    #[serde(default)]
    pub tools: Vec<ToolSchema>,

    /// Structured output the final answer must follow
    #[serde(default)]
    pub response_schema: Option<ResponseSchema>,
}

impl GenerationOptions {
    const fn temperature() -> f32 {
        0.7
    }

    const fn max_tokens() -> u32 {
        2048
    }

    const fn top_p() -> f32 {
        0.9
    }
}

impl Default for GenerationOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            temperature: Self::temperature(),
            max_tokens: Self::max_tokens(),
            top_p: Self::top_p(),
            tools: Vec::new(),
            response_schema: None,
        }
    }
}

/// JSON schema a provider should constrain its final answer to
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ResponseSchema {
    /// Schema name (e.g., "TaskOutput")
    pub name: String,

    /// What the structured answer represents
    pub description: String,

    /// JSON Schema object
    pub schema: serde_json::Value,
}

/// Response from an LLM completion
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Completion {
    /// The generated text
    pub content: String,

    /// Tool calls requested natively by the provider
    #[serde(default)]
    pub tool_calls: Vec<ToolCall>,

    /// Model that generated this response
    pub model: String,

    /// Token usage statistics (if available)
    pub usage: Option<TokenUsage>,

    /// Finish reason
    pub finish_reason: Option<FinishReason>,
}

impl Completion {
    /// Plain text completion that finished normally
    pub fn text(content: impl Into<String>, model: impl Into<String>) -> Self {
        Self {
            content: content.into(),
            tool_calls: Vec::new(),
            model: model.into(),
            usage: None,
            finish_reason: Some(FinishReason::Stop),
        }
    }

    /// Completion that only requests tool calls
    pub fn tool_use(tool_calls: Vec<ToolCall>, model: impl Into<String>) -> Self {
        Self {
            content: String::new(),
            tool_calls,
            model: model.into(),
            usage: None,
            finish_reason: Some(FinishReason::ToolUse),
        }
    }
}

/// Token usage statistics
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct TokenUsage {
    pub prompt_tokens: u32,
    pub completion_tokens: u32,
    pub total_tokens: u32,
}

/// Reason for completion finishing
#[derive(Clone, Debug, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "snake_case")]
pub enum FinishReason {
    Stop,
    Length,
    ToolUse,
    ContentFilter,
    Error,
}

/// Provider metadata
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ProviderInfo {
    /// Provider name (e.g., "OpenAI", "Ollama")
    pub name: String,

    /// Available models
    pub models: Vec<ModelInfo>,

    /// Whether tool/function calling is supported natively
    pub supports_tools: bool,

    /// Whether JSON-schema constrained output is supported natively
    pub supports_structured_output: bool,
}

/// Information about a model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ModelInfo {
    pub id: String,
    pub name: String,
}

/// A chat-completion backend
#[async_trait]
pub trait LlmProvider: Send + Sync {
    /// Short provider name for logs and health output
    fn name(&self) -> &str;

    /// Capabilities and known models
    async fn info(&self) -> Result<ProviderInfo>;

    /// `Ok(false)` when the backend is unreachable or rejects the credential
    async fn health_check(&self) -> Result<bool>;

    /// One model turn over the full transcript
    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion>;

    /// List available models
    async fn list_models(&self) -> Result<Vec<ModelInfo>>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generation_options_defaults() {
        let opts = GenerationOptions::default();
        assert!((opts.temperature - 0.7).abs() < f32::EPSILON);
        assert_eq!(opts.max_tokens, 2048);
        assert_eq!(opts.model, "gpt-4o");
        assert!(opts.tools.is_empty());
        assert!(opts.response_schema.is_none());
    }

    #[test]
    fn test_options_deserialize_with_defaults() {
        let opts: GenerationOptions = serde_json::from_str(r#"{"model": "llama3.2"}"#).unwrap();
        assert_eq!(opts.model, "llama3.2");
        assert_eq!(opts.max_tokens, 2048);
    }

    #[test]
    fn test_tool_use_completion() {
        let completion = Completion::tool_use(Vec::new(), "gpt-4o");
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert!(completion.content.is_empty());
    }
}
