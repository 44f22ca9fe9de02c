//! Ollama LLM Provider
//!
//! Local inference through `ollama-rs`. Ollama is driven through the text
//! tool protocol: tool descriptions and the output schema live in the system
//! prompt, and tool calls come back as fenced ```` ```tool ```` blocks that the
//! reasoning loop parses. Tool results are replayed to the model as user turns.

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo,
        TokenUsage,
    },
};
use async_trait::async_trait;
use ollama_rs::{
    Ollama,
    generation::chat::{ChatMessage, ChatMessageResponse, MessageRole, request::ChatMessageRequest},
    models::ModelOptions,
};

/// Ollama LLM provider
pub struct OllamaProvider {
    client: Ollama,
    endpoint: String,
}

impl Default for OllamaProvider {
    fn default() -> Self {
        Self::new("http://localhost", 11434)
    }
}

impl OllamaProvider {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        let host = host.into();
        Self {
            client: Ollama::new(&host, port),
            endpoint: format!("{host}:{port}"),
        }
    }

    /// `host:port` the client talks to
    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    const fn role_for(role: Role) -> MessageRole {
        match role {
            Role::System => MessageRole::System,
            Role::Assistant => MessageRole::Assistant,
            Role::User | Role::Tool => MessageRole::User,
        }
    }

    fn chat_messages(messages: &[Message]) -> Vec<ChatMessage> {
        messages
            .iter()
            .map(|m| ChatMessage::new(Self::role_for(m.role), m.content.clone()))
            .collect()
    }

    fn chat_options(opts: &GenerationOptions) -> ModelOptions {
        ModelOptions::default()
            .temperature(opts.temperature)
            .top_p(opts.top_p)
            .num_predict(i32::try_from(opts.max_tokens).unwrap_or(i32::MAX))
    }

    fn to_completion(response: ChatMessageResponse, model: &str) -> Completion {
        let usage = response.final_data.as_ref().map(|d| {
            let prompt_tokens = u32::try_from(d.prompt_eval_count).unwrap_or(u32::MAX);
            let completion_tokens = u32::try_from(d.eval_count).unwrap_or(u32::MAX);
            TokenUsage {
                prompt_tokens,
                completion_tokens,
                total_tokens: prompt_tokens.saturating_add(completion_tokens),
            }
        });

        Completion {
            usage,
            finish_reason: Some(FinishReason::Stop),
            ..Completion::text(response.message.content, model)
        }
    }
}

#[async_trait]
impl LlmProvider for OllamaProvider {
    fn name(&self) -> &str {
        "Ollama"
    }

    async fn info(&self) -> Result<ProviderInfo> {
        Ok(ProviderInfo {
            name: "Ollama".into(),
            models: self.list_models().await.unwrap_or_default(),
            supports_tools: false,
            supports_structured_output: false,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        if let Err(e) = self.client.list_local_models().await {
            tracing::warn!(endpoint = %self.endpoint, error = %e, "Ollama health check failed");
            return Ok(false);
        }
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = ChatMessageRequest::new(options.model.clone(), Self::chat_messages(messages))
            .options(Self::chat_options(options));

        let response = self.client.send_chat_messages(request).await.map_err(|e| {
            tracing::debug!(endpoint = %self.endpoint, error = %e, "Ollama chat failed");
            AgentError::Provider(e.to_string())
        })?;

        Ok(Self::to_completion(response, &options.model))
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let models = self
            .client
            .list_local_models()
            .await
            .map_err(|e| AgentError::ProviderUnavailable(e.to_string()))?;

        Ok(models
            .into_iter()
            .map(|m| ModelInfo {
                id: m.name.clone(),
                name: m.name,
            })
            .collect())
    }
}
