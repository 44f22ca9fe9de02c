//! OpenAI LLM Provider
//!
//! Implementation of `LlmProvider` for OpenAI-compatible chat-completions
//! endpoints, with native function calling and JSON-schema structured output.

use std::collections::HashMap;
use std::time::Duration;

use agent_core::{
    error::{AgentError, Result},
    message::{Message, Role},
    provider::{
        Completion, FinishReason, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo,
        ResponseSchema, TokenUsage,
    },
    tool::{ToolCall, ToolSchema},
};
use async_trait::async_trait;
use reqwest::StatusCode;
use serde::{Deserialize, Serialize};

/// Environment variable holding the provider credential
pub const API_KEY_VAR: &str = "OPENAI_API_KEY";

/// OpenAI provider configuration
#[derive(Clone, Debug)]
pub struct OpenAiConfig {
    /// API key sent as bearer token
    pub api_key: String,

    /// API base URL (no trailing slash)
    pub base_url: String,

    /// Per-request timeout; unset leaves requests unbounded
    pub timeout: Option<Duration>,
}

impl OpenAiConfig {
    pub fn new(api_key: impl Into<String>) -> Self {
        Self {
            api_key: api_key.into(),
            base_url: "https://api.openai.com/v1".into(),
            timeout: None,
        }
    }

    #[must_use]
    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into().trim_end_matches('/').to_string();
        self
    }
}

/// OpenAI LLM provider
pub struct OpenAiProvider {
    client: reqwest::Client,
    config: OpenAiConfig,
}

impl OpenAiProvider {
    /// Create from configuration
    pub fn from_config(config: OpenAiConfig) -> Result<Self> {
        let mut builder = reqwest::Client::builder();
        if let Some(timeout) = config.timeout {
            builder = builder.timeout(timeout);
        }
        let client = builder
            .build()
            .map_err(|e| AgentError::Config(e.to_string()))?;

        Ok(Self { client, config })
    }

    fn url(&self, path: &str) -> String {
        format!("{}/{}", self.config.base_url, path)
    }

    /// Build the chat-completions request body
    fn build_request(messages: &[Message], options: &GenerationOptions) -> Result<ChatRequest> {
        Ok(ChatRequest {
            model: options.model.clone(),
            messages: Self::convert_messages(messages)?,
            temperature: options.temperature,
            top_p: options.top_p,
            max_tokens: options.max_tokens,
            tools: options.tools.iter().map(WireTool::from_schema).collect(),
            response_format: options.response_schema.as_ref().map(ResponseFormat::from_schema),
        })
    }

    /// Convert agent messages to the wire format
    fn convert_messages(messages: &[Message]) -> Result<Vec<WireMessage>> {
        messages
            .iter()
            .map(|m| {
                let wire = match m.role {
                    Role::System => WireMessage::text("system", &m.content),
                    Role::User => WireMessage::text("user", &m.content),
                    Role::Assistant if m.tool_calls.is_empty() => {
                        WireMessage::text("assistant", &m.content)
                    }
                    Role::Assistant => WireMessage {
                        role: "assistant",
                        content: (!m.content.is_empty()).then(|| m.content.clone()),
                        tool_calls: m
                            .tool_calls
                            .iter()
                            .map(WireToolCall::from_call)
                            .collect::<Result<Vec<_>>>()?,
                        tool_call_id: None,
                    },
                    // Tool results without an ID come from the text protocol
                    Role::Tool => match m.tool_call_id() {
                        Some(id) => WireMessage {
                            role: "tool",
                            content: Some(m.content.clone()),
                            tool_calls: Vec::new(),
                            tool_call_id: Some(id.to_string()),
                        },
                        None => WireMessage::text("user", &m.content),
                    },
                };
                Ok(wire)
            })
            .collect()
    }

    /// Convert the wire response to an agent completion
    fn convert_completion(response: ChatResponse) -> Result<Completion> {
        let choice = response
            .choices
            .into_iter()
            .next()
            .ok_or_else(|| AgentError::Provider("response contained no choices".into()))?;

        if let Some(refusal) = choice.message.refusal {
            return Err(AgentError::Provider(format!("model refused: {refusal}")));
        }

        let tool_calls = choice
            .message
            .tool_calls
            .into_iter()
            .map(|call| {
                let arguments: HashMap<String, serde_json::Value> =
                    serde_json::from_str(&call.function.arguments).map_err(|e| {
                        AgentError::Provider(format!(
                            "malformed arguments for tool '{}': {e}",
                            call.function.name
                        ))
                    })?;
                Ok(ToolCall {
                    name: call.function.name,
                    arguments,
                    id: Some(call.id),
                })
            })
            .collect::<Result<Vec<_>>>()?;

        let finish_reason = choice.finish_reason.as_deref().map(|reason| match reason {
            "length" => FinishReason::Length,
            "tool_calls" | "function_call" => FinishReason::ToolUse,
            "content_filter" => FinishReason::ContentFilter,
            "stop" => FinishReason::Stop,
            _ => FinishReason::Error,
        });

        Ok(Completion {
            content: choice.message.content.unwrap_or_default(),
            tool_calls,
            model: response.model,
            usage: response.usage.map(|u| TokenUsage {
                prompt_tokens: u.prompt_tokens,
                completion_tokens: u.completion_tokens,
                total_tokens: u.total_tokens,
            }),
            finish_reason,
        })
    }

    /// Map an HTTP failure to the agent error taxonomy
    fn status_error(status: StatusCode, body: &str) -> AgentError {
        let detail = format!("HTTP {status}: {body}");
        match status {
            StatusCode::UNAUTHORIZED | StatusCode::FORBIDDEN => AgentError::Auth(detail),
            StatusCode::TOO_MANY_REQUESTS => AgentError::RateLimited(detail),
            s if s.is_server_error() => AgentError::ProviderUnavailable(detail),
            _ => AgentError::Provider(detail),
        }
    }

    fn transport_error(err: &reqwest::Error) -> AgentError {
        if err.is_connect() || err.is_timeout() {
            AgentError::ProviderUnavailable(err.to_string())
        } else {
            AgentError::Provider(err.to_string())
        }
    }
}

#[async_trait]
impl LlmProvider for OpenAiProvider {
    fn name(&self) -> &str {
        "OpenAI"
    }

    async fn info(&self) -> Result<ProviderInfo> {
        let models = self.list_models().await.unwrap_or_default();

        Ok(ProviderInfo {
            name: "OpenAI".into(),
            models,
            supports_tools: true,
            supports_structured_output: true,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        match self.list_models().await {
            Ok(_) => Ok(true),
            Err(e) => {
                tracing::warn!("OpenAI health check failed: {}", e);
                Ok(false)
            }
        }
    }

    async fn complete(
        &self,
        messages: &[Message],
        options: &GenerationOptions,
    ) -> Result<Completion> {
        let request = Self::build_request(messages, options)?;

        let response = self.client
            .post(self.url("chat/completions"))
            .bearer_auth(&self.config.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }

        let response: ChatResponse = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("response parse failed: {e}")))?;

        Self::convert_completion(response)
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        let response = self.client
            .get(self.url("models"))
            .bearer_auth(&self.config.api_key)
            .send()
            .await
            .map_err(|e| Self::transport_error(&e))?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            return Err(Self::status_error(status, &body));
        }

        let list: ModelList = response
            .json()
            .await
            .map_err(|e| AgentError::Provider(format!("model list parse failed: {e}")))?;

        Ok(list
            .data
            .into_iter()
            .map(|m| ModelInfo {
                name: m.id.clone(),
                id: m.id,
            })
            .collect())
    }
}

// ============================================================================
// Wire Types
// ============================================================================

#[derive(Debug, Serialize)]
struct ChatRequest {
    model: String,
    messages: Vec<WireMessage>,
    temperature: f32,
    top_p: f32,
    max_tokens: u32,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tools: Vec<WireTool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    response_format: Option<ResponseFormat>,
}

#[derive(Debug, Serialize)]
struct WireMessage {
    role: &'static str,
    content: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    tool_calls: Vec<WireToolCall>,
    #[serde(skip_serializing_if = "Option::is_none")]
    tool_call_id: Option<String>,
}

impl WireMessage {
    fn text(role: &'static str, content: &str) -> Self {
        Self {
            role,
            content: Some(content.to_string()),
            tool_calls: Vec::new(),
            tool_call_id: None,
        }
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireToolCall {
    id: String,
    #[serde(rename = "type", default = "function_type")]
    kind: String,
    function: WireFunctionCall,
}

fn function_type() -> String {
    "function".into()
}

impl WireToolCall {
    fn from_call(call: &ToolCall) -> Result<Self> {
        Ok(Self {
            id: call.id.clone().unwrap_or_default(),
            kind: function_type(),
            function: WireFunctionCall {
                name: call.name.clone(),
                arguments: serde_json::to_string(&call.arguments)?,
            },
        })
    }
}

#[derive(Debug, Serialize, Deserialize)]
struct WireFunctionCall {
    name: String,
    arguments: String,
}

#[derive(Debug, Serialize)]
struct WireTool {
    #[serde(rename = "type")]
    kind: &'static str,
    function: WireFunction,
}

impl WireTool {
    fn from_schema(schema: &ToolSchema) -> Self {
        Self {
            kind: "function",
            function: WireFunction {
                name: schema.name.clone(),
                description: schema.description.clone(),
                parameters: schema.parameters_json_schema(),
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct WireFunction {
    name: String,
    description: String,
    parameters: serde_json::Value,
}

#[derive(Debug, Serialize)]
struct ResponseFormat {
    #[serde(rename = "type")]
    kind: &'static str,
    json_schema: JsonSchemaFormat,
}

impl ResponseFormat {
    fn from_schema(schema: &ResponseSchema) -> Self {
        Self {
            kind: "json_schema",
            json_schema: JsonSchemaFormat {
                name: schema.name.clone(),
                description: schema.description.clone(),
                schema: schema.schema.clone(),
                strict: true,
            },
        }
    }
}

#[derive(Debug, Serialize)]
struct JsonSchemaFormat {
    name: String,
    description: String,
    schema: serde_json::Value,
    strict: bool,
}

#[derive(Debug, Deserialize)]
struct ChatResponse {
    #[serde(default)]
    model: String,
    choices: Vec<Choice>,
    #[serde(default)]
    usage: Option<WireUsage>,
}

#[derive(Debug, Deserialize)]
struct Choice {
    message: ResponseMessage,
    #[serde(default)]
    finish_reason: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ResponseMessage {
    #[serde(default)]
    content: Option<String>,
    #[serde(default)]
    tool_calls: Vec<WireToolCall>,
    #[serde(default)]
    refusal: Option<String>,
}

#[derive(Debug, Deserialize)]
struct WireUsage {
    prompt_tokens: u32,
    completion_tokens: u32,
    total_tokens: u32,
}

#[derive(Debug, Deserialize)]
struct ModelList {
    data: Vec<WireModel>,
}

#[derive(Debug, Deserialize)]
struct WireModel {
    id: String,
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::tool::ParameterSchema;

    #[test]
    fn test_config_defaults() {
        let config = OpenAiConfig::new("sk-test").with_base_url("http://localhost:8080/v1/");
        assert_eq!(config.base_url, "http://localhost:8080/v1");
        assert!(config.timeout.is_none());
    }

    #[test]
    fn test_request_carries_tools_and_schema() {
        let options = GenerationOptions {
            tools: vec![ToolSchema {
                name: "house_price".into(),
                description: "Look up a price".into(),
                parameters: vec![ParameterSchema::required("address", "string", "Exact address")],
            }],
            response_schema: Some(ResponseSchema {
                name: "TaskOutput".into(),
                description: "Assessment".into(),
                schema: serde_json::json!({"type": "object"}),
            }),
            ..Default::default()
        };

        let request = OpenAiProvider::build_request(&[Message::user("hi")], &options).unwrap();
        let body = serde_json::to_value(&request).unwrap();

        assert_eq!(body["model"], "gpt-4o");
        assert_eq!(body["tools"][0]["type"], "function");
        assert_eq!(body["tools"][0]["function"]["name"], "house_price");
        assert_eq!(body["tools"][0]["function"]["parameters"]["required"][0], "address");
        assert_eq!(body["response_format"]["type"], "json_schema");
        assert_eq!(body["response_format"]["json_schema"]["strict"], true);
    }

    #[test]
    fn test_message_conversion_round_trips_tool_turns() {
        let call = ToolCall::new("house_price")
            .with_arg("address", serde_json::json!("123 Main St"))
            .with_id("call_1");
        let messages = vec![
            Message::system("You are helpful."),
            Message::user("Address: 123 Main St. Task: paint"),
            Message::assistant_with_tools("", vec![call]),
            Message::tool("350000", Some("call_1".into())),
            Message::tool("text protocol result", None),
        ];

        let converted = OpenAiProvider::convert_messages(&messages).unwrap();
        let body = serde_json::to_value(&converted).unwrap();

        assert_eq!(body[2]["role"], "assistant");
        assert!(body[2]["content"].is_null());
        assert_eq!(body[2]["tool_calls"][0]["id"], "call_1");
        assert_eq!(
            body[2]["tool_calls"][0]["function"]["arguments"],
            r#"{"address":"123 Main St"}"#
        );
        assert_eq!(body[3]["role"], "tool");
        assert_eq!(body[3]["tool_call_id"], "call_1");
        assert_eq!(body[4]["role"], "user");
    }

    #[test]
    fn test_completion_with_tool_calls() {
        let response: ChatResponse = serde_json::from_value(serde_json::json!({
            "model": "gpt-4o-2024-08-06",
            "choices": [{
                "message": {
                    "content": null,
                    "tool_calls": [{
                        "id": "call_9",
                        "type": "function",
                        "function": {"name": "house_price", "arguments": "{\"address\": \"456 Oak Ave\"}"}
                    }]
                },
                "finish_reason": "tool_calls"
            }],
            "usage": {"prompt_tokens": 10, "completion_tokens": 5, "total_tokens": 15}
        }))
        .unwrap();

        let completion = OpenAiProvider::convert_completion(response).unwrap();
        assert_eq!(completion.finish_reason, Some(FinishReason::ToolUse));
        assert_eq!(completion.tool_calls.len(), 1);
        assert_eq!(completion.tool_calls[0].str_arg("address"), Some("456 Oak Ave"));
        assert_eq!(completion.tool_calls[0].id.as_deref(), Some("call_9"));
        assert_eq!(completion.usage.unwrap().total_tokens, 15);
    }

    #[test]
    fn test_malformed_tool_arguments_and_refusal() {
        let bad_args: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"tool_calls": [{
                "id": "c", "type": "function",
                "function": {"name": "house_price", "arguments": "not json"}
            }]}}]
        }))
        .unwrap();
        assert!(matches!(OpenAiProvider::convert_completion(bad_args), Err(AgentError::Provider(_))));

        let refusal: ChatResponse = serde_json::from_value(serde_json::json!({
            "choices": [{"message": {"content": null, "refusal": "cannot help"}}]
        }))
        .unwrap();
        assert!(matches!(OpenAiProvider::convert_completion(refusal), Err(AgentError::Provider(msg)) if msg.contains("cannot help")));
    }

    #[test]
    fn test_status_mapping() {
        assert!(matches!(OpenAiProvider::status_error(StatusCode::UNAUTHORIZED, ""), AgentError::Auth(_)));
        assert!(matches!(OpenAiProvider::status_error(StatusCode::TOO_MANY_REQUESTS, ""), AgentError::RateLimited(_)));
        assert!(matches!(OpenAiProvider::status_error(StatusCode::BAD_GATEWAY, ""), AgentError::ProviderUnavailable(_)));
        assert!(matches!(OpenAiProvider::status_error(StatusCode::BAD_REQUEST, "bad"), AgentError::Provider(msg) if msg.contains("bad")));
    }
}
