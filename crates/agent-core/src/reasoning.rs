//! Reasoning Loop
//!
//! Implements the ReAct (Reason + Act) pattern for agent behavior.
//! The agent observes, thinks, acts (via tools), and finally answers with a
//! structured output `O`. Tools receive the dependency bundle `D` passed to
//! [`Agent::run`].

use std::marker::PhantomData;
use std::sync::Arc;

use crate::error::{AgentError, Result};
use crate::message::{Conversation, Message};
use crate::output::{OutputSchema, parse_output};
use crate::provider::{Completion, GenerationOptions, LlmProvider};
use crate::tool::{Tool, ToolCall, ToolRegistry, ToolResult};

/// What the loop does when a tool call fails
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ToolErrorPolicy {
    /// Hand the error text back to the model and let it recover
    #[default]
    ReportToModel,
    /// Fail the whole run with the tool's error
    Abort,
}

/// Agent configuration
#[derive(Clone, Debug)]
pub struct AgentConfig {
    /// System prompt template
    pub system_prompt: String,

    /// Maximum reasoning iterations before giving up
    pub max_iterations: usize,

    /// Generation options
    pub generation: GenerationOptions,

    /// Whether to append tool descriptions to system prompt
    /// (needed by providers without native function calling)
    pub inject_tool_descriptions: bool,

    /// Handling of failed tool calls
    pub tool_error_policy: ToolErrorPolicy,
}

impl Default for AgentConfig {
    fn default() -> Self {
        Self {
            system_prompt: DEFAULT_SYSTEM_PROMPT.into(),
            max_iterations: 10,
            generation: GenerationOptions::default(),
            inject_tool_descriptions: true,
            tool_error_policy: ToolErrorPolicy::default(),
        }
    }
}

const DEFAULT_SYSTEM_PROMPT: &str = r"You are a helpful AI assistant.

Use the available tools when they help you answer.
After receiving tool results, synthesize them into your answer.
Be concise and accurate.";

/// The main Agent struct
pub struct Agent<D, O> {
    provider: Arc<dyn LlmProvider>,
    tools: Arc<ToolRegistry<D>>,
    config: AgentConfig,
    _output: PhantomData<fn() -> O>,
}

impl<D, O> Agent<D, O>
where
    D: Send + Sync + 'static,
    O: OutputSchema,
{
    /// Create a new agent
    pub fn new(
        provider: Arc<dyn LlmProvider>,
        tools: Arc<ToolRegistry<D>>,
        config: AgentConfig,
    ) -> Self {
        Self {
            provider,
            tools,
            config,
            _output: PhantomData,
        }
    }

    /// Build the full system prompt including tool and output descriptions
    fn build_system_prompt(&self) -> String {
        let mut prompt = self.config.system_prompt.clone();

        if self.config.inject_tool_descriptions && !self.tools.is_empty() {
            prompt.push_str("\n\n");
            prompt.push_str(&self.tools.prompt_section());
        }

        prompt.push_str("\n\n");
        prompt.push_str(&O::prompt_section());
        prompt
    }

    /// Options sent with every completion request of a run
    fn generation_options(&self) -> GenerationOptions {
        let mut options = self.config.generation.clone();
        options.tools = self.tools.schemas();
        options.response_schema = Some(O::response_schema());
        options
    }

    /// Run the agent on a single user prompt
    pub async fn run(&self, deps: &D, user_prompt: &str) -> Result<O> {
        let mut conversation = Conversation::with_system_prompt(self.build_system_prompt());
        conversation.push(Message::user(user_prompt));
        self.run_conversation(deps, &mut conversation).await
    }

    /// Run the agent over an existing conversation, appending every turn to it
    pub async fn run_conversation(&self, deps: &D, conversation: &mut Conversation) -> Result<O> {
        conversation.ensure_system_prompt(|| self.build_system_prompt());

        let options = self.generation_options();

        for iteration in 1..=self.config.max_iterations {
            let completion = self.provider
                .complete(conversation.messages(), &options)
                .await?;

            let native = !completion.tool_calls.is_empty();
            let tool_calls = self.collect_tool_calls(&completion);

            if tool_calls.is_empty() {
                conversation.push(Message::assistant(&completion.content));
                let output = parse_output::<O>(&completion.content)?;
                tracing::info!(
                    iterations = iteration,
                    tool_results = conversation.tool_result_count(),
                    output = O::name(),
                    "Agent run finished"
                );
                return Ok(output);
            }

            // Text-protocol calls stay in the assistant text; their results carry no call ID
            if native {
                conversation.push(Message::assistant_with_tools(
                    completion.content.clone(),
                    tool_calls.clone(),
                ));
            } else {
                conversation.push(Message::assistant(&completion.content));
            }

            for call in &tool_calls {
                tracing::debug!(tool = %call.name, iteration, "Executing tool");

                let result = self.execute_tool(deps, call).await?;
                conversation.push(Message::tool_result(call, Self::format_tool_result(&result)));
            }
        }

        Err(AgentError::MaxIterations(self.config.max_iterations))
    }

    /// Native tool calls (given an ID when the provider sent none), or one
    /// written out in the text protocol
    fn collect_tool_calls(&self, completion: &Completion) -> Vec<ToolCall> {
        if completion.tool_calls.is_empty() {
            return self.parse_tool_call(&completion.content).into_iter().collect();
        }

        completion
            .tool_calls
            .iter()
            .cloned()
            .map(|mut call| {
                if call.id.is_none() {
                    call.id = Some(uuid::Uuid::new_v4().to_string());
                }
                call
            })
            .collect()
    }

    /// Parse a tool call from LLM response text
    fn parse_tool_call(&self, content: &str) -> Option<ToolCall> {
        if self.tools.is_empty() {
            return None;
        }

        // Look for ```tool ... ``` blocks
        let tool_start = "```tool";
        let tool_end = "```";

        if let Some(start_idx) = content.find(tool_start) {
            let after_marker = &content[start_idx + tool_start.len()..];
            if let Some(end_idx) = after_marker.find(tool_end) {
                let json_str = after_marker[..end_idx].trim();
                if let Ok(call) = serde_json::from_str::<ToolCall>(json_str) {
                    return Some(call);
                }
            }
        }

        Self::parse_inline_tool_call(content)
    }

    /// Try to parse inline JSON tool call
    fn parse_inline_tool_call(content: &str) -> Option<ToolCall> {
        if !content.contains(r#""tool""#) {
            return None;
        }

        let start = content.find('{')?;
        let end = content.rfind('}')?;

        if end <= start {
            return None;
        }

        serde_json::from_str::<ToolCall>(&content[start..=end]).ok()
    }

    /// Execute a tool call, applying the configured error policy
    async fn execute_tool(&self, deps: &D, call: &ToolCall) -> Result<ToolResult> {
        let mut result = match self.tools.execute(deps, call).await {
            Ok(result) => result,
            Err(e) => match self.config.tool_error_policy {
                ToolErrorPolicy::Abort => {
                    tracing::warn!(tool = %call.name, error = %e, "Tool failed, aborting run");
                    return Err(e);
                }
                ToolErrorPolicy::ReportToModel => {
                    tracing::debug!(tool = %call.name, error = %e, "Tool failed, reporting to model");
                    ToolResult::failure(call.name.as_str(), format!("Error: {e}"))
                }
            },
        };
        result.id.clone_from(&call.id);
        Ok(result)
    }

    /// Format tool result for conversation
    fn format_tool_result(result: &ToolResult) -> String {
        if result.success {
            format!("[Tool '{}' returned]\n{}", result.name, result.output)
        } else {
            format!("[Tool '{}' failed]\n{}", result.name, result.output)
        }
    }

    /// Get the tool registry
    pub fn tools(&self) -> &ToolRegistry<D> {
        &self.tools
    }

    /// Get configuration
    pub const fn config(&self) -> &AgentConfig {
        &self.config
    }

    /// Name of the backing provider
    pub fn provider_name(&self) -> &str {
        self.provider.name()
    }
}

/// Builder for Agent configuration
pub struct AgentBuilder<D, O> {
    provider: Option<Arc<dyn LlmProvider>>,
    tools: ToolRegistry<D>,
    config: AgentConfig,
    _output: PhantomData<fn() -> O>,
}

impl<D, O> Default for AgentBuilder<D, O>
where
    D: Send + Sync + 'static,
    O: OutputSchema,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D, O> AgentBuilder<D, O>
where
    D: Send + Sync + 'static,
    O: OutputSchema,
{
    pub fn new() -> Self {
        Self {
            provider: None,
            tools: ToolRegistry::new(),
            config: AgentConfig::default(),
            _output: PhantomData,
        }
    }

    #[must_use]
    pub fn provider(mut self, provider: Arc<dyn LlmProvider>) -> Self {
        self.provider = Some(provider);
        self
    }

    #[must_use]
    pub fn tool<T: Tool<D> + 'static>(mut self, tool: T) -> Self {
        self.tools.register(tool);
        self
    }

    #[must_use]
    pub fn tools(mut self, tools: ToolRegistry<D>) -> Self {
        self.tools = tools;
        self
    }

    #[must_use]
    pub fn system_prompt(mut self, prompt: impl Into<String>) -> Self {
        self.config.system_prompt = prompt.into();
        self
    }

    #[must_use]
    pub fn model(mut self, model: impl Into<String>) -> Self {
        self.config.generation.model = model.into();
        self
    }

    #[must_use]
    pub const fn temperature(mut self, temp: f32) -> Self {
        self.config.generation.temperature = temp;
        self
    }

    #[must_use]
    pub const fn max_iterations(mut self, max: usize) -> Self {
        self.config.max_iterations = max;
        self
    }

    #[must_use]
    pub const fn inject_tool_descriptions(mut self, inject: bool) -> Self {
        self.config.inject_tool_descriptions = inject;
        self
    }

    #[must_use]
    pub const fn tool_error_policy(mut self, policy: ToolErrorPolicy) -> Self {
        self.config.tool_error_policy = policy;
        self
    }

    pub fn build(self) -> Result<Agent<D, O>> {
        let provider = self.provider
            .ok_or_else(|| AgentError::Config("Provider is required".into()))?;

        Ok(Agent::new(provider, Arc::new(self.tools), self.config))
    }
}
