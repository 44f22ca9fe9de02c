//! Renovation Agent
//!
//! Binds the renovation system prompt, the `TaskOutput` schema and the
//! `house_price` tool into one agent.

use std::sync::Arc;

use agent_core::{Agent, AgentBuilder, LlmProvider, Result as CoreResult, ToolErrorPolicy};

use crate::model::{TaskDependency, TaskOutput};
use crate::svckit::HousePriceTool;

/// Agent that assesses renovation tasks
pub type RenovationAgent = Agent<TaskDependency, TaskOutput>;

/// System prompt for the renovation agent
pub const RENOVATION_PROMPT: &str = r"You are a home renovation expert. Given a task description, determine if a professional contractor is needed and the urgency level. Give a brief description of the steps to execute the task and also dedicate a section to describing the benefit of hiring a professional contractor for this task. Use the database to get house prices.

Rate urgency as a whole number from 1 (can wait indefinitely) to 10 (needs attention immediately).
If a house price cannot be found, continue without it.";

/// Knobs for [`refiner_agent_with`]
#[derive(Clone, Debug)]
pub struct RefinerOptions {
    pub model: String,
    pub tool_error_policy: ToolErrorPolicy,
    /// Describe tools in the prompt for providers without native function calling
    pub inject_tool_descriptions: bool,
    pub max_iterations: usize,
}

impl Default for RefinerOptions {
    fn default() -> Self {
        Self {
            model: "gpt-4o".into(),
            tool_error_policy: ToolErrorPolicy::ReportToModel,
            inject_tool_descriptions: true,
            max_iterations: 10,
        }
    }
}

/// Renovation agent with default options for `model`
pub fn refiner_agent(
    provider: Arc<dyn LlmProvider>,
    model: impl Into<String>,
) -> CoreResult<RenovationAgent> {
    refiner_agent_with(
        provider,
        RefinerOptions {
            model: model.into(),
            ..RefinerOptions::default()
        },
    )
}

pub fn refiner_agent_with(
    provider: Arc<dyn LlmProvider>,
    options: RefinerOptions,
) -> CoreResult<RenovationAgent> {
    tracing::debug!(
        provider = provider.name(),
        model = %options.model,
        policy = ?options.tool_error_policy,
        "Building renovation agent"
    );

    AgentBuilder::new()
        .provider(provider)
        .system_prompt(RENOVATION_PROMPT)
        .model(options.model)
        .tool(HousePriceTool::new())
        .tool_error_policy(options.tool_error_policy)
        .inject_tool_descriptions(options.inject_tool_descriptions)
        .max_iterations(options.max_iterations)
        .build()
}

/// User prompt for a task, qualified with the address when one is selected
pub fn compose_prompt(task: &str, address: Option<&str>) -> String {
    match address {
        Some(address) => format!("Address: {address}. Task: {task}"),
        None => task.to_string(),
    }
}
