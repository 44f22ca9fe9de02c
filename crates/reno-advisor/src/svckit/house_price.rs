//! House Price Tool
//!
//! Resolves an address to its listed price through the run's `PriceLookup`.

use async_trait::async_trait;

use agent_core::{
    AgentError, Result as CoreResult, Tool, ToolCall, ToolResult, ToolSchema,
    tool::ParameterSchema,
};

use crate::model::TaskDependency;

/// Tool name the model calls
pub const HOUSE_PRICE_TOOL: &str = "house_price";

/// Tool for looking up the price of a listed house
#[derive(Clone, Copy, Debug, Default)]
pub struct HousePriceTool;

impl HousePriceTool {
    pub const fn new() -> Self {
        Self
    }

    /// Explicit argument first, then the address pinned for the run
    fn resolve_address<'a>(deps: &'a TaskDependency, call: &'a ToolCall) -> Option<&'a str> {
        call.str_arg("address")
            .filter(|a| !a.trim().is_empty())
            .or(deps.address.as_deref())
    }
}

#[async_trait]
impl Tool<TaskDependency> for HousePriceTool {
    fn schema(&self) -> ToolSchema {
        ToolSchema {
            name: HOUSE_PRICE_TOOL.into(),
            description: "Get the price of a house by its exact street address. Returns the price in USD.".into(),
            parameters: vec![ParameterSchema {
                name: "address".into(),
                param_type: "string".into(),
                description: "Street address, e.g. '123 Main St'. Defaults to the address given with the task.".into(),
                required: false,
            }],
        }
    }

    async fn execute(&self, deps: &TaskDependency, call: &ToolCall) -> CoreResult<ToolResult> {
        let address = Self::resolve_address(deps, call).ok_or_else(|| {
            AgentError::ToolValidation("No address given and none pinned for this task".into())
        })?;

        let price = deps
            .db
            .price_of(address)
            .await
            .map_err(AgentError::tool_failure)?;

        tracing::debug!(address, %price, "House price resolved");

        Ok(ToolResult::success(HOUSE_PRICE_TOOL, price.to_string()).with_data(
            serde_json::json!({
                "address": address,
                "price": price,
            }),
        ))
    }
}
