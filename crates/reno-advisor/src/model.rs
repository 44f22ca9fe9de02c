//! Domain Models
//!
//! Houses, the structured assessment the agent must return, and the
//! dependency bundle injected into each run. Prices use `rust_decimal`.

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use agent_core::OutputSchema;

use crate::lookup::PriceLookup;

/// A house listed in the store
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct House {
    /// Street address, the unique key
    pub address: String,

    /// Price in USD
    pub price: Decimal,

    pub num_bedrooms: u32,

    pub num_bathrooms: u32,

    /// Floor area in square feet
    pub square_feet: u32,
}

impl House {
    pub fn new(
        address: impl Into<String>,
        price: Decimal,
        num_bedrooms: u32,
        num_bathrooms: u32,
        square_feet: u32,
    ) -> Self {
        Self {
            address: address.into(),
            price,
            num_bedrooms,
            num_bathrooms,
            square_feet,
        }
    }
}

/// Structured assessment of a renovation task
#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TaskOutput {
    /// Response to the client with the refined task
    pub response_text: String,

    /// Whether a professional contractor is required
    pub pro_required: bool,

    /// Urgency from 1 (whenever) to 10 (immediately)
    pub urgency: i64,
}

/// Lowest and highest accepted urgency
pub const URGENCY_RANGE: std::ops::RangeInclusive<i64> = 1..=10;

impl OutputSchema for TaskOutput {
    fn name() -> &'static str {
        "TaskOutput"
    }

    fn description() -> &'static str {
        "Assessment of a home renovation task"
    }

    fn json_schema() -> serde_json::Value {
        serde_json::json!({
            "type": "object",
            "properties": {
                "response_text": {
                    "type": "string",
                    "description": "The response text to the client with the refined task"
                },
                "pro_required": {
                    "type": "boolean",
                    "description": "Whether a pro contractor is required"
                },
                "urgency": {
                    "type": "integer",
                    "description": "Urgency level from 1 to 10"
                }
            },
            "required": ["response_text", "pro_required", "urgency"],
            "additionalProperties": false
        })
    }

    fn validate(&self) -> std::result::Result<(), String> {
        if !URGENCY_RANGE.contains(&self.urgency) {
            return Err(format!(
                "urgency {} is outside {}..={}",
                self.urgency,
                URGENCY_RANGE.start(),
                URGENCY_RANGE.end()
            ));
        }
        Ok(())
    }
}

/// Dependencies injected into a single agent run
#[derive(Clone)]
pub struct TaskDependency {
    /// Address the user pinned for this task, if any
    pub address: Option<String>,

    /// Price lookup the `house_price` tool resolves against
    pub db: Arc<dyn PriceLookup>,
}

impl TaskDependency {
    pub fn new(address: Option<String>, db: Arc<dyn PriceLookup>) -> Self {
        Self { address, db }
    }
}

impl std::fmt::Debug for TaskDependency {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TaskDependency")
            .field("address", &self.address)
            .field("db", &self.db.name())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use agent_core::{AgentError, parse_output};

    #[test]
    fn test_task_output_parses() {
        let output: TaskOutput = parse_output(
            r#"{"response_text": "Use wall anchors.", "pro_required": false, "urgency": 2}"#,
        )
        .unwrap();
        assert_eq!(output.urgency, 2);
        assert!(!output.pro_required);
    }

    #[test]
    fn test_urgency_range_is_enforced() {
        for urgency in [0, 11, -3] {
            let json = format!(r#"{{"response_text": "x", "pro_required": true, "urgency": {urgency}}}"#);
            let result = parse_output::<TaskOutput>(&json);
            assert!(matches!(result, Err(AgentError::SchemaViolation(msg)) if msg.contains("outside")));
        }

        for urgency in [1, 10] {
            let json = format!(r#"{{"response_text": "x", "pro_required": true, "urgency": {urgency}}}"#);
            assert!(parse_output::<TaskOutput>(&json).is_ok());
        }
    }

    #[test]
    fn test_partial_output_is_rejected() {
        let result = parse_output::<TaskOutput>(r#"{"response_text": "x", "urgency": 5}"#);
        assert!(matches!(result, Err(AgentError::SchemaViolation(msg)) if msg.contains("pro_required")));

        let extra = parse_output::<TaskOutput>(
            r#"{"response_text": "x", "pro_required": true, "urgency": 5, "cost": 100}"#,
        );
        assert!(matches!(extra, Err(AgentError::SchemaViolation(_))));
    }

    #[test]
    fn test_schema_requires_all_fields() {
        let schema = TaskOutput::json_schema();
        assert_eq!(schema["required"].as_array().unwrap().len(), 3);
        assert_eq!(schema["properties"]["urgency"]["type"], "integer");
    }
}
