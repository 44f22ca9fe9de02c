//! Structured Output
//!
//! The final answer of an agent run must deserialize into a type implementing
//! [`OutputSchema`]. Parsing is strict: missing fields, `null`s and wrong
//! primitive types are a [`AgentError::SchemaViolation`]. There is no repair
//! and no re-prompt.

use serde::de::DeserializeOwned;

use crate::error::{AgentError, Result};
use crate::provider::ResponseSchema;

/// Contract for the structured result of an agent run
pub trait OutputSchema: DeserializeOwned + Send {
    /// Schema name shown to the provider (e.g., "TaskOutput")
    fn name() -> &'static str;

    /// What the output represents
    fn description() -> &'static str;

    /// JSON Schema for the output object
    fn json_schema() -> serde_json::Value;

    /// Semantic checks that the type system cannot express
    fn validate(&self) -> std::result::Result<(), String> {
        Ok(())
    }

    /// Schema in the form providers consume
    fn response_schema() -> ResponseSchema {
        ResponseSchema {
            name: Self::name().into(),
            description: Self::description().into(),
            schema: Self::json_schema(),
        }
    }

    /// System prompt section instructing the model to answer in this shape
    fn prompt_section() -> String {
        let schema = serde_json::to_string_pretty(&Self::json_schema()).unwrap_or_default();
        format!(
            "## Final Answer\n\nWhen you are done, reply with a single JSON object matching this schema and nothing else:\n\n```json\n{schema}\n```\n"
        )
    }
}

/// Parse and validate a model's final answer
pub fn parse_output<O: OutputSchema>(content: &str) -> Result<O> {
    let json = extract_json(content).ok_or_else(|| {
        AgentError::SchemaViolation(format!("{}: response contains no JSON object", O::name()))
    })?;

    let output: O = serde_json::from_str(json)
        .map_err(|e| AgentError::SchemaViolation(format!("{}: {e}", O::name())))?;

    output
        .validate()
        .map_err(|e| AgentError::SchemaViolation(format!("{}: {e}", O::name())))?;

    Ok(output)
}

/// Locate the JSON object in a model response
///
/// Accepts bare JSON, a fenced ```` ```json ```` block, or the outermost
/// `{...}` span of free text.
fn extract_json(content: &str) -> Option<&str> {
    let trimmed = content.trim();
    if trimmed.starts_with('{') && trimmed.ends_with('}') {
        return Some(trimmed);
    }

    let fence = "```json";
    if let Some(start_idx) = trimmed.find(fence) {
        let after_marker = &trimmed[start_idx + fence.len()..];
        if let Some(end_idx) = after_marker.find("```") {
            return Some(after_marker[..end_idx].trim());
        }
    }

    let start = trimmed.find('{')?;
    let end = trimmed.rfind('}')?;
    (end > start).then(|| &trimmed[start..=end])
}
