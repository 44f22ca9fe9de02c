//! Tool System
//!
//! Tools are registered once per agent and invoked by the reasoning loop.
//! Every tool is generic over the dependency bundle `D` that the caller
//! injects into a single run, so a tool never reaches for global state.

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::sync::Arc;

use crate::error::{AgentError, Result};

/// A call the model asked for, natively or through a fenced `tool` block
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolCall {
    /// Tool identifier (`"tool"` is accepted for the text protocol)
    #[serde(alias = "tool")]
    pub name: String,

    #[serde(default)]
    pub arguments: HashMap<String, serde_json::Value>,

    /// Provider-assigned ID; text-protocol calls have none
    #[serde(default)]
    pub id: Option<String>,
}

impl ToolCall {
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            arguments: HashMap::new(),
            id: None,
        }
    }

    #[must_use]
    pub fn with_arg(mut self, key: impl Into<String>, value: serde_json::Value) -> Self {
        self.arguments.insert(key.into(), value);
        self
    }

    #[must_use]
    pub fn with_id(mut self, id: impl Into<String>) -> Self {
        self.id = Some(id.into());
        self
    }

    /// String argument by name
    pub fn str_arg(&self, key: &str) -> Option<&str> {
        self.arguments.get(key).and_then(|v| v.as_str())
    }
}

/// Outcome of one tool call, as fed back to the model
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolResult {
    pub name: String,
    pub id: Option<String>,
    pub success: bool,

    /// Text the model sees: the answer, or the error on failure
    pub output: String,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<serde_json::Value>,
}

impl ToolResult {
    pub fn success(name: impl Into<String>, output: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: true,
            output: output.into(),
            data: None,
        }
    }

    pub fn failure(name: impl Into<String>, error: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            id: None,
            success: false,
            output: error.into(),
            data: None,
        }
    }

    #[must_use]
    pub fn with_data(mut self, data: serde_json::Value) -> Self {
        self.data = Some(data);
        self
    }
}

/// One named argument of a tool
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ParameterSchema {
    pub name: String,

    /// JSON Schema primitive type name
    #[serde(rename = "type")]
    pub param_type: String,

    pub description: String,

    #[serde(default)]
    pub required: bool,
}

impl ParameterSchema {
    /// Required parameter
    pub fn required(
        name: impl Into<String>,
        param_type: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            param_type: param_type.into(),
            description: description.into(),
            required: true,
        }
    }
}

/// Declaration of a tool: what the model is told it can call
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct ToolSchema {
    /// Registry key and the name the model calls
    pub name: String,

    pub description: String,

    #[serde(default)]
    pub parameters: Vec<ParameterSchema>,
}

impl ToolSchema {
    /// Parameters as a JSON Schema object, as function-calling APIs expect
    pub fn parameters_json_schema(&self) -> serde_json::Value {
        let properties: serde_json::Map<String, serde_json::Value> = self
            .parameters
            .iter()
            .map(|p| {
                (
                    p.name.clone(),
                    serde_json::json!({
                        "type": p.param_type,
                        "description": p.description,
                    }),
                )
            })
            .collect();

        let required: Vec<&str> = self
            .parameters
            .iter()
            .filter(|p| p.required)
            .map(|p| p.name.as_str())
            .collect();

        serde_json::json!({
            "type": "object",
            "properties": properties,
            "required": required,
            "additionalProperties": false,
        })
    }
}

/// A function the model may invoke mid-run
///
/// `D` is the dependency bundle handed to [`crate::Agent::run`].
#[async_trait]
pub trait Tool<D>: Send + Sync
where
    D: Send + Sync,
{
    fn schema(&self) -> ToolSchema;

    /// Execute the tool with the run's dependencies and the model's arguments
    async fn execute(&self, deps: &D, call: &ToolCall) -> Result<ToolResult>;

    /// Rejects calls missing a required argument
    fn validate(&self, call: &ToolCall) -> Result<()> {
        let schema = self.schema();

        for param in &schema.parameters {
            if param.required && !call.arguments.contains_key(&param.name) {
                return Err(AgentError::ToolValidation(format!(
                    "Missing required parameter: {}",
                    param.name
                )));
            }
        }

        Ok(())
    }
}

/// Tools of one agent, keyed by name
pub struct ToolRegistry<D> {
    tools: HashMap<String, Arc<dyn Tool<D>>>,
}

impl<D> Default for ToolRegistry<D>
where
    D: Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<D> ToolRegistry<D>
where
    D: Send + Sync + 'static,
{
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Adds a tool, replacing any with the same name
    pub fn register<T: Tool<D> + 'static>(&mut self, tool: T) {
        let schema = tool.schema();
        self.tools.insert(schema.name, Arc::new(tool));
    }

    pub fn get(&self, name: &str) -> Option<Arc<dyn Tool<D>>> {
        self.tools.get(name).cloned()
    }

    /// Looks up, validates and runs `call` against `deps`
    pub async fn execute(&self, deps: &D, call: &ToolCall) -> Result<ToolResult> {
        let tool = self.get(&call.name).ok_or_else(|| {
            AgentError::ToolNotFound(call.name.clone())
        })?;

        tool.validate(call)?;
        tool.execute(deps, call).await
    }

    /// Schemas sorted by name
    pub fn schemas(&self) -> Vec<ToolSchema> {
        let mut schemas: Vec<ToolSchema> = self.tools.values().map(|t| t.schema()).collect();
        schemas.sort_by(|a, b| a.name.cmp(&b.name));
        schemas
    }

    /// Sorted tool names
    pub fn names(&self) -> Vec<&str> {
        let mut names: Vec<&str> = self.tools.keys().map(String::as_str).collect();
        names.sort_unstable();
        names
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    /// Markdown block listing the tools and the fenced `tool` call format,
    /// for providers without native function calling
    pub fn prompt_section(&self) -> String {
        use std::fmt::Write;

        let mut out = String::from(
            "## Tools\n\nTo call a tool, reply with only this block and wait for the result:\n\n\
             ```tool\n{\"tool\": \"<name>\", \"arguments\": {}}\n```\n",
        );
        for schema in self.schemas() {
            let _ = write!(out, "\n### {}\n{}\n", schema.name, schema.description);
            for param in &schema.parameters {
                let optional = if param.required { "" } else { ", optional" };
                let _ = writeln!(
                    out,
                    "- `{}` ({}{optional}): {}",
                    param.name, param.param_type, param.description
                );
            }
        }
        out
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct Greeting {
        name: String,
    }

    struct GreetTool;

    #[async_trait]
    impl Tool<Greeting> for GreetTool {
        fn schema(&self) -> ToolSchema {
            ToolSchema {
                name: "greet".into(),
                description: "Greet somebody".into(),
                parameters: vec![ParameterSchema::required("salutation", "string", "Greeting word")],
            }
        }

        async fn execute(&self, deps: &Greeting, call: &ToolCall) -> Result<ToolResult> {
            let salutation = call.str_arg("salutation").unwrap_or("Hello");
            Ok(ToolResult::success("greet", format!("{salutation}, {}", deps.name)))
        }
    }

    #[tokio::test]
    async fn test_registry_passes_dependencies() {
        let mut registry = ToolRegistry::new();
        registry.register(GreetTool);

        let deps = Greeting { name: "Ada".into() };
        let call = ToolCall::new("greet").with_arg("salutation", serde_json::json!("Hi"));
        let result = registry.execute(&deps, &call).await.unwrap();

        assert!(result.success);
        assert_eq!(result.output, "Hi, Ada");
    }

    #[tokio::test]
    async fn test_missing_argument_and_unknown_tool() {
        let mut registry = ToolRegistry::new();
        registry.register(GreetTool);
        let deps = Greeting { name: "Ada".into() };

        let err = registry.execute(&deps, &ToolCall::new("greet")).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolValidation(_)));

        let err = registry.execute(&deps, &ToolCall::new("wave")).await.unwrap_err();
        assert!(matches!(err, AgentError::ToolNotFound(name) if name == "wave"));
    }

    #[test]
    fn test_text_protocol_alias() {
        let call: ToolCall =
            serde_json::from_str(r#"{"tool": "greet", "arguments": {"salutation": "Hey"}}"#).unwrap();
        assert_eq!(call.name, "greet");
        assert_eq!(call.str_arg("salutation"), Some("Hey"));
    }

    #[test]
    fn test_parameters_json_schema() {
        let schema = GreetTool.schema().parameters_json_schema();
        assert_eq!(schema["type"], "object");
        assert_eq!(schema["properties"]["salutation"]["type"], "string");
        assert_eq!(schema["required"][0], "salutation");
    }

    #[test]
    fn test_prompt_section_lists_tools() {
        let mut registry: ToolRegistry<Greeting> = ToolRegistry::new();
        registry.register(GreetTool);

        let section = registry.prompt_section();
        assert!(section.contains("### greet"));
        assert!(section.contains("`salutation` (string): Greeting word"));
    }
}
