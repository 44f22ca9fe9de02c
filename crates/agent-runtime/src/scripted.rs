//! Scripted Provider
//!
//! Deterministic provider for tests and offline demos. Replays a fixed list of
//! steps in order and records every request it receives.

use std::collections::VecDeque;
use std::sync::atomic::{AtomicUsize, Ordering};

use agent_core::{
    error::{AgentError, Result},
    message::Message,
    provider::{Completion, GenerationOptions, LlmProvider, ModelInfo, ProviderInfo},
    tool::ToolCall,
};
use async_trait::async_trait;
use tokio::sync::Mutex;

/// One scripted provider response
#[derive(Clone, Debug)]
pub enum ScriptStep {
    /// Return this completion
    Reply(Completion),
    /// Fail with `AgentError::Provider`
    Fail(String),
}

impl ScriptStep {
    /// Final text answer
    pub fn text(content: impl Into<String>) -> Self {
        Self::Reply(Completion::text(content, "scripted"))
    }

    /// Final answer serialized from a value
    pub fn json(value: &serde_json::Value) -> Self {
        Self::text(value.to_string())
    }

    /// Native tool call
    pub fn tool_call(call: ToolCall) -> Self {
        Self::Reply(Completion::tool_use(vec![call], "scripted"))
    }
}

/// Provider that replays scripted steps
pub struct ScriptedProvider {
    steps: Mutex<VecDeque<ScriptStep>>,
    requests: Mutex<Vec<Vec<Message>>>,
    calls: AtomicUsize,
}

impl ScriptedProvider {
    pub fn new(steps: Vec<ScriptStep>) -> Self {
        Self {
            steps: Mutex::new(steps.into()),
            requests: Mutex::new(Vec::new()),
            calls: AtomicUsize::new(0),
        }
    }

    /// Number of `complete` calls made so far
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Message lists received, one entry per `complete` call
    pub async fn requests(&self) -> Vec<Vec<Message>> {
        self.requests.lock().await.clone()
    }

    /// Steps not consumed yet
    pub async fn remaining(&self) -> usize {
        self.steps.lock().await.len()
    }
}

#[async_trait]
impl LlmProvider for ScriptedProvider {
    fn name(&self) -> &str {
        "Scripted"
    }

    async fn info(&self) -> Result<ProviderInfo> {
        Ok(ProviderInfo {
            name: "Scripted".into(),
            models: self.list_models().await?,
            supports_tools: true,
            supports_structured_output: true,
        })
    }

    async fn health_check(&self) -> Result<bool> {
        Ok(true)
    }

    async fn complete(
        &self,
        messages: &[Message],
        _options: &GenerationOptions,
    ) -> Result<Completion> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.requests.lock().await.push(messages.to_vec());

        match self.steps.lock().await.pop_front() {
            Some(ScriptStep::Reply(completion)) => Ok(completion),
            Some(ScriptStep::Fail(message)) => Err(AgentError::Provider(message)),
            None => Err(AgentError::Provider("script exhausted".into())),
        }
    }

    async fn list_models(&self) -> Result<Vec<ModelInfo>> {
        Ok(vec![ModelInfo {
            id: "scripted".into(),
            name: "scripted".into(),
        }])
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_replays_in_order_and_counts() {
        let provider = ScriptedProvider::new(vec![
            ScriptStep::text("first"),
            ScriptStep::Fail("quota exceeded".into()),
        ]);
        let options = GenerationOptions::default();

        let first = provider.complete(&[Message::user("a")], &options).await.unwrap();
        assert_eq!(first.content, "first");

        let err = provider.complete(&[Message::user("b")], &options).await.unwrap_err();
        assert!(matches!(err, AgentError::Provider(msg) if msg == "quota exceeded"));

        let exhausted = provider.complete(&[], &options).await;
        assert!(exhausted.is_err());

        assert_eq!(provider.call_count(), 3);
        assert_eq!(provider.requests().await[1][0].content, "b");
        assert_eq!(provider.remaining().await, 0);
    }
}
