//! # agent-core
//!
//! Core agent logic with provider-agnostic LLM abstraction, dependency-injected
//! tools and schema-validated structured output.
//!
//! ## Architecture
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────────┐
//! │                      Agent<D, O>                              │
//! │  ┌─────────────┐  ┌──────────────┐  ┌─────────────────────┐  │
//! │  │  Reasoning  │  │ ToolRegistry │  │   LlmProvider       │  │
//! │  │    Loop     │──│     <D>      │──│   (Strategy)        │  │
//! │  └──────┬──────┘  └──────────────┘  └─────────────────────┘  │
//! │         └── OutputSchema (O) validates the final answer       │
//! └──────────────────────────────────────────────────────────────┘
//! ```
//!
//! `D` is the dependency bundle a caller injects into one run; tools receive
//! it by reference. `O` is the structured result the model must produce.

pub mod provider;
pub mod tool;
pub mod reasoning;
pub mod message;
pub mod output;
pub mod error;
pub mod session;

pub use error::{AgentError, Result};
pub use message::{Conversation, Message, Role};
pub use output::{OutputSchema, parse_output};
pub use provider::LlmProvider;
pub use reasoning::{Agent, AgentBuilder, AgentConfig, ToolErrorPolicy};
pub use session::{SessionHandle, SessionId, SessionRegistry};
pub use tool::{Tool, ToolCall, ToolResult, ToolRegistry, ToolSchema};
