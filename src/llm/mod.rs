//! Provider-neutral conversation types and the model client seam.
//!
//! The chat loop only talks to [`LlmClient`]; the Gemini wire format lives in
//! [`gemini`].

mod gemini;

use async_trait::async_trait;
use serde::Serialize;
use serde_json::{Map, Value};

use crate::tools::{ToolDescriptor, ToolResult};

pub use gemini::GeminiClient;

/// Who produced a turn.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Role {
    User,
    Assistant,
}

/// A tool invocation requested by the model.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolCall {
    /// Unique within the conversation, pairs the call with its result.
    pub id: String,
    pub name: String,
    pub args: Map<String, Value>,
    /// Opaque provider token that must be echoed back with the call.
    pub signature: Option<String>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TurnContent {
    Text(String),
    ToolCalls(Vec<ToolCall>),
    ToolResult {
        call_id: String,
        name: String,
        result: ToolResult,
    },
}

/// One entry of a conversation history.
#[derive(Debug, Clone, PartialEq)]
pub struct Turn {
    pub role: Role,
    pub content: TurnContent,
}

impl Turn {
    pub fn user_text(text: impl Into<String>) -> Self {
        Self::new(Role::User, TurnContent::Text(text.into()))
    }

    pub fn assistant_text(text: impl Into<String>) -> Self {
        Self::new(Role::Assistant, TurnContent::Text(text.into()))
    }

    pub fn tool_calls(calls: Vec<ToolCall>) -> Self {
        Self::new(Role::Assistant, TurnContent::ToolCalls(calls))
    }

    /// Tool results are fed back on the user side of the conversation.
    pub fn tool_result(call: &ToolCall, result: ToolResult) -> Self {
        Self::new(
            Role::User,
            TurnContent::ToolResult {
                call_id: call.id.clone(),
                name: call.name.clone(),
                result,
            },
        )
    }

    fn new(role: Role, content: TurnContent) -> Self {
        Self { role, content }
    }

    pub fn is_tool_result(&self) -> bool {
        matches!(self.content, TurnContent::ToolResult { .. })
    }
}

/// What the model produced for one request.
#[derive(Debug, Clone, PartialEq)]
pub enum ModelResponse {
    ToolCalls(Vec<ToolCall>),
    Text(String),
    Empty,
}

/// A language model that can answer with text or tool calls.
#[async_trait]
pub trait LlmClient: Send + Sync {
    async fn generate(
        &self,
        system: &str,
        history: &[Turn],
        tools: &[&'static ToolDescriptor],
    ) -> anyhow::Result<ModelResponse>;
}
