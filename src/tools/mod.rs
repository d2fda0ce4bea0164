//! Tool system: descriptors offered to the model and their execution against
//! the business backend.
//!
//! Tool failures never abort a conversation. They come back as
//! [`ToolResult::Error`] values that the model sees and can explain.

mod backend;
mod catalog;
mod executor;
mod placeholder;
mod schema;

use serde::Serialize;
use serde_json::{json, Value};
use thiserror::Error;

pub use backend::BackendClient;
pub use catalog::{CatalogError, ToolCatalog, BUILTIN_TOOLS};
pub use executor::ToolExecutor;
pub use schema::{ParamSpec, ParamType, ToolDescriptor};

/// Classification of a failed tool invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolErrorKind {
    /// The model named a tool that does not exist
    UnknownTool,
    /// Required arguments were missing or malformed
    InvalidArguments,
    /// The backend was unreachable or answered with a non-success status
    UpstreamError,
}

/// Structured failure of a single tool invocation.
#[derive(Debug, Clone, PartialEq, Error, Serialize)]
#[error("{kind:?}: {message}")]
pub struct ToolError {
    pub kind: ToolErrorKind,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub status: Option<u16>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Value>,
}

impl ToolError {
    pub fn unknown_tool(name: &str) -> Self {
        Self {
            kind: ToolErrorKind::UnknownTool,
            message: format!("Unknown function: {}", name),
            status: None,
            details: None,
        }
    }

    pub fn invalid_arguments(message: impl Into<String>) -> Self {
        Self {
            kind: ToolErrorKind::InvalidArguments,
            message: message.into(),
            status: None,
            details: None,
        }
    }

    pub fn upstream(message: impl Into<String>, status: Option<u16>, details: Option<Value>) -> Self {
        Self {
            kind: ToolErrorKind::UpstreamError,
            message: message.into(),
            status,
            details,
        }
    }
}

/// Outcome of executing one tool.
#[derive(Debug, Clone, PartialEq)]
pub enum ToolResult {
    Success(Value),
    Error(ToolError),
}

impl ToolResult {
    pub fn is_success(&self) -> bool {
        matches!(self, Self::Success(_))
    }

    /// JSON object handed back to the model.
    pub fn to_payload(&self) -> Value {
        match self {
            Self::Success(value @ Value::Object(_)) => value.clone(),
            Self::Success(other) => json!({ "result": other }),
            Self::Error(err) => json!({ "error": err }),
        }
    }
}

impl From<Result<Value, ToolError>> for ToolResult {
    fn from(result: Result<Value, ToolError>) -> Self {
        match result {
            Ok(value) => Self::Success(value),
            Err(err) => Self::Error(err),
        }
    }
}
