//! Core conversation loop implementation.

use std::sync::Arc;

use crate::config::Config;
use crate::llm::{GeminiClient, LlmClient, ModelResponse, ToolCall, Turn};
use crate::persona::{KeywordDetector, PersonaDetector};
use crate::tools::{BackendClient, ToolCatalog, ToolExecutor};

use super::prompt::build_system_instruction;
use super::ChatError;

const DEFAULT_RESPONSE: &str = "Operation completed.";

/// Final answer of one `chat` call.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ChatReply {
    pub response: String,
    /// Key of the persona the message was routed to
    pub persona: &'static str,
    /// Model calls made while answering
    pub rounds: usize,
}

enum LoopState {
    AwaitingModel,
    HandlingToolCalls(Vec<ToolCall>),
    Done(String),
    Failed(ChatError),
}

/// One conversation: its history plus the shared collaborators.
///
/// `chat` takes `&mut self`, so a session has a single writer. Callers that
/// share a session across tasks wrap it in a mutex.
pub struct ChatSession {
    llm: Arc<dyn LlmClient>,
    executor: Arc<ToolExecutor>,
    detector: Arc<dyn PersonaDetector>,
    system_instruction: Arc<str>,
    max_rounds: usize,
    history: Vec<Turn>,
}

impl ChatSession {
    /// Create a session using keyword detection over the executor's registry.
    pub fn new(llm: Arc<dyn LlmClient>, executor: Arc<ToolExecutor>, max_rounds: usize) -> Self {
        let registry = *executor.catalog().registry();
        Self {
            llm,
            executor,
            detector: Arc::new(KeywordDetector::new(registry)),
            system_instruction: build_system_instruction(&registry).into(),
            max_rounds: max_rounds.max(1),
            history: Vec::new(),
        }
    }

    /// Wire a standalone session against Gemini and the configured backend.
    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        let llm = Arc::new(GeminiClient::from_config(config)?);
        let backend = BackendClient::from_config(config)?;
        let executor = Arc::new(ToolExecutor::new(ToolCatalog::builtin(), backend));
        Ok(Self::new(llm, executor, config.max_rounds))
    }

    pub fn with_detector(mut self, detector: Arc<dyn PersonaDetector>) -> Self {
        self.detector = detector;
        self
    }

    /// Every turn of the session, oldest first. Append-only.
    pub fn history(&self) -> &[Turn] {
        &self.history
    }

    /// Answer one user message.
    ///
    /// On failure the turns appended so far are kept, so completed tool
    /// exchanges stay visible to later rounds. Every tool-call turn is already
    /// paired with its results before the next model call.
    pub async fn chat(&mut self, message: &str) -> Result<ChatReply, ChatError> {
        let persona = self.detector.detect(message);
        let tools = self.executor.catalog().tools_for_persona(persona)?;
        tracing::info!(persona, tools = tools.len(), "Routing message");

        self.history.push(Turn::user_text(message));

        let mut rounds = 0;
        let mut state = LoopState::AwaitingModel;
        loop {
            state = match state {
                LoopState::AwaitingModel => {
                    if rounds >= self.max_rounds {
                        LoopState::Failed(ChatError::Exhausted { rounds })
                    } else {
                        rounds += 1;
                        tracing::debug!(persona, round = rounds, "Calling model");
                        match self
                            .llm
                            .generate(&self.system_instruction, &self.history, &tools)
                            .await
                        {
                            Ok(ModelResponse::ToolCalls(calls)) if !calls.is_empty() => {
                                LoopState::HandlingToolCalls(calls)
                            }
                            Ok(ModelResponse::Text(text)) => LoopState::Done(text.trim().to_string()),
                            Ok(_) => LoopState::Done(String::new()),
                            Err(e) => LoopState::Failed(ChatError::Model(e)),
                        }
                    }
                }

                LoopState::HandlingToolCalls(calls) => {
                    self.history.push(Turn::tool_calls(calls.clone()));
                    for call in &calls {
                        tracing::info!(persona, tool = %call.name, "Tool call");
                        let result = self.executor.execute(&call.name, &call.args).await;
                        self.history.push(Turn::tool_result(call, result));
                    }
                    LoopState::AwaitingModel
                }

                LoopState::Done(text) => {
                    let response = if text.is_empty() {
                        DEFAULT_RESPONSE.to_string()
                    } else {
                        text
                    };
                    self.history.push(Turn::assistant_text(response.clone()));
                    tracing::info!(persona, rounds, "Chat completed");
                    return Ok(ChatReply {
                        response,
                        persona,
                        rounds,
                    });
                }

                LoopState::Failed(err) => {
                    tracing::error!(persona, rounds, error = %err, "Chat failed");
                    return Err(err);
                }
            };
        }
    }
}
