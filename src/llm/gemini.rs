//! Google Gemini `generateContent` client with function calling.

use std::time::Duration;

use anyhow::{anyhow, bail};
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use uuid::Uuid;

use super::{LlmClient, ModelResponse, Role, ToolCall, Turn, TurnContent};
use crate::config::Config;
use crate::tools::ToolDescriptor;

const GEMINI_API_BASE: &str = "https://generativelanguage.googleapis.com/v1beta/models";

/// Gemini REST client. The key travels in the `x-goog-api-key` header.
pub struct GeminiClient {
    http: reqwest::Client,
    api_key: String,
    model: String,
    api_base: String,
}

impl GeminiClient {
    pub fn new(
        api_key: impl Into<String>,
        model: impl Into<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder().timeout(timeout).build()?;
        Ok(Self {
            http,
            api_key: api_key.into(),
            model: model.into(),
            api_base: GEMINI_API_BASE.to_string(),
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(config.api_key.clone(), config.model.clone(), config.llm_timeout)
    }

    /// Point the client at a different API root (used against local fakes).
    pub fn with_api_base(mut self, api_base: impl Into<String>) -> Self {
        self.api_base = api_base.into().trim_end_matches('/').to_string();
        self
    }

    pub fn model(&self) -> &str {
        &self.model
    }
}

#[async_trait]
impl LlmClient for GeminiClient {
    async fn generate(
        &self,
        system: &str,
        history: &[Turn],
        tools: &[&'static ToolDescriptor],
    ) -> anyhow::Result<ModelResponse> {
        let request = build_request(system, history, tools);
        let url = format!("{}/{}:generateContent", self.api_base, self.model);

        tracing::debug!(
            model = %self.model,
            turns = history.len(),
            tools = tools.len(),
            "Sending Gemini request"
        );

        let response = self
            .http
            .post(&url)
            .header("x-goog-api-key", &self.api_key)
            .json(&request)
            .send()
            .await
            .map_err(|e| anyhow!("Gemini request failed: {}", e.without_url()))?;

        let status = response.status();
        let body = response.text().await?;
        if !status.is_success() {
            bail!("Gemini API error: {} - {}", status, body);
        }

        let data: GeminiResponse = serde_json::from_str(&body)
            .map_err(|e| anyhow!("Failed to parse Gemini response: {}", e))?;
        let parsed = parse_response(data)?;

        match &parsed {
            ModelResponse::ToolCalls(calls) => tracing::debug!(
                calls = ?calls.iter().map(|c| c.name.as_str()).collect::<Vec<_>>(),
                "Gemini requested tools"
            ),
            ModelResponse::Text(text) => tracing::debug!(chars = text.len(), "Gemini answered"),
            ModelResponse::Empty => tracing::warn!("Gemini returned no usable content"),
        }
        Ok(parsed)
    }
}

// ============================================================================
// API Types
// ============================================================================

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiRequest {
    contents: Vec<GeminiContent>,
    system_instruction: GeminiSystemInstruction,
    #[serde(skip_serializing_if = "Option::is_none")]
    tools: Option<Vec<GeminiTool>>,
}

#[derive(Debug, Serialize)]
struct GeminiSystemInstruction {
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiContent {
    #[serde(default)]
    role: String,
    #[serde(default)]
    parts: Vec<GeminiPart>,
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiPart {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
    #[serde(default, skip_serializing_if = "std::ops::Not::not")]
    thought: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_call: Option<GeminiFunctionCall>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    function_response: Option<GeminiFunctionResponse>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    thought_signature: Option<String>,
}

impl GeminiPart {
    fn text(text: impl Into<String>) -> Self {
        Self {
            text: Some(text.into()),
            ..Self::default()
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionCall {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    id: Option<String>,
    name: String,
    #[serde(default)]
    args: Value,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
struct GeminiFunctionResponse {
    name: String,
    response: Value,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
struct GeminiTool {
    function_declarations: Vec<GeminiFunctionDeclaration>,
}

#[derive(Debug, Serialize)]
struct GeminiFunctionDeclaration {
    name: &'static str,
    description: &'static str,
    parameters: Value,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct GeminiResponse {
    candidates: Option<Vec<GeminiCandidate>>,
    prompt_feedback: Option<Value>,
    error: Option<GeminiError>,
}

#[derive(Debug, Deserialize)]
struct GeminiCandidate {
    content: Option<GeminiContent>,
}

#[derive(Debug, Deserialize)]
struct GeminiError {
    message: String,
}

// ============================================================================
// Conversion
// ============================================================================

fn build_request(
    system: &str,
    history: &[Turn],
    tools: &[&'static ToolDescriptor],
) -> GeminiRequest {
    let tools = if tools.is_empty() {
        None
    } else {
        Some(vec![GeminiTool {
            function_declarations: tools
                .iter()
                .map(|t| GeminiFunctionDeclaration {
                    name: t.name,
                    description: t.description,
                    parameters: t.parameters_schema(),
                })
                .collect(),
        }])
    };

    GeminiRequest {
        contents: convert_history(history),
        system_instruction: GeminiSystemInstruction {
            parts: vec![GeminiPart::text(system)],
        },
        tools,
    }
}

/// Map turns onto Gemini contents. Consecutive tool results share one
/// `user` content, matching the order of the calls that produced them.
/// Consecutive text turns of one role (left by a failed exchange) are joined.
fn convert_history(history: &[Turn]) -> Vec<GeminiContent> {
    let mut contents: Vec<GeminiContent> = Vec::with_capacity(history.len());

    for turn in history {
        let role = match turn.role {
            Role::User => "user",
            Role::Assistant => "model",
        };

        let parts = match &turn.content {
            TurnContent::Text(text) => vec![GeminiPart::text(text.as_str())],
            TurnContent::ToolCalls(calls) => calls
                .iter()
                .map(|call| GeminiPart {
                    function_call: Some(GeminiFunctionCall {
                        id: None,
                        name: call.name.clone(),
                        args: Value::Object(call.args.clone()),
                    }),
                    thought_signature: call.signature.clone(),
                    ..GeminiPart::default()
                })
                .collect(),
            TurnContent::ToolResult { name, result, .. } => vec![GeminiPart {
                function_response: Some(GeminiFunctionResponse {
                    name: name.clone(),
                    response: result.to_payload(),
                }),
                ..GeminiPart::default()
            }],
        };

        if let Some(last) = contents.last_mut() {
            if mergeable(last, role, &parts) {
                last.parts.extend(parts);
                continue;
            }
        }

        contents.push(GeminiContent {
            role: role.to_string(),
            parts,
        });
    }

    contents
}

fn mergeable(last: &GeminiContent, role: &str, parts: &[GeminiPart]) -> bool {
    let all_text = |ps: &[GeminiPart]| ps.iter().all(|p| p.text.is_some());
    let all_responses = |ps: &[GeminiPart]| ps.iter().all(|p| p.function_response.is_some());

    last.role == role
        && !last.parts.is_empty()
        && ((all_text(&last.parts) && all_text(parts))
            || (all_responses(&last.parts) && all_responses(parts)))
}

fn parse_response(data: GeminiResponse) -> anyhow::Result<ModelResponse> {
    if let Some(err) = data.error {
        bail!("Gemini API error: {}", err.message);
    }

    let Some(content) = data
        .candidates
        .and_then(|c| c.into_iter().next())
        .and_then(|c| c.content)
    else {
        if let Some(feedback) = data.prompt_feedback {
            tracing::warn!(feedback = %feedback, "Gemini returned no candidates");
        }
        return Ok(ModelResponse::Empty);
    };

    let mut calls = Vec::new();
    let mut text = String::new();
    for part in content.parts {
        if let Some(fc) = part.function_call {
            let args = match fc.args {
                Value::Object(map) => map,
                Value::Null => Map::new(),
                other => {
                    let mut map = Map::new();
                    map.insert("value".to_string(), other);
                    map
                }
            };
            calls.push(ToolCall {
                id: fc
                    .id
                    .unwrap_or_else(|| format!("call_{}", Uuid::new_v4().simple())),
                name: fc.name,
                args,
                signature: part.thought_signature,
            });
        } else if let Some(t) = part.text.filter(|_| !part.thought) {
            text.push_str(&t);
        }
    }

    Ok(if !calls.is_empty() {
        ModelResponse::ToolCalls(calls)
    } else if !text.trim().is_empty() {
        ModelResponse::Text(text)
    } else {
        ModelResponse::Empty
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::tools::{ToolCatalog, ToolResult};
    use axum::{
        extract::State,
        http::{HeaderMap, Uri},
        routing::post,
        Json, Router,
    };
    use serde_json::json;
    use std::sync::{Arc, Mutex};

    fn call(id: &str, name: &str, args: Value) -> ToolCall {
        ToolCall {
            id: id.into(),
            name: name.into(),
            args: args.as_object().cloned().unwrap(),
            signature: None,
        }
    }

    fn response(value: Value) -> GeminiResponse {
        serde_json::from_value(value).unwrap()
    }

    #[test]
    fn history_maps_roles_and_merges_tool_results() {
        let a = call("a", "read_campaign", json!({"campaign_id": "1"}));
        let b = call("b", "list_campaigns", json!({}));
        let history = vec![
            Turn::user_text("show me campaign 1 and all campaigns"),
            Turn::tool_calls(vec![a.clone(), b.clone()]),
            Turn::tool_result(&a, ToolResult::Success(json!({"id": "1"}))),
            Turn::tool_result(&b, ToolResult::Success(json!([]))),
            Turn::assistant_text("Done."),
        ];

        let contents = serde_json::to_value(convert_history(&history)).unwrap();
        assert_eq!(contents.as_array().unwrap().len(), 4);
        assert_eq!(contents[0]["role"], "user");
        assert_eq!(contents[1]["role"], "model");
        assert_eq!(contents[1]["parts"][0]["functionCall"]["name"], "read_campaign");
        assert_eq!(contents[1]["parts"][1]["functionCall"]["args"], json!({}));
        assert_eq!(contents[2]["role"], "user");
        assert_eq!(
            contents[2]["parts"],
            json!([
                {"functionResponse": {"name": "read_campaign", "response": {"id": "1"}}},
                {"functionResponse": {"name": "list_campaigns", "response": {"result": []}}}
            ])
        );
        assert_eq!(contents[3]["parts"][0]["text"], "Done.");
    }

    #[test]
    fn unanswered_user_text_joins_the_next_message() {
        let history = vec![
            Turn::user_text("create a campaign"),
            Turn::user_text("are you there?"),
        ];
        let contents = serde_json::to_value(convert_history(&history)).unwrap();
        assert_eq!(contents.as_array().unwrap().len(), 1);
        assert_eq!(
            contents[0]["parts"],
            json!([{"text": "create a campaign"}, {"text": "are you there?"}])
        );
    }

    #[test]
    fn text_after_tool_results_stays_separate() {
        let a = call("a", "list_campaigns", json!({}));
        let history = vec![
            Turn::user_text("list campaigns"),
            Turn::tool_calls(vec![a.clone()]),
            Turn::tool_result(&a, ToolResult::Success(json!([]))),
            Turn::user_text("hello?"),
        ];
        let contents = serde_json::to_value(convert_history(&history)).unwrap();
        assert_eq!(contents.as_array().unwrap().len(), 4);
        assert_eq!(contents[3]["parts"][0]["text"], "hello?");
    }

    #[test]
    fn request_carries_system_instruction_and_declarations() {
        let catalog = ToolCatalog::builtin();
        let tools = catalog.tools_for_persona("campaign_manager").unwrap();
        let request =
            serde_json::to_value(build_request("be helpful", &[Turn::user_text("hi")], &tools))
                .unwrap();

        assert_eq!(request["systemInstruction"]["parts"][0]["text"], "be helpful");
        let decls = request["tools"][0]["functionDeclarations"].as_array().unwrap();
        assert_eq!(decls.len(), tools.len());
        assert_eq!(decls[0]["name"], "create_campaign");
        assert_eq!(decls[0]["parameters"]["type"], "object");
    }

    #[test]
    fn request_without_tools_omits_tools_field() {
        let request = serde_json::to_value(build_request("s", &[], &[])).unwrap();
        assert!(request.get("tools").is_none());
    }

    #[test]
    fn signature_is_echoed_back() {
        let mut c = call("a", "list_campaigns", json!({}));
        c.signature = Some("sig-123".into());
        let contents = serde_json::to_value(convert_history(&[Turn::tool_calls(vec![c])])).unwrap();
        assert_eq!(contents[0]["parts"][0]["thoughtSignature"], "sig-123");
    }

    #[test]
    fn parses_function_calls_in_order() {
        let parsed = parse_response(response(json!({
            "candidates": [{"content": {"role": "model", "parts": [
                {"functionCall": {"name": "read_campaign", "args": {"campaign_id": "1"}}, "thoughtSignature": "s1"},
                {"functionCall": {"name": "list_campaigns", "args": {}}}
            ]}}]
        })))
        .unwrap();

        let ModelResponse::ToolCalls(calls) = parsed else {
            panic!("expected tool calls");
        };
        assert_eq!(calls.len(), 2);
        assert_eq!(calls[0].name, "read_campaign");
        assert_eq!(calls[0].args["campaign_id"], "1");
        assert_eq!(calls[0].signature.as_deref(), Some("s1"));
        assert_eq!(calls[1].name, "list_campaigns");
        assert_ne!(calls[0].id, calls[1].id);
    }

    #[test]
    fn parses_text_and_skips_thoughts() {
        let parsed = parse_response(response(json!({
            "candidates": [{"content": {"parts": [
                {"text": "thinking...", "thought": true},
                {"text": "Your campaign "},
                {"text": "is live."}
            ]}}]
        })))
        .unwrap();
        assert_eq!(parsed, ModelResponse::Text("Your campaign is live.".into()));
    }

    #[test]
    fn missing_candidates_is_empty() {
        let parsed = parse_response(response(json!({
            "promptFeedback": {"blockReason": "SAFETY"}
        })))
        .unwrap();
        assert_eq!(parsed, ModelResponse::Empty);
        let parsed = parse_response(response(json!({"candidates": [{"content": {"parts": [{"text": "  "}]}}]}))).unwrap();
        assert_eq!(parsed, ModelResponse::Empty);
    }

    #[test]
    fn error_body_is_an_error() {
        assert!(parse_response(response(json!({"error": {"message": "quota"}}))).is_err());
    }

    #[tokio::test]
    async fn sends_key_in_header_not_url() {
        type Seen = Arc<Mutex<Option<(String, Option<String>, Value)>>>;
        let seen: Seen = Arc::default();

        async fn handler(
            State(seen): State<Seen>,
            uri: Uri,
            headers: HeaderMap,
            Json(body): Json<Value>,
        ) -> Json<Value> {
            let key = headers
                .get("x-goog-api-key")
                .and_then(|v| v.to_str().ok())
                .map(str::to_string);
            *seen.lock().unwrap() = Some((uri.to_string(), key, body));
            Json(json!({"candidates": [{"content": {"parts": [{"text": "hello"}]}}]}))
        }

        let app = Router::new()
            .route("/models/:call", post(handler))
            .with_state(seen.clone());
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = GeminiClient::new("test-key", "gemini-test", Duration::from_secs(5))
            .unwrap()
            .with_api_base(format!("http://{}/models", addr));
        let out = client
            .generate("sys", &[Turn::user_text("hi")], &[])
            .await
            .unwrap();
        assert_eq!(out, ModelResponse::Text("hello".into()));

        let (uri, key, body) = seen.lock().unwrap().clone().unwrap();
        assert_eq!(uri, "/models/gemini-test:generateContent");
        assert!(!uri.contains("test-key"));
        assert_eq!(key.as_deref(), Some("test-key"));
        assert_eq!(body["contents"][0]["parts"][0]["text"], "hi");
    }

    #[tokio::test]
    async fn http_failure_is_an_error() {
        let app = Router::new().route(
            "/models/:call",
            post(|| async { (axum::http::StatusCode::TOO_MANY_REQUESTS, "slow down") }),
        );
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        let client = GeminiClient::new("k", "m", Duration::from_secs(5))
            .unwrap()
            .with_api_base(format!("http://{}/models", addr));
        let err = client.generate("sys", &[], &[]).await.unwrap_err();
        assert!(err.to_string().contains("429"));
    }
}
