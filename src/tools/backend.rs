//! HTTP client for the business backend's REST API.

use std::time::Duration;

use reqwest::Method;
use serde_json::Value;

use super::ToolError;
use crate::config::Config;

/// Thin JSON client over the backend base URL.
///
/// Every failure is converted into an `UpstreamError` [`ToolError`]; nothing
/// is retried here.
#[derive(Clone)]
pub struct BackendClient {
    http: reqwest::Client,
    base_url: String,
    token: Option<String>,
}

impl BackendClient {
    pub fn new(
        base_url: impl Into<String>,
        token: Option<String>,
        timeout: Duration,
    ) -> anyhow::Result<Self> {
        let http = reqwest::Client::builder()
            .user_agent(concat!("affiliate-ai/", env!("CARGO_PKG_VERSION")))
            .timeout(timeout)
            .build()?;

        Ok(Self {
            http,
            base_url: base_url.into().trim_end_matches('/').to_string(),
            token,
        })
    }

    pub fn from_config(config: &Config) -> anyhow::Result<Self> {
        Self::new(
            config.backend_base_url.clone(),
            config.backend_token.clone(),
            config.backend_timeout,
        )
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub async fn get(&self, path: &str) -> Result<Value, ToolError> {
        self.send(Method::GET, path, None).await
    }

    pub async fn post(&self, path: &str, body: Value) -> Result<Value, ToolError> {
        self.send(Method::POST, path, Some(body)).await
    }

    pub async fn put(&self, path: &str, body: Value) -> Result<Value, ToolError> {
        self.send(Method::PUT, path, Some(body)).await
    }

    pub async fn delete(&self, path: &str) -> Result<Value, ToolError> {
        self.send(Method::DELETE, path, None).await
    }

    async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<Value>,
    ) -> Result<Value, ToolError> {
        let url = format!("{}{}", self.base_url, path);
        tracing::debug!(method = %method, path = %path, body = ?body, "Calling backend");

        let mut request = self.http.request(method.clone(), &url);
        if let Some(token) = &self.token {
            request = request.bearer_auth(token);
        }
        if let Some(body) = &body {
            request = request.json(body);
        }

        let response = request.send().await.map_err(|e| {
            let reason = if e.is_timeout() {
                "timed out"
            } else if e.is_connect() {
                "connection failed"
            } else {
                "request failed"
            };
            tracing::warn!(method = %method, path = %path, error = %e, "Backend {}", reason);
            ToolError::upstream(
                format!("{} {} {}: {}", method, path, reason, e.without_url()),
                None,
                None,
            )
        })?;

        let status = response.status();
        let text = response.text().await.map_err(|e| {
            ToolError::upstream(
                format!("Failed to read backend response: {}", e.without_url()),
                Some(status.as_u16()),
                None,
            )
        })?;

        if !status.is_success() {
            tracing::warn!(method = %method, path = %path, status = %status, "Backend returned an error");
            return Err(ToolError::upstream(
                format!("{} {} returned HTTP {}", method, path, status),
                Some(status.as_u16()),
                parse_body(&text),
            ));
        }

        tracing::debug!(method = %method, path = %path, status = %status, "Backend call succeeded");
        Ok(parse_body(&text).unwrap_or(Value::Null))
    }
}

/// Structured body if it parses as JSON, raw text otherwise, `None` when empty.
fn parse_body(text: &str) -> Option<Value> {
    if text.trim().is_empty() {
        return None;
    }
    Some(serde_json::from_str(text).unwrap_or_else(|_| Value::String(text.to_string())))
}

/// `/collection/{id}` with the id percent-encoded.
pub(crate) fn item_path(collection: &str, id: &str) -> String {
    format!("/{}/{}", collection, urlencoding::encode(id))
}
