//! Configuration management for the assistant service.
//!
//! Configuration is read from environment variables:
//! - `GOOGLE_API_KEY` - Required. Credential for the Gemini API.
//! - `BACKEND_BASE_URL` - Required. Base URL of the business backend (e.g. `http://localhost:3001/api`).
//! - `BACKEND_API_TOKEN` - Optional. Bearer token forwarded to the backend.
//! - `MODEL` - Optional. Model identifier. Defaults to `gemini-2.5-flash`.
//! - `HOST` - Optional. Server host. Defaults to `0.0.0.0`.
//! - `PORT` - Optional. Server port. Defaults to `5001`.
//! - `MAX_ROUNDS` - Optional. Maximum model rounds per chat message. Defaults to `8`.
//! - `BACKEND_TIMEOUT_SECS` - Optional. Timeout for backend tool calls. Defaults to `30`.
//! - `LLM_TIMEOUT_SECS` - Optional. Timeout for model calls. Defaults to `120`.
//! - `MAX_SESSIONS` - Optional. Chat sessions kept in memory. Defaults to `1000`.
//! - `SESSION_IDLE_SECS` - Optional. Idle time before a session is dropped. Defaults to `3600`.

use std::fmt;
use std::str::FromStr;
use std::time::Duration;

use thiserror::Error;

pub const DEFAULT_MODEL: &str = "gemini-2.5-flash";
pub const DEFAULT_MAX_ROUNDS: usize = 8;
pub const DEFAULT_MAX_SESSIONS: u64 = 1000;
pub const DEFAULT_SESSION_IDLE: Duration = Duration::from_secs(3600);

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("Missing required environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid value for {0}: {1}")]
    InvalidValue(String, String),
}

/// Service configuration.
#[derive(Clone)]
pub struct Config {
    /// Gemini API key
    pub api_key: String,

    /// Model identifier used for every round
    pub model: String,

    /// Business backend base URL, without a trailing slash
    pub backend_base_url: String,

    /// Bearer token for the backend's protected routes
    pub backend_token: Option<String>,

    /// Server host
    pub host: String,

    /// Server port
    pub port: u16,

    /// Upper bound on model rounds within one chat call
    pub max_rounds: usize,

    pub backend_timeout: Duration,

    pub llm_timeout: Duration,

    /// Sessions kept before the least recently used are evicted
    pub max_sessions: u64,

    pub session_idle: Duration,
}

// Hand-written so secrets stay out of logs.
impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("api_key", &"<redacted>")
            .field("model", &self.model)
            .field("backend_base_url", &self.backend_base_url)
            .field(
                "backend_token",
                &self.backend_token.as_ref().map(|_| "<redacted>"),
            )
            .field("host", &self.host)
            .field("port", &self.port)
            .field("max_rounds", &self.max_rounds)
            .field("backend_timeout", &self.backend_timeout)
            .field("llm_timeout", &self.llm_timeout)
            .field("max_sessions", &self.max_sessions)
            .field("session_idle", &self.session_idle)
            .finish()
    }
}

impl Config {
    /// Load configuration from environment variables.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if `GOOGLE_API_KEY` or
    /// `BACKEND_BASE_URL` is unset or blank, and `ConfigError::InvalidValue`
    /// for values that fail to parse.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build configuration from an arbitrary variable source.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let non_blank = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = non_blank("GOOGLE_API_KEY")
            .ok_or_else(|| ConfigError::MissingEnvVar("GOOGLE_API_KEY".to_string()))?;

        let backend_base_url = non_blank("BACKEND_BASE_URL")
            .ok_or_else(|| ConfigError::MissingEnvVar("BACKEND_BASE_URL".to_string()))?;
        let backend_base_url = normalize_base_url(&backend_base_url)
            .map_err(|e| ConfigError::InvalidValue("BACKEND_BASE_URL".to_string(), e))?;

        let model = non_blank("MODEL").unwrap_or_else(|| DEFAULT_MODEL.to_string());
        let host = non_blank("HOST").unwrap_or_else(|| "0.0.0.0".to_string());
        let port = parse_or("PORT", non_blank("PORT"), 5001u16)?;

        let max_rounds = parse_or("MAX_ROUNDS", non_blank("MAX_ROUNDS"), DEFAULT_MAX_ROUNDS)?;
        if max_rounds == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_ROUNDS".to_string(),
                "must be at least 1".to_string(),
            ));
        }

        let backend_timeout = Duration::from_secs(parse_or(
            "BACKEND_TIMEOUT_SECS",
            non_blank("BACKEND_TIMEOUT_SECS"),
            30u64,
        )?);
        let llm_timeout = Duration::from_secs(parse_or(
            "LLM_TIMEOUT_SECS",
            non_blank("LLM_TIMEOUT_SECS"),
            120u64,
        )?);

        let max_sessions = parse_or(
            "MAX_SESSIONS",
            non_blank("MAX_SESSIONS"),
            DEFAULT_MAX_SESSIONS,
        )?;
        if max_sessions == 0 {
            return Err(ConfigError::InvalidValue(
                "MAX_SESSIONS".to_string(),
                "must be at least 1".to_string(),
            ));
        }
        let session_idle = Duration::from_secs(parse_or(
            "SESSION_IDLE_SECS",
            non_blank("SESSION_IDLE_SECS"),
            DEFAULT_SESSION_IDLE.as_secs(),
        )?);

        Ok(Self {
            api_key,
            model,
            backend_base_url,
            backend_token: non_blank("BACKEND_API_TOKEN"),
            host,
            port,
            max_rounds,
            backend_timeout,
            llm_timeout,
            max_sessions,
            session_idle,
        })
    }

    /// Create a config with default values (useful for testing).
    pub fn new(api_key: String, backend_base_url: String) -> Self {
        Self {
            api_key,
            model: DEFAULT_MODEL.to_string(),
            backend_base_url: backend_base_url.trim_end_matches('/').to_string(),
            backend_token: None,
            host: "127.0.0.1".to_string(),
            port: 5001,
            max_rounds: DEFAULT_MAX_ROUNDS,
            backend_timeout: Duration::from_secs(30),
            llm_timeout: Duration::from_secs(120),
            max_sessions: DEFAULT_MAX_SESSIONS,
            session_idle: DEFAULT_SESSION_IDLE,
        }
    }
}

fn parse_or<T>(name: &str, raw: Option<String>, default: T) -> Result<T, ConfigError>
where
    T: FromStr,
    T::Err: fmt::Display,
{
    match raw {
        Some(v) => v
            .trim()
            .parse()
            .map_err(|e| ConfigError::InvalidValue(name.to_string(), format!("{}", e))),
        None => Ok(default),
    }
}

/// Validate an absolute http(s) URL and drop any trailing slash.
fn normalize_base_url(raw: &str) -> Result<String, String> {
    let parsed = url::Url::parse(raw.trim()).map_err(|e| e.to_string())?;
    match parsed.scheme() {
        "http" | "https" => Ok(raw.trim().trim_end_matches('/').to_string()),
        other => Err(format!("unsupported scheme: {}", other)),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn missing_api_key_fails_fast() {
        let err = Config::from_lookup(lookup_from(&[(
            "BACKEND_BASE_URL",
            "http://localhost:3001/api",
        )]))
        .unwrap_err();
        assert_eq!(err, ConfigError::MissingEnvVar("GOOGLE_API_KEY".to_string()));
    }

    #[test]
    fn blank_backend_url_counts_as_missing() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("BACKEND_BASE_URL", "   "),
        ]))
        .unwrap_err();
        assert_eq!(
            err,
            ConfigError::MissingEnvVar("BACKEND_BASE_URL".to_string())
        );
    }

    #[test]
    fn defaults_applied_and_trailing_slash_trimmed() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("BACKEND_BASE_URL", "http://localhost:3001/api/"),
        ]))
        .unwrap();
        assert_eq!(config.backend_base_url, "http://localhost:3001/api");
        assert_eq!(config.model, DEFAULT_MODEL);
        assert_eq!(config.port, 5001);
        assert_eq!(config.max_rounds, DEFAULT_MAX_ROUNDS);
        assert!(config.backend_token.is_none());
        assert_eq!(config.max_sessions, DEFAULT_MAX_SESSIONS);
        assert_eq!(config.session_idle, DEFAULT_SESSION_IDLE);
    }

    #[test]
    fn session_limits_read_from_env() {
        let config = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("BACKEND_BASE_URL", "http://localhost:3001/api"),
            ("MAX_SESSIONS", "25"),
            ("SESSION_IDLE_SECS", "90"),
        ]))
        .unwrap();
        assert_eq!(config.max_sessions, 25);
        assert_eq!(config.session_idle, Duration::from_secs(90));
    }

    #[test]
    fn zero_max_sessions_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("BACKEND_BASE_URL", "http://localhost:3001/api"),
            ("MAX_SESSIONS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "MAX_SESSIONS"));
    }

    #[test]
    fn zero_max_rounds_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("BACKEND_BASE_URL", "http://localhost:3001/api"),
            ("MAX_ROUNDS", "0"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "MAX_ROUNDS"));
    }

    #[test]
    fn non_http_backend_url_rejected() {
        let err = Config::from_lookup(lookup_from(&[
            ("GOOGLE_API_KEY", "k"),
            ("BACKEND_BASE_URL", "ftp://example.com"),
        ]))
        .unwrap_err();
        assert!(matches!(err, ConfigError::InvalidValue(name, _) if name == "BACKEND_BASE_URL"));
    }

    #[test]
    fn debug_output_redacts_secrets() {
        let mut config = Config::new("super-secret".to_string(), "http://x".to_string());
        config.backend_token = Some("token-secret".to_string());
        let rendered = format!("{:?}", config);
        assert!(!rendered.contains("super-secret"));
        assert!(!rendered.contains("token-secret"));
    }
}
