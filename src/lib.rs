//! # Affiliate AI
//!
//! A persona-routed assistant that turns natural-language requests into calls
//! against an affiliate-marketing business backend.
//!
//! This library provides:
//! - Keyword-based persona detection over a fixed persona registry
//! - A tool catalog filtered per persona, and an executor that maps tool
//!   calls onto backend REST endpoints
//! - A bounded conversation loop against a function-calling model (Gemini)
//! - An HTTP API with per-session conversations
//!
//! ## Example
//!
//! ```rust,ignore
//! use affiliate_ai::{agent::ChatSession, config::Config};
//!
//! let config = Config::from_env()?;
//! let mut session = ChatSession::from_config(&config)?;
//! let reply = session.chat("Create a new Instagram campaign called Summer Sale").await?;
//! println!("[{}] {}", reply.persona, reply.response);
//! ```

pub mod agent;
pub mod api;
pub mod config;
pub mod llm;
pub mod persona;
pub mod tools;

pub use config::Config;
