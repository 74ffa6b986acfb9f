//! LLM provider integrations and configuration for certify.
//!
//! Implements the `LlmProvider` trait for Gemini and OpenAI-compatible
//! endpoints, plus a mock used by tests and offline setups.

pub mod config;
pub mod gemini;
mod http;
pub mod mock;
pub mod openai;

pub use certify_core::error::ProviderError;
pub use config::{create_provider, load_config, load_config_from, CertifyConfig, ProviderConfig};
