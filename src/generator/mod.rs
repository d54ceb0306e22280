//! Question generation service
//!
//! The rendered prompt is handed to a [`QuestionGenerator`], which returns the
//! generated text. [`AnthropicClient`] is the production implementation;
//! tests substitute their own.

mod anthropic;
pub mod config;

pub use anthropic::AnthropicClient;
pub use config::{ConfigError, GeneratorConfig};

use std::fmt;
use std::future::Future;

use thiserror::Error;

/// Errors from the generation service
#[derive(Error, Debug)]
pub enum GenerationError {
    #[error("request failed: {0}")]
    Http(#[from] reqwest::Error),

    #[error("service returned HTTP {status}: {body}")]
    Status { status: u16, body: String },

    #[error("unexpected response: {0}")]
    UnexpectedResponse(String),
}

/// Something that turns a prompt into generated text
pub trait QuestionGenerator {
    fn generate(
        &self,
        prompt: &str,
    ) -> impl Future<Output = Result<String, GenerationError>> + Send;
}

/// API credential; `Debug` never shows the secret
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    /// `None` for a blank key
    pub fn new(key: impl Into<String>) -> Option<Self> {
        let key = key.into();
        let trimmed = key.trim();
        if trimmed.is_empty() {
            None
        } else {
            Some(Self(trimmed.to_string()))
        }
    }

    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}
