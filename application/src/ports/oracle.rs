//! Oracle port
//!
//! Defines the interface to the generative text/vision service the agents
//! consult for planning, routing and extraction.

use async_trait::async_trait;
use thiserror::Error;

/// Errors that can occur during oracle calls
#[derive(Error, Debug, Clone, PartialEq)]
pub enum OracleError {
    #[error("Connection error: {0}")]
    ConnectionError(String),

    #[error("Request failed with status {status}: {message}")]
    RequestFailed { status: u16, message: String },

    #[error("Empty response")]
    EmptyResponse,

    /// The service answered with its textual error marker
    #[error("Error response: {0}")]
    ErrorResponse(String),

    #[error("Invalid response: {0}")]
    InvalidResponse(String),

    #[error("Not configured: {0}")]
    NotConfigured(String),

    #[error("Timeout")]
    Timeout,
}

/// Opaque text-in/text-out (or text+image-in/text-out) service.
///
/// Implementations (adapters) live in the infrastructure layer.
#[async_trait]
pub trait Oracle: Send + Sync {
    /// Send a text prompt and return the answer text.
    async fn call(&self, prompt: &str) -> Result<String, OracleError>;

    /// Send a prompt together with an image.
    async fn call_with_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, OracleError>;
}

/// Map raw answer text onto the typed failure channel.
///
/// Blank text and text starting with `Error` are failures.
pub fn interpret_response(text: String) -> Result<String, OracleError> {
    let trimmed = text.trim();
    if trimmed.is_empty() {
        Err(OracleError::EmptyResponse)
    } else if trimmed.starts_with("Error") {
        Err(OracleError::ErrorResponse(trimmed.to_string()))
    } else {
        Ok(text)
    }
}

/// Oracle used when no service is configured; every call fails.
pub struct UnavailableOracle {
    reason: String,
}

impl UnavailableOracle {
    pub fn new(reason: impl Into<String>) -> Self {
        Self {
            reason: reason.into(),
        }
    }
}

#[async_trait]
impl Oracle for UnavailableOracle {
    async fn call(&self, _prompt: &str) -> Result<String, OracleError> {
        Err(OracleError::NotConfigured(self.reason.clone()))
    }

    async fn call_with_image(
        &self,
        _prompt: &str,
        _image: &[u8],
        _mime_type: &str,
    ) -> Result<String, OracleError> {
        Err(OracleError::NotConfigured(self.reason.clone()))
    }
}
