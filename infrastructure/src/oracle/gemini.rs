//! Gemini `generateContent` oracle adapter

use super::types::{GenerateRequest, GenerateResponse, GenerationConfig, error_message};
use crate::config::FileOracleConfig;
use async_trait::async_trait;
use expense_application::ports::oracle::{Oracle, OracleError};
use std::time::Duration;
use tracing::{debug, warn};

/// Oracle backed by the Gemini REST API.
pub struct GeminiOracle {
    client: reqwest::Client,
    endpoint: String,
    api_key: String,
    generation: GenerationConfig,
}

impl GeminiOracle {
    /// Build a client from `[oracle]` configuration.
    ///
    /// Fails with [`OracleError::NotConfigured`] when no API key is set.
    pub fn new(config: &FileOracleConfig) -> Result<Self, OracleError> {
        let api_key = config
            .api_key()
            .ok_or_else(|| OracleError::NotConfigured("oracle.api_key is not set".into()))?
            .to_string();

        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| OracleError::NotConfigured(format!("HTTP client: {}", e)))?;

        Ok(Self {
            client,
            endpoint: format!(
                "{}/models/{}:generateContent",
                config.base_url.trim_end_matches('/'),
                config.model
            ),
            api_key,
            generation: GenerationConfig {
                temperature: config.temperature,
                max_output_tokens: config.max_output_tokens,
            },
        })
    }

    async fn generate(&self, request: &GenerateRequest) -> Result<String, OracleError> {
        let response = self
            .client
            .post(&self.endpoint)
            .query(&[("key", self.api_key.as_str())])
            .json(request)
            .send()
            .await
            .map_err(|e| {
                if e.is_timeout() {
                    OracleError::Timeout
                } else {
                    OracleError::ConnectionError(e.to_string())
                }
            })?;

        let status = response.status();
        let body = response
            .text()
            .await
            .map_err(|e| OracleError::ConnectionError(e.to_string()))?;

        if !status.is_success() {
            warn!("Gemini request failed with status {}", status.as_u16());
            return Err(OracleError::RequestFailed {
                status: status.as_u16(),
                message: error_message(&body),
            });
        }

        let parsed: GenerateResponse = serde_json::from_str(&body)
            .map_err(|e| OracleError::InvalidResponse(e.to_string()))?;
        let text = parsed.into_text()?;
        debug!("Gemini answered with {} chars", text.len());
        Ok(text)
    }
}

#[async_trait]
impl Oracle for GeminiOracle {
    async fn call(&self, prompt: &str) -> Result<String, OracleError> {
        self.generate(&GenerateRequest::text(prompt, self.generation.clone()))
            .await
    }

    async fn call_with_image(
        &self,
        prompt: &str,
        image: &[u8],
        mime_type: &str,
    ) -> Result<String, OracleError> {
        self.generate(&GenerateRequest::with_image(
            prompt,
            image,
            mime_type,
            self.generation.clone(),
        ))
        .await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_requires_api_key() {
        let config = FileOracleConfig::default();
        assert!(matches!(
            GeminiOracle::new(&config),
            Err(OracleError::NotConfigured(_))
        ));
    }

    #[test]
    fn test_endpoint_from_config() {
        let config = FileOracleConfig {
            api_key: Some("k".into()),
            base_url: "http://localhost:9/v1/".into(),
            model: "gemini-test".into(),
            ..Default::default()
        };
        let oracle = GeminiOracle::new(&config).unwrap();
        assert_eq!(oracle.endpoint, "http://localhost:9/v1/models/gemini-test:generateContent");
    }
}
