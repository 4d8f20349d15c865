//! Receipt image extraction.

use super::normalized_expense;
use async_trait::async_trait;
use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use expense_application::ports::oracle::{Oracle, interpret_response};
use expense_application::ports::tool::{Tool, ToolError, ToolParams, ToolRole, required_str};
use expense_domain::{ExtractionPromptTemplate, IMAGE_DATA_KEY};
use std::sync::Arc;
use tracing::info;

pub const RECEIPT_TOOL: &str = "process_receipt";

pub const DEFAULT_MIME_TYPE: &str = "image/jpeg";

/// MIME type from the leading magic bytes.
fn sniff_mime_type(bytes: &[u8]) -> Option<&'static str> {
    match bytes {
        [0x89, b'P', b'N', b'G', ..] => Some("image/png"),
        [0xFF, 0xD8, 0xFF, ..] => Some("image/jpeg"),
        [b'G', b'I', b'F', b'8', ..] => Some("image/gif"),
        [b'R', b'I', b'F', b'F', _, _, _, _, b'W', b'E', b'B', b'P', ..] => Some("image/webp"),
        _ => None,
    }
}

/// Sends a base64 receipt photo to the oracle's vision endpoint.
pub struct ReceiptExtractor {
    oracle: Arc<dyn Oracle>,
    default_mime_type: String,
}

impl ReceiptExtractor {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self {
            oracle,
            default_mime_type: DEFAULT_MIME_TYPE.to_string(),
        }
    }

    /// MIME type sent when the image format is not recognized.
    pub fn with_default_mime_type(mut self, mime_type: impl Into<String>) -> Self {
        self.default_mime_type = mime_type.into();
        self
    }
}

#[async_trait]
impl Tool for ReceiptExtractor {
    fn name(&self) -> &str {
        RECEIPT_TOOL
    }

    fn description(&self) -> &str {
        "Process receipt images to extract expense data"
    }

    fn role(&self) -> ToolRole {
        ToolRole::ImageExtractor
    }

    async fn execute(&self, params: &ToolParams) -> Result<String, ToolError> {
        let encoded = required_str(params, IMAGE_DATA_KEY)?;
        let image = STANDARD
            .decode(encoded.trim())
            .map_err(|e| ToolError::invalid_argument(format!("Failed to decode image: {}", e)))?;
        info!("Processing receipt image of {} bytes", image.len());

        let mime_type = sniff_mime_type(&image).unwrap_or(self.default_mime_type.as_str());
        let response = self
            .oracle
            .call_with_image(ExtractionPromptTemplate::receipt(), &image, mime_type)
            .await
            .and_then(interpret_response)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;

        let (data, json) = normalized_expense(&response)?;
        info!("Receipt processed: {} items found", data.item_count());
        Ok(json)
    }
}
