//! Oracle configuration from TOML (`[oracle]` section)

use serde::{Deserialize, Serialize};

pub const DEFAULT_BASE_URL: &str = "https://generativelanguage.googleapis.com/v1beta";

/// Raw oracle configuration from TOML
///
/// # Example
///
/// ```toml
/// [oracle]
/// api_key = "..."                # or EXPENSE_ORACLE__API_KEY
/// model = "gemini-1.5-flash"
/// temperature = 0.1
/// max_output_tokens = 2048
/// timeout_secs = 60
/// image_mime_type = "image/jpeg" # sent when the format is not recognized
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct FileOracleConfig {
    pub api_key: Option<String>,
    pub model: String,
    pub base_url: String,
    pub temperature: f32,
    pub max_output_tokens: u32,
    pub timeout_secs: u64,
    pub image_mime_type: String,
}

impl Default for FileOracleConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-1.5-flash".to_string(),
            base_url: DEFAULT_BASE_URL.to_string(),
            temperature: 0.1,
            max_output_tokens: 2048,
            timeout_secs: 60,
            image_mime_type: "image/jpeg".to_string(),
        }
    }
}

impl FileOracleConfig {
    /// API key when one is set and non-blank.
    pub fn api_key(&self) -> Option<&str> {
        self.api_key.as_deref().filter(|k| !k.trim().is_empty())
    }
}
