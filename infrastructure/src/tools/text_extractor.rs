//! Text expense extraction.

use super::normalized_expense;
use async_trait::async_trait;
use expense_application::ports::oracle::{Oracle, interpret_response};
use expense_application::ports::tool::{Tool, ToolError, ToolParams, ToolRole, required_str};
use expense_domain::{ExtractionPromptTemplate, TEXT_KEY};
use std::sync::Arc;
use tracing::info;

pub const TEXT_TOOL: &str = "extract_text_expense";

/// Turns a note like "Milk ₹60, Bread ₹40" into expense JSON via the oracle.
pub struct TextExpenseExtractor {
    oracle: Arc<dyn Oracle>,
}

impl TextExpenseExtractor {
    pub fn new(oracle: Arc<dyn Oracle>) -> Self {
        Self { oracle }
    }
}

#[async_trait]
impl Tool for TextExpenseExtractor {
    fn name(&self) -> &str {
        TEXT_TOOL
    }

    fn description(&self) -> &str {
        "Extract expense information from natural language text"
    }

    fn role(&self) -> ToolRole {
        ToolRole::TextExtractor
    }

    async fn execute(&self, params: &ToolParams) -> Result<String, ToolError> {
        let text = required_str(params, TEXT_KEY)?;
        let response = self
            .oracle
            .call(&ExtractionPromptTemplate::text_expense(text))
            .await
            .and_then(interpret_response)
            .map_err(|e| ToolError::execution_failed(e.to_string()))?;

        let (data, json) = normalized_expense(&response)?;
        info!("Text processed: {} items found", data.item_count());
        Ok(json)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use expense_application::ports::oracle::OracleError;

    struct Fixed(Result<&'static str, OracleError>);

    #[async_trait]
    impl Oracle for Fixed {
        async fn call(&self, prompt: &str) -> Result<String, OracleError> {
            assert!(prompt.contains("Milk 60"));
            self.0.clone().map(str::to_string)
        }

        async fn call_with_image(&self, _: &str, _: &[u8], _: &str) -> Result<String, OracleError> {
            unreachable!()
        }
    }

    fn params(text: &str) -> ToolParams {
        let mut p = ToolParams::new();
        p.insert(TEXT_KEY.into(), text.into());
        p
    }

    #[tokio::test]
    async fn test_extracts_compact_json() {
        let tool = TextExpenseExtractor::new(Arc::new(Fixed(Ok(
            "```json\n{\"items\": [{\"name\": \"Milk\", \"quantity\": 1, \"total_price\": \"60\"}]}\n```",
        ))));

        let output = tool.execute(&params("Milk 60")).await.unwrap();

        let value: serde_json::Value = serde_json::from_str(&output).unwrap();
        assert_eq!(value["items"][0]["name"], "Milk");
        assert_eq!(value["items"][0]["quantity"], "1");
        assert_eq!(value["items"][0]["total_price"], 60.0);
        assert!(!output.contains('\n'));
    }

    #[tokio::test]
    async fn test_missing_text() {
        let tool = TextExpenseExtractor::new(Arc::new(Fixed(Ok("{}"))));
        let err = tool.execute(&ToolParams::new()).await.unwrap_err();
        assert_eq!(err.code, "INVALID_ARGUMENT");
    }

    #[tokio::test]
    async fn test_rejects_answers_without_items() {
        let tool = TextExpenseExtractor::new(Arc::new(Fixed(Ok(r#"{"store": "x", "items": []}"#))));
        let err = tool.execute(&params("Milk 60")).await.unwrap_err();
        assert!(err.message.contains("no items"));

        let tool = TextExpenseExtractor::new(Arc::new(Fixed(Err(OracleError::Timeout))));
        let err = tool.execute(&params("Milk 60")).await.unwrap_err();
        assert_eq!(err.code, "EXECUTION_FAILED");
    }
}
