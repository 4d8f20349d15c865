//! Expense data model
//!
//! [`ExpenseData`] is what extractor tools produce and the ledger consumes.
//! Oracle output is loose about types, so quantities and prices accept both
//! numbers and numeric strings.

use crate::util::extract_json_object;
use serde::{Deserialize, Deserializer, Serialize};
use serde_json::Value;
use thiserror::Error;

/// Why extracted expense data was rejected.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum ExpenseError {
    #[error("No JSON object found in extracted data")]
    NoJson,

    #[error("Malformed expense data: {0}")]
    Malformed(String),

    #[error("Expense data has no items")]
    NoItems,

    #[error("Item {0} has no name")]
    UnnamedItem(usize),
}

fn default_quantity() -> String {
    "1".to_string()
}

fn default_unit() -> String {
    "pcs".to_string()
}

fn default_store() -> String {
    "Unknown".to_string()
}

fn lenient_string<'de, D>(deserializer: D) -> Result<String, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(s) => s,
        Value::Number(n) => n.to_string(),
        Value::Null => default_quantity(),
        other => other.to_string(),
    })
}

fn parse_amount(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s
            .trim()
            .trim_start_matches(|c: char| !c.is_ascii_digit() && c != '-' && c != '.')
            .replace(',', "")
            .parse()
            .ok(),
        _ => None,
    }
}

fn lenient_amount<'de, D>(deserializer: D) -> Result<f64, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_amount(&Value::deserialize(deserializer)?).unwrap_or(0.0))
}

fn lenient_optional_amount<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(parse_amount(&Value::deserialize(deserializer)?))
}

/// One purchased line item.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseItem {
    #[serde(default)]
    pub name: String,
    #[serde(default = "default_quantity", deserialize_with = "lenient_string")]
    pub quantity: String,
    #[serde(default = "default_unit")]
    pub unit: String,
    #[serde(default, deserialize_with = "lenient_amount")]
    pub total_price: f64,
}

impl ExpenseItem {
    pub fn new(name: impl Into<String>, quantity: impl Into<String>, total_price: f64) -> Self {
        Self {
            name: name.into(),
            quantity: quantity.into(),
            unit: default_unit(),
            total_price,
        }
    }

    /// Number of packages bought, when the quantity is a whole number.
    pub fn packages(&self) -> Option<u32> {
        self.quantity.trim().parse().ok()
    }

    /// Price of a single unit; the total when the quantity is not numeric.
    pub fn unit_price(&self) -> f64 {
        match self.quantity.trim().parse::<f64>() {
            Ok(qty) if qty > 0.0 => self.total_price / qty,
            _ => self.total_price,
        }
    }
}

/// A whole receipt or text expense.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ExpenseData {
    #[serde(default = "default_store")]
    pub store: String,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub items: Vec<ExpenseItem>,
    #[serde(default, deserialize_with = "lenient_optional_amount")]
    pub subtotal: Option<f64>,
    #[serde(default, deserialize_with = "lenient_optional_amount")]
    pub total: Option<f64>,
    #[serde(default)]
    pub payment_method: Option<String>,
}

impl Default for ExpenseData {
    fn default() -> Self {
        Self {
            store: default_store(),
            date: None,
            items: Vec::new(),
            subtotal: None,
            total: None,
            payment_method: None,
        }
    }
}

impl ExpenseData {
    /// Decode the JSON object embedded in tool or oracle text.
    pub fn from_text(text: &str) -> Result<Self, ExpenseError> {
        let obj = extract_json_object(text).ok_or(ExpenseError::NoJson)?;
        Self::from_value(Value::Object(obj))
    }

    pub fn from_value(value: Value) -> Result<Self, ExpenseError> {
        serde_json::from_value(value).map_err(|e| ExpenseError::Malformed(e.to_string()))
    }

    /// Explicit total if present, else the sum of item prices.
    pub fn total_amount(&self) -> f64 {
        self.total
            .unwrap_or_else(|| self.items.iter().map(|i| i.total_price).sum())
    }

    pub fn item_count(&self) -> usize {
        self.items.len()
    }

    /// At least one item carries a positive price.
    pub fn has_valid_items(&self) -> bool {
        self.items.iter().any(|i| i.total_price > 0.0)
    }

    /// Items present and every item named.
    pub fn validate(&self) -> Result<(), ExpenseError> {
        if self.items.is_empty() {
            return Err(ExpenseError::NoItems);
        }
        match self.items.iter().position(|i| i.name.trim().is_empty()) {
            Some(index) => Err(ExpenseError::UnnamedItem(index)),
            None => Ok(()),
        }
    }

    /// Display date, `Unknown` when the extractor found none.
    pub fn date_or_unknown(&self) -> &str {
        self.date.as_deref().filter(|d| !d.is_empty()).unwrap_or("Unknown")
    }
}

/// A ledger row derived from one [`ExpenseItem`].
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProcessedItem {
    pub date: String,
    pub original_name: String,
    pub clean_name: String,
    pub pieces: u32,
    pub unit_size: String,
    pub total_quantity: String,
    /// Price of one package, rounded to cents
    pub price_per_unit: f64,
    pub total_value: f64,
}

impl ProcessedItem {
    pub const HEADERS: [&'static str; 8] = [
        "Date",
        "Original Item Name",
        "Item Name",
        "Pieces",
        "Unit Size",
        "Total Quantity",
        "Price",
        "Value",
    ];

    pub fn to_row(&self) -> [String; 8] {
        [
            self.date.clone(),
            self.original_name.clone(),
            self.clean_name.clone(),
            self.pieces.to_string(),
            self.unit_size.clone(),
            self.total_quantity.clone(),
            self.price_per_unit.to_string(),
            self.total_value.to_string(),
        ]
    }
}
