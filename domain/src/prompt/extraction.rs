//! Prompt templates for expense extraction

/// Templates used by the extractor tools
pub struct ExtractionPromptTemplate;

impl ExtractionPromptTemplate {
    /// Prompt sent alongside a receipt image.
    pub fn receipt() -> &'static str {
        r#"Analyze this grocery receipt and extract each item in JSON format:

{
  "store": "Store name from receipt",
  "date": "Receipt date (DD-MM-YYYY or any format visible)",
  "items": [
    {
      "name": "Complete item name as written on receipt",
      "quantity": "1",
      "unit": "kg/pcs/g/liters",
      "total_price": 45.50
    }
  ],
  "subtotal": 105.50,
  "total": 110.78
}

Instructions:
- Extract EVERY item exactly as written on the receipt
- Look for the receipt date, usually at the top or bottom
- "total_price" is the total amount paid for that line, not the per-unit price
- Example: if "Grapes-500g" costs 60, total_price is 60.0 for the whole 500g
- Example: if "Lime-5pcs" costs 30, total_price is 30.0 for all 5 pieces
- If the quantity is not clear, assume 1 and use "pcs" as unit
- If the date is not visible, use "N/A"
- Prices are plain numbers without currency symbols
- Return ONLY valid JSON"#
    }

    /// Prompt extracting items from free text.
    pub fn text_expense(text: &str) -> String {
        format!(
            r#"Extract expense information from this text and format it as JSON:

Text: "{text}"

{{
  "store": "Store name if mentioned, otherwise 'Manual Entry'",
  "items": [
    {{
      "name": "Complete item name",
      "quantity": "1",
      "unit": "kg/pcs/g/liters",
      "total_price": 60.0
    }}
  ],
  "total": 130.0
}}

Instructions:
- Extract all items with their prices
- Pick units that fit: kg for produce, pcs for countable items, g/ml for small quantities
- "total_price" is the total amount spent on that item, not the per-unit price
- Example: "Apples 2kg 120" gives total_price 120.0 for the whole 2kg
- Example: "5 oranges 50" gives total_price 50.0 for all 5 oranges
- Prices are plain numbers (drop currency symbols and "Rs")
- Return ONLY valid JSON"#
        )
    }
}
