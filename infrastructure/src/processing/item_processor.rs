//! Item name cleanup and package size extraction.
//!
//! Receipt lines look like `BB VE FR DRAKSHE-500g` or
//! `SUNL TGHT 150GRAM-1pcs`: a store prefix, the product, then a package
//! size. Sizes come in kilograms, grams or pieces.

use expense_domain::{ExpenseItem, ProcessedItem};
use regex::Regex;
use std::sync::LazyLock;

fn pattern(re: &str) -> Regex {
    Regex::new(re).expect("valid item pattern")
}

static STORE_PREFIX: LazyLock<Regex> = LazyLock::new(|| pattern(r"^[A-Z]{2,4}\s+(VE\s+)?"));
static SIZE_SUFFIX: LazyLock<Regex> = LazyLock::new(|| pattern(r"-\d+[a-zA-Z]+$"));
static COMPOUND_SUFFIX: LazyLock<Regex> = LazyLock::new(|| pattern(r"\d+[A-Z]+-\d+[a-z]+$"));
static FRESH_MARKER: LazyLock<Regex> = LazyLock::new(|| pattern(r"\bFR\s+"));

static KG_SIZE: LazyLock<Regex> = LazyLock::new(|| pattern(r"-(\d+(?:\.\d+)?)kg"));
static GRAM_SIZE: LazyLock<Regex> = LazyLock::new(|| pattern(r"-(\d+)g"));
static GRAM_PACK_SIZE: LazyLock<Regex> = LazyLock::new(|| pattern(r"(\d+)GRAM-(\d+)pcs"));
static PIECE_SIZE: LazyLock<Regex> = LazyLock::new(|| pattern(r"-(\d+)pcs"));

/// Receipt abbreviations that stand for a whole product name.
const KNOWN_PRODUCTS: [(&str, &str); 4] = [
    ("DRAKSHE", "Grapes"),
    ("KALINGAN", "Black Grapes"),
    ("LIME", "Lime"),
    ("TGHT", "Sunlight Soap"),
];

/// Uppercase the first letter of every alphabetic run, lowercase the rest.
fn title_case(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    let mut previous_alpha = false;
    for c in text.chars() {
        if c.is_alphabetic() {
            if previous_alpha {
                out.extend(c.to_lowercase());
            } else {
                out.extend(c.to_uppercase());
            }
            previous_alpha = true;
        } else {
            out.push(c);
            previous_alpha = false;
        }
    }
    out
}

/// Readable product name for a receipt line.
///
/// Falls back to the original text when cleanup leaves nothing.
pub fn clean_item_name(original: &str) -> String {
    let name = STORE_PREFIX.replace(original, "");
    let name = SIZE_SUFFIX.replace(&name, "");
    let name = COMPOUND_SUFFIX.replace(&name, "");
    let name = FRESH_MARKER.replace_all(&name, "");
    let name = title_case(&name).trim().to_string();

    let upper = name.to_uppercase();
    if let Some((_, product)) = KNOWN_PRODUCTS.iter().find(|(code, _)| upper.contains(code)) {
        return product.to_string();
    }

    if name.is_empty() {
        original.to_string()
    } else {
        name
    }
}

fn grams(total: u64) -> String {
    if total >= 1000 {
        format!("{}kg", total as f64 / 1000.0)
    } else {
        format!("{}g", total)
    }
}

/// Pieces bought, size of one package, and total quantity bought.
pub fn package_info(item: &ExpenseItem) -> (u32, String, String) {
    let packages = item.packages().unwrap_or(1);
    let name = item.name.as_str();

    if let Some(caps) = KG_SIZE.captures(name)
        && let Ok(kg) = caps[1].parse::<f64>()
    {
        return (packages, format!("{}kg", kg), format!("{}kg", kg * packages as f64));
    }
    if let Some(caps) = GRAM_SIZE
        .captures(name)
        .or_else(|| GRAM_PACK_SIZE.captures(name))
        && let Ok(per_package) = caps[1].parse::<u64>()
    {
        return (
            packages,
            format!("{}g", per_package),
            grams(per_package * packages as u64),
        );
    }
    if let Some(caps) = PIECE_SIZE.captures(name)
        && let Ok(per_package) = caps[1].parse::<u64>()
    {
        return (
            packages,
            format!("{}pcs", per_package),
            format!("{}pcs", per_package * packages as u64),
        );
    }
    (packages, "1pcs".to_string(), format!("{}pcs", packages))
}

fn round_cents(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

/// Ledger row for one item bought on `date`.
pub fn process_item(item: &ExpenseItem, date: &str) -> ProcessedItem {
    let (pieces, unit_size, total_quantity) = package_info(item);
    let per_package = if pieces > 0 {
        item.total_price / pieces as f64
    } else {
        item.total_price
    };

    ProcessedItem {
        date: date.to_string(),
        original_name: item.name.clone(),
        clean_name: clean_item_name(&item.name),
        pieces,
        unit_size,
        total_quantity,
        price_per_unit: round_cents(per_package),
        total_value: round_cents(item.total_price),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clean_item_name() {
        assert_eq!(clean_item_name("BB VE FR DRAKSHE-500g"), "Grapes");
        assert_eq!(clean_item_name("SUNL TGHT 150GRAM-1pcs"), "Sunlight Soap");
        assert_eq!(clean_item_name("AMUL TAAZA MILK-1pcs"), "Taaza Milk");
        assert_eq!(clean_item_name("Brown bread"), "Brown Bread");
        assert_eq!(clean_item_name("-5pcs"), "-5pcs");
    }

    #[test]
    fn test_title_case_follows_word_starts() {
        assert_eq!(title_case("o'neil 50gm"), "O'Neil 50Gm");
    }

    #[test]
    fn test_package_info_by_weight() {
        let kg = ExpenseItem::new("BB ONION-1.5kg", "2", 90.0);
        assert_eq!(package_info(&kg), (2, "1.5kg".into(), "3kg".into()));

        let grams = ExpenseItem::new("BB VE FR DRAKSHE-500g", "3", 150.0);
        assert_eq!(package_info(&grams), (3, "500g".into(), "1.5kg".into()));

        let small = ExpenseItem::new("CHILLI-100g", "1", 10.0);
        assert_eq!(package_info(&small), (1, "100g".into(), "100g".into()));

        let pack = ExpenseItem::new("SUNL TGHT 150GRAM-1pcs", "2", 80.0);
        assert_eq!(package_info(&pack), (2, "150g".into(), "300g".into()));
    }

    #[test]
    fn test_package_info_by_pieces() {
        let eggs = ExpenseItem::new("EGGS-6pcs", "2", 120.0);
        assert_eq!(package_info(&eggs), (2, "6pcs".into(), "12pcs".into()));

        let loose = ExpenseItem::new("Milk", "1.5", 60.0);
        assert_eq!(package_info(&loose), (1, "1pcs".into(), "1pcs".into()));
    }

    #[test]
    fn test_process_item_prices_per_package() {
        let item = ExpenseItem::new("EGGS-6pcs", "3", 100.0);
        let row = process_item(&item, "2024-06-18");
        assert_eq!(row.clean_name, "Eggs");
        assert_eq!(row.pieces, 3);
        assert_eq!(row.price_per_unit, 33.33);
        assert_eq!(row.total_value, 100.0);
        assert_eq!(row.date, "2024-06-18");
    }
}
