//! Field parsing for listing text.
//!
//! Pure functions that pull name, price, size and stock count out of a
//! loosely structured text blob (one or more lines of rendered page text).

use crate::snapshot::{ProductRecord, DEFAULT_SIZE};
use lazy_static::lazy_static;
use log::debug;
use regex::Regex;
use thiserror::Error;

/// Category keywords that mark a line or block as whiskey related (lowercase)
pub const WHISKEY_KEYWORDS: [&str; 5] = ["whiskey", "whisky", "bourbon", "rye", "scotch"];

/// Lines at or above this many characters are descriptions, not names
pub const MAX_NAME_LEN: usize = 100;

lazy_static! {
    static ref PRICE_RE: Regex = Regex::new(r"\$[\d,]+\.?\d*").expect("price pattern");
    static ref SIZE_RE: Regex =
        Regex::new(r"(?i)\b\d+(?:\.\d+)?\s*(?:ml|l)\b").expect("size pattern");
    static ref STOCK_RE: Regex =
        Regex::new(r"(?i)(\d+)\s*(?:available|in stock|left|remaining)").expect("stock pattern");
    static ref RATING_RE: Regex = Regex::new(r"\s*\(\d+\)").expect("rating pattern");
}

/// A block whose fields could not be read
#[derive(Debug, Error, PartialEq, Eq)]
pub enum FieldError {
    #[error("stock count '{0}' is out of range")]
    StockCount(String),
}

/// Fields recovered from one text blob; absent fields carry their defaults
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ParsedFields {
    pub name: Option<String>,
    pub price: Option<String>,
    pub size: String,
    pub stock_count: Option<u32>,
}

impl ParsedFields {
    /// Convert to a record when both name and price were found
    pub fn into_record(self) -> Option<ProductRecord> {
        match (self.name, self.price) {
            (Some(name), Some(price)) => Some(ProductRecord {
                name,
                price: Some(price),
                size: self.size,
                stock_count: self.stock_count,
            }),
            _ => None,
        }
    }
}

/// Whether the text mentions any whiskey category keyword (case-insensitive)
pub fn contains_whiskey_keyword(text: &str) -> bool {
    let lower = text.to_lowercase();
    WHISKEY_KEYWORDS.iter().any(|kw| lower.contains(kw))
}

/// Parses a text blob into product fields.
///
/// Precedence per field:
/// - `price`: first `$` amount anywhere in the blob
/// - `size`: first `<digits>ML` / `<digits>L` within a line (case-insensitive), uppercased;
///   `750ML` if absent
/// - `stock_count`: first integer followed on the same line by "available", "in stock",
///   "left" or "remaining"
/// - `name`: first line under [`MAX_NAME_LEN`] chars that mentions a whiskey keyword,
///   with rating annotations like `(42)` and "Add to Cart" removed
pub fn parse_fields(text: &str) -> Result<ParsedFields, FieldError> {
    let price = PRICE_RE.find(text).map(|m| m.as_str().to_string());

    // Size and stock labels never span lines
    let size = text
        .lines()
        .find_map(|line| SIZE_RE.find(line))
        .map(|m| m.as_str().to_uppercase())
        .unwrap_or_else(|| DEFAULT_SIZE.to_string());

    let stock_count = match text.lines().find_map(|line| STOCK_RE.captures(line)) {
        Some(caps) => {
            let digits = &caps[1];
            Some(
                digits
                    .parse::<u32>()
                    .map_err(|_| FieldError::StockCount(digits.to_string()))?,
            )
        }
        None => None,
    };

    let name = text
        .lines()
        .map(str::trim)
        .find(|line| line.chars().count() < MAX_NAME_LEN && contains_whiskey_keyword(line))
        .map(clean_name)
        .filter(|name| !name.is_empty());

    debug!("Parsed fields: name={name:?} price={price:?} size={size} stock={stock_count:?}");

    Ok(ParsedFields {
        name,
        price,
        size,
        stock_count,
    })
}

/// Strips rating annotations and the "Add to Cart" button label from a name line
pub fn clean_name(line: &str) -> String {
    RATING_RE
        .replace_all(line, "")
        .replace("Add to Cart", "")
        .trim()
        .to_string()
}

#[cfg(test)]
#[path = "parser_tests.rs"]
mod tests;
