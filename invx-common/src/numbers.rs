//! Numeric token extraction
//!
//! Pulls price-like tokens out of the full recognized text so the upload
//! response can show candidate amounts next to the aligned columns.

use once_cell::sync::Lazy;
use regex::Regex;

// Two or more digits, optionally with one decimal point between them
static NUMERIC_TOKEN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\d+\.?\d+").expect("numeric token pattern is valid"));

/// All numeric tokens in `text`, in order of appearance
pub fn extract_numeric_tokens(text: &str) -> Vec<String> {
    NUMERIC_TOKEN
        .find_iter(text)
        .map(|m| m.as_str().to_string())
        .collect()
}
