//! Accuracy scoring
//!
//! Heuristic quality proxy for one recognized document. Half the score comes
//! from text length (saturating at 1000 characters), half from how many
//! invoice keywords appear. The result is capped at 95 because dashboards
//! treat that as the ceiling.

/// Invoice vocabulary checked case-insensitively
pub const INVOICE_KEYWORDS: [&str; 7] = ["invoice", "total", "amount", "date", "tax", "subtotal", "$"];

/// Highest score ever reported
pub const MAX_ACCURACY_PCT: u8 = 95;

const LENGTH_SATURATION_CHARS: f64 = 1000.0;
const COMPONENT_WEIGHT: f64 = 50.0;

/// Number of keywords present in `text` (each counted once)
pub fn keyword_hits(text: &str) -> usize {
    let lower = text.to_lowercase();
    INVOICE_KEYWORDS
        .iter()
        .filter(|kw| lower.contains(*kw))
        .count()
}

/// Score recognized text in `[0, 95]`
pub fn score_accuracy(text: &str) -> u8 {
    let chars = text.chars().count() as f64;
    let length_score = (chars / LENGTH_SATURATION_CHARS * COMPONENT_WEIGHT).min(COMPONENT_WEIGHT);
    let keyword_score = keyword_hits(text) as f64 / INVOICE_KEYWORDS.len() as f64 * COMPONENT_WEIGHT;

    let score = (length_score + keyword_score).floor();
    score.min(MAX_ACCURACY_PCT as f64) as u8
}
