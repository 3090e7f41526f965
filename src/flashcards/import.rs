//! Card import formats
//!
//! - JSON: an array of `{q|question, a|answer, why|explanation}` records
//! - Text: paragraphs separated by blank lines; first line is the
//!   question, second the answer, remaining lines the explanation

use std::path::Path;

use serde_json::Value;

use super::models::RawCard;

/// Parse blank-line-delimited text into raw cards.
/// Paragraphs with fewer than two non-blank lines are skipped.
pub fn parse_text_cards(text: &str) -> Vec<RawCard> {
    let text = text.replace('\r', "");
    let mut cards = Vec::new();
    let mut block: Vec<&str> = Vec::new();

    for line in text.lines().chain(std::iter::once("")) {
        let line = line.trim();
        if !line.is_empty() {
            block.push(line);
            continue;
        }
        if block.len() >= 2 {
            cards.push(RawCard::new(block[0], block[1], block[2..].join("\n")));
        }
        block.clear();
    }

    cards
}

/// Parse a JSON array of card records. Non-object elements are skipped.
pub fn parse_json_cards(text: &str) -> Result<Vec<RawCard>, serde_json::Error> {
    let value: Value = serde_json::from_str(text)?;
    let cards = match value {
        Value::Array(items) => items.iter().filter_map(RawCard::from_value).collect(),
        _ => Vec::new(),
    };
    Ok(cards)
}

/// True when the file should be read as JSON
pub fn is_json_file(path: &Path) -> bool {
    path.extension()
        .and_then(|ext| ext.to_str())
        .map_or(false, |ext| ext.eq_ignore_ascii_case("json"))
}

/// Deck title for an imported file: the file name without its extension
pub fn title_from_path(path: &Path) -> String {
    path.file_stem()
        .map(|s| s.to_string_lossy().to_string())
        .filter(|s| !s.is_empty())
        .unwrap_or_else(|| "Imported deck".to_string())
}
