//! Tag list parsing shared by the activity log and the journal

/// Maximum number of tags kept per entry
pub const MAX_TAGS: usize = 25;

/// Split a comma separated tag string, dropping blanks
pub fn normalize_tags(input: &str) -> Vec<String> {
    input
        .split(',')
        .map(|t| t.trim())
        .filter(|t| !t.is_empty())
        .take(MAX_TAGS)
        .map(|t| t.to_string())
        .collect()
}
