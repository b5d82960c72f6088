//! Normalisation helpers for free-text values exchanged with the API.

/// Trims the value and collapses internal whitespace runs to a single space.
pub fn sanitize_string(value: &str) -> String {
    value.split_whitespace().collect::<Vec<_>>().join(" ")
}

/// Splits a comma-separated server field into cleaned, non-blank items, keeping order.
pub fn split_csv(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(sanitize_string)
        .filter(|item| !item.is_empty())
        .collect()
}
