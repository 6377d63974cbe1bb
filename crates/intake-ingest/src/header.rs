//! Header key normalization.

/// Normalizes a header or alias spelling into a lookup key.
///
/// Trims, lowercases and collapses every run of whitespace, `.` or `-` into a
/// single `_`, so `" Card  No. "`, `"card-no"` and `"CARD_NO"` all become
/// `"card_no"`. Runs that touch an existing `_` are not merged with it.
pub fn normalize_key(value: &str) -> String {
    let lowered = value.trim().to_lowercase();
    let mut key = String::with_capacity(lowered.len());
    let mut in_separator = false;

    for c in lowered.chars() {
        if c.is_whitespace() || c == '.' || c == '-' {
            if !in_separator {
                key.push('_');
                in_separator = true;
            }
        } else {
            key.push(c);
            in_separator = false;
        }
    }

    key
}
