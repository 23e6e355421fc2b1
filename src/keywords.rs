//! Organisation-name normalization and keyword extraction.
//!
//! Names become searchable in a plain key-value table by indexing each one
//! under every significant word it contains. [`normalize`] produces the
//! canonical uppercase form used in key material; [`tokenize`] extracts the
//! deduplicated keyword set, dropping stop words that carry no
//! discriminating search value.

/// Words excluded from keyword indexing.
///
/// Compared after each word has been stripped to its alphanumeric form, so
/// the trading-as marker "T/A" is stored as "TA".
const STOP_WORDS: &[&str] = &[
    "LTD", "LIMITED", "UK", "COMPANY", "SERVICES", "THE", "AND", "A", "TA",
];

/// Uppercase `text` and replace every character outside `[A-Z0-9]` with `_`.
///
/// Total function: empty input yields an empty token, and the caller is
/// responsible for filtering it.
pub fn normalize(text: &str) -> String {
    text.to_uppercase()
        .chars()
        .map(|c| {
            if c.is_ascii_uppercase() || c.is_ascii_digit() {
                c
            } else {
                '_'
            }
        })
        .collect()
}

/// Split an organisation name into its searchable keywords.
///
/// Words are split on whitespace, stripped of non-alphanumeric characters,
/// uppercased, and filtered against [`STOP_WORDS`]. The result is
/// deduplicated in first-appearance order: two occurrences of one keyword
/// must not produce two index entries for the same organisation.
///
/// A name made entirely of stop words yields an empty set; such an
/// organisation keeps its canonical entry but is unreachable by keyword.
pub fn tokenize(name: &str) -> Vec<String> {
    let mut keywords: Vec<String> = Vec::new();
    for word in name.split_whitespace() {
        let stripped = normalize(word).replace('_', "");
        if stripped.is_empty() || STOP_WORDS.contains(&stripped.as_str()) {
            continue;
        }
        if !keywords.contains(&stripped) {
            keywords.push(stripped);
        }
    }
    keywords
}
