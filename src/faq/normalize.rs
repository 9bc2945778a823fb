use once_cell::sync::Lazy;
use regex::Regex;

/// Anything that is neither a word character nor whitespace
static NON_WORD: Lazy<Regex> = Lazy::new(|| Regex::new(r"[^\w\s]").expect("valid punctuation pattern"));

/// Canonicalize text for comparison.
///
/// Lower-cases, drops punctuation and symbols, collapses whitespace runs to a
/// single space and trims both ends. Total and idempotent.
pub fn normalize(text: &str) -> String {
    let lowered = text.to_lowercase();
    let stripped = NON_WORD.replace_all(&lowered, "");

    stripped.split_whitespace().collect::<Vec<_>>().join(" ")
}
