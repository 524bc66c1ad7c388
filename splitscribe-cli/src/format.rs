//! Transcript text shaping.

/// Sentence-case a piece of recognized text: first character
/// uppercased, everything after it lowercased.
pub fn sentence_case(text: &str) -> String {
    let mut result = String::with_capacity(text.len());
    let mut chars = text.chars();
    if let Some(first) = chars.next() {
        result.extend(first.to_uppercase());
        for ch in chars {
            result.extend(ch.to_lowercase());
        }
    }
    result
}
