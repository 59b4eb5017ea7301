//! Text helpers for list previews.

/// Shorten `text` to at most `length` characters, ending with `ending`.
///
/// Counts characters, not bytes, so CJK content is cut on character
/// boundaries. Text that already fits is returned unchanged.
pub fn truncate(text: &str, length: usize, ending: &str) -> String {
    if text.chars().count() <= length {
        return text.to_string();
    }

    let keep = length.saturating_sub(ending.chars().count());
    let head: String = text.chars().take(keep).collect();
    format!("{}{}", head.trim(), ending)
}
