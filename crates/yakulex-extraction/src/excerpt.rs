//! Keyword-bounded excerpt extraction.

/// Placeholder stored when a document yields no excerpt. The corpus is
/// Japanese, so the sentinel is too.
pub const NOT_FOUND_SENTINEL: &str = "内容が見つかりませんでした";

/// Mine the excerpt between `start_kw` and `end_kw` out of `text`.
///
/// Only the first occurrence of each keyword counts. When `end_kw` is
/// missing (or sits before the start anchor), the excerpt degrades to a
/// window of `fallback_window` characters following `start_kw`. Returns
/// `None` — never an empty string — when `start_kw` is absent or the
/// bounded region is empty; the caller substitutes the sentinel.
pub fn extract(
    text: &str,
    start_kw: &str,
    end_kw: &str,
    fallback_window: usize,
) -> Option<String> {
    let start = text.find(start_kw)?;
    let after = start + start_kw.len();

    let excerpt = match text.find(end_kw) {
        Some(end) if end > start => {
            // An end anchor overlapping the start keyword bounds an empty
            // region, which falls through to the sentinel below.
            if end >= after {
                text[after..end].to_string()
            } else {
                String::new()
            }
        }
        _ => text[after..].chars().take(fallback_window).collect(),
    };

    if excerpt.is_empty() {
        None
    } else {
        Some(excerpt)
    }
}
