//! Whitespace normalization for extracted article text.
//!
//! Rendered pages arrive full of layout artifacts: newlines between inline
//! elements, tab indentation, and non-breaking spaces from templating.
//! [`normalize`] collapses all of it into clean single-spaced prose.

/// Collapse all whitespace runs into single ASCII spaces and trim the ends.
///
/// Handles newlines, tabs, carriage returns, non-breaking spaces, and any
/// other Unicode whitespace. Deterministic and idempotent:
/// `normalize(normalize(x)) == normalize(x)`.
///
/// # Examples
///
/// ```
/// use newsgather::normalize::normalize;
/// assert_eq!(normalize("a\n\n\tb   c"), "a b c");
/// ```
pub fn normalize(raw: &str) -> String {
    raw.split_whitespace().collect::<Vec<_>>().join(" ")
}
