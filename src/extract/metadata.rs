//! Publication date and title extraction.
//!
//! News sites expose publication metadata in wildly inconsistent places.
//! The date probe walks a fixed list of sources from most to least
//! structured: the Open Graph `article:published_time` meta tag, the
//! common ad-hoc meta names, a `<time datetime=...>` attribute, and
//! finally generic class-based date containers. The first non-empty hit
//! wins.

use chrono::{DateTime, NaiveDate};
use scraper::{Html, Selector};

/// Meta tags probed for a publication date, in priority order.
const DATE_META_SELECTORS: &[&str] = &[
    "meta[property=\"article:published_time\"]",
    "meta[name=\"publish_date\"]",
    "meta[name=\"date\"]",
    "meta[name=\"pubdate\"]",
    "meta[name=\"publication_date\"]",
];

/// Class-based containers that often hold a human-readable date.
const DATE_CLASS_SELECTORS: &[&str] = &[".date", ".published", ".pubdate", ".timestamp"];

/// Find a publication date in the document.
///
/// Probes meta tags, `time[datetime]`, then class-based containers, in
/// that order. The found value is trimmed and normalized to `YYYY-MM-DD`
/// when it parses as a known date format; an unparseable value is
/// returned as-is. Never errors.
pub fn extract_date(document: &Html) -> Option<String> {
    for selector_str in DATE_META_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        if let Some(element) = document.select(&selector).next() {
            if let Some(content) = element.value().attr("content") {
                let trimmed = content.trim();
                if !trimmed.is_empty() {
                    return Some(to_calendar_date(trimmed));
                }
            }
        }
    }

    let time_selector = Selector::parse("time[datetime]").unwrap();
    if let Some(element) = document.select(&time_selector).next() {
        if let Some(datetime) = element.value().attr("datetime") {
            let trimmed = datetime.trim();
            if !trimmed.is_empty() {
                return Some(to_calendar_date(trimmed));
            }
        }
    }

    for selector_str in DATE_CLASS_SELECTORS {
        let selector = Selector::parse(selector_str).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return Some(to_calendar_date(trimmed));
            }
        }
    }

    None
}

/// Find the document title.
///
/// Uses the `<title>` element, falling back to the first heading, falling
/// back to an empty string.
pub fn extract_title(document: &Html) -> String {
    let title_selector = Selector::parse("title").unwrap();
    if let Some(element) = document.select(&title_selector).next() {
        let text = element.text().collect::<String>();
        let trimmed = text.trim();
        if !trimmed.is_empty() {
            return trimmed.to_string();
        }
    }

    for heading in ["h1", "h2", "h3"] {
        let selector = Selector::parse(heading).unwrap();
        if let Some(element) = document.select(&selector).next() {
            let text = element.text().collect::<Vec<_>>().join(" ");
            let trimmed = text.trim();
            if !trimmed.is_empty() {
                return trimmed.to_string();
            }
        }
    }

    String::new()
}

/// Normalize a date string to `YYYY-MM-DD` when it parses; otherwise
/// return it unchanged.
fn to_calendar_date(raw: &str) -> String {
    if let Ok(dt) = DateTime::parse_from_rfc3339(raw) {
        return dt.date_naive().to_string();
    }
    if let Ok(dt) = DateTime::parse_from_rfc2822(raw) {
        return dt.date_naive().to_string();
    }
    for format in ["%Y-%m-%d", "%Y/%m/%d", "%m/%d/%Y", "%B %d, %Y", "%d %B %Y"] {
        if let Ok(date) = NaiveDate::parse_from_str(raw, format) {
            return date.to_string();
        }
    }
    raw.to_string()
}
