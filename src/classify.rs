//! URL viability classification.
//!
//! Before any network cost is paid, each candidate URL is matched against
//! two ordered pattern families:
//!
//! 1. **Homepage/index patterns**: root paths, `index.*`, `home.*`,
//!    `default.*`, `welcome.*`, `/home`, `/main`
//! 2. **Non-article boilerplate**: `/about`, `/contact`, `/faq`, `/help`,
//!    `/support`, `/terms`, `/privacy`, `/login`, `/signup`, `/register`,
//!    `/account`
//!
//! The homepage family is checked first; the first matching family wins.
//! Classification is a pure function of the URL string and never fails:
//! a URL that cannot be parsed is tagged [`SkipReason::Malformed`] but is
//! *not* skippable, since failure to parse is no evidence of being a
//! homepage.

use once_cell::sync::Lazy;
use regex::Regex;
use url::Url;

/// Why a URL was (or was not) flagged for skipping.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SkipReason {
    /// Root path or empty path.
    Homepage,
    /// An index-style filename or section entry point (`/index.html`, `/home`).
    IndexPage,
    /// Boilerplate pages that never carry article content (`/about`, `/privacy`).
    NonArticle,
    /// The URL string could not be parsed. Not skippable.
    Malformed,
    /// No pattern matched; the URL looks article-worthy.
    None,
}

/// The result of classifying one candidate URL.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Classification {
    /// Whether the URL should be skipped before fetching.
    pub skip: bool,
    /// The pattern family (or parse failure) behind the decision.
    pub reason: SkipReason,
}

impl Classification {
    fn skip(reason: SkipReason) -> Self {
        Self { skip: true, reason }
    }

    fn keep(reason: SkipReason) -> Self {
        Self { skip: false, reason }
    }
}

static INDEX_FILE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(r"(?i)^/(index|home|default|welcome)\.[a-z0-9]+/?$").unwrap()
});

static SECTION_ROOT_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)^/(home|main)/?$").unwrap());

static BOILERPLATE_RE: Lazy<Regex> = Lazy::new(|| {
    Regex::new(
        r"(?i)^/(about|contact|faq|help|support|terms|privacy|login|signup|register|account)/?$",
    )
    .unwrap()
});

/// Classify a candidate URL as skippable or article-worthy.
///
/// # Arguments
///
/// * `url` - An absolute URL string
///
/// # Returns
///
/// A [`Classification`] with the skip decision and the reason behind it.
/// Never panics; malformed input yields `{skip: false, reason: Malformed}`.
pub fn classify(url: &str) -> Classification {
    let parsed = match Url::parse(url) {
        Ok(parsed) => parsed,
        Err(_) => return Classification::keep(SkipReason::Malformed),
    };

    let path = parsed.path();

    // Homepage/index family first.
    if path.is_empty() || path == "/" {
        return Classification::skip(SkipReason::Homepage);
    }
    if INDEX_FILE_RE.is_match(path) || SECTION_ROOT_RE.is_match(path) {
        return Classification::skip(SkipReason::IndexPage);
    }

    if BOILERPLATE_RE.is_match(path) {
        return Classification::skip(SkipReason::NonArticle);
    }

    Classification::keep(SkipReason::None)
}
