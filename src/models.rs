//! Data models for candidate URLs and extracted articles.
//!
//! This module defines the core data structures that flow through the
//! pipeline:
//! - [`CandidateUrl`]: An externally discovered URL not yet validated as
//!   article-worthy
//! - [`ScrapedArticle`]: A successfully extracted article handed to
//!   downstream consumers
//! - [`BatchResult`] / [`BatchSummary`]: The aggregate produced by one
//!   batch run

use serde::{Deserialize, Serialize};

/// A candidate article URL discovered by an external search provider.
///
/// Candidates are produced outside the pipeline (search API, feed index,
/// hand-written list) and consumed read-only. The `title` and `date` are
/// whatever the discovery source knew about the page; both may be refined
/// by extraction.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct CandidateUrl {
    /// Absolute URL of the candidate page.
    pub url: String,
    /// Title as reported by the discovery source (may be empty).
    #[serde(default)]
    pub title: String,
    /// Publication date as reported by the discovery source, if known.
    #[serde(default)]
    pub date: Option<String>,
}

/// A fully extracted article ready for downstream consumption.
///
/// Invariant: `content` is non-empty and has passed the configured
/// minimum-length floor. URLs whose extraction fell below the floor are
/// dropped by the pipeline, never emitted with empty content.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct ScrapedArticle {
    /// The source URL the article was extracted from.
    pub url: String,
    /// Article title (candidate title, falling back to the document title).
    pub title: String,
    /// Normalized article body text.
    pub content: String,
    /// Publication date, `YYYY-MM-DD` when it could be parsed.
    pub published_date: Option<String>,
}

impl ScrapedArticle {
    /// Extract the domain name (before .com/.org/etc) from the source URL.
    /// For example: "https://lite.cnn.com/article" -> "cnn"
    pub fn source_tag(&self) -> Option<String> {
        let parsed = url::Url::parse(&self.url).ok()?;
        let host = parsed.host_str()?;
        let parts: Vec<&str> = host.split('.').collect();
        // Handle cases like "lite.cnn.com" -> "cnn" or "cnn.com" -> "cnn"
        if parts.len() >= 2 {
            Some(parts[parts.len() - 2].to_string())
        } else {
            None
        }
    }
}

/// Counters describing how a batch run went.
///
/// `attempted` counts every candidate handed to the coordinator;
/// the remaining counters partition the non-successful outcomes.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct BatchSummary {
    /// Candidates processed (after deduplication).
    pub attempted: usize,
    /// Articles that cleared the content floor and were emitted.
    pub fetched: usize,
    /// Candidates skipped by URL classification.
    pub skipped: usize,
    /// Candidates that failed at launch, navigation, or validation.
    pub failed: usize,
    /// Candidates fetched successfully but below the content floor.
    pub insufficient: usize,
}

/// The aggregate result of one batch run.
///
/// `articles` preserves the relative input order of the successful subset;
/// skipped and failed candidates are simply absent.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct BatchResult {
    /// Successfully extracted articles, in input order.
    pub articles: Vec<ScrapedArticle>,
    /// Outcome counters for the whole run.
    pub summary: BatchSummary,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_candidate_url_deserializes_with_defaults() {
        let json = r#"{"url": "https://example.com/2025/06/19/story"}"#;
        let candidate: CandidateUrl = serde_json::from_str(json).unwrap();
        assert_eq!(candidate.url, "https://example.com/2025/06/19/story");
        assert_eq!(candidate.title, "");
        assert!(candidate.date.is_none());
    }

    #[test]
    fn test_scraped_article_serialization_roundtrip() {
        let article = ScrapedArticle {
            url: "https://example.com/story".to_string(),
            title: "A Story".to_string(),
            content: "Body text".to_string(),
            published_date: Some("2025-06-19".to_string()),
        };

        let json = serde_json::to_string(&article).unwrap();
        let back: ScrapedArticle = serde_json::from_str(&json).unwrap();
        assert_eq!(back.title, "A Story");
        assert_eq!(back.published_date.as_deref(), Some("2025-06-19"));
    }

    #[test]
    fn test_source_tag_subdomain() {
        let article = ScrapedArticle {
            url: "https://lite.cnn.com/2025/05/06/article".to_string(),
            title: String::new(),
            content: String::new(),
            published_date: None,
        };
        assert_eq!(article.source_tag(), Some("cnn".to_string()));
    }

    #[test]
    fn test_source_tag_simple_domain() {
        let article = ScrapedArticle {
            url: "https://example.com/article".to_string(),
            title: String::new(),
            content: String::new(),
            published_date: None,
        };
        assert_eq!(article.source_tag(), Some("example".to_string()));
    }

    #[test]
    fn test_source_tag_unparseable_url() {
        let article = ScrapedArticle {
            url: "not a url".to_string(),
            title: String::new(),
            content: String::new(),
            published_date: None,
        };
        assert_eq!(article.source_tag(), None);
    }

    #[test]
    fn test_batch_summary_defaults_to_zero() {
        let summary = BatchSummary::default();
        assert_eq!(summary.attempted, 0);
        assert_eq!(summary.fetched, 0);
    }
}
