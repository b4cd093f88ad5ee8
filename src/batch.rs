//! Batch coordination across many candidate URLs.
//!
//! Candidates are processed one at a time, in input order. Sequential
//! processing bounds resource usage (one rendering session alive at a
//! time) and keeps the request rate low enough to avoid tripping
//! anti-bot defenses; a politeness delay separates completed attempts.
//!
//! Per-URL failure is isolated: a skip, a dead navigation, or a too-short
//! page is counted and logged, and processing moves to the next URL. The
//! only batch-level errors are an empty candidate list and a rendering
//! capability that failed at launch for every single URL.

use crate::config::PipelineConfig;
use crate::fetch::{fetch_article, FetchError, FetchOutcome, Renderer};
use crate::models::{BatchResult, BatchSummary, CandidateUrl};
use itertools::Itertools;
use rand::{rng, Rng};
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{info, instrument, warn};

/// Conditions that abort a whole batch. Per-URL failures never do.
#[derive(Debug, Error)]
pub enum BatchError {
    /// The caller supplied no candidates at all.
    #[error("no candidate URLs to process")]
    EmptyInput,
    /// Every fetched URL failed at session launch; the rendering
    /// capability is unavailable.
    #[error("rendering capability unavailable: all {attempts} fetches failed at launch")]
    RendererUnavailable {
        /// How many launches were attempted.
        attempts: usize,
    },
}

/// Process an ordered list of candidate URLs into extracted articles.
///
/// Duplicate URLs are dropped (first occurrence wins). The returned
/// articles preserve the relative input order of the successful subset;
/// the summary reports how the rest fell out.
#[instrument(level = "info", skip_all, fields(candidates = candidates.len()))]
pub async fn process_batch(
    renderer: &dyn Renderer,
    candidates: &[CandidateUrl],
    config: &PipelineConfig,
) -> Result<BatchResult, BatchError> {
    if candidates.is_empty() {
        return Err(BatchError::EmptyInput);
    }

    let unique: Vec<&CandidateUrl> = candidates
        .iter()
        .unique_by(|candidate| candidate.url.clone())
        .collect();
    if unique.len() < candidates.len() {
        info!(
            dropped = candidates.len() - unique.len(),
            "Dropped duplicate candidate URLs"
        );
    }

    let mut articles = Vec::new();
    let mut summary = BatchSummary {
        attempted: unique.len(),
        ..Default::default()
    };
    let mut launch_failures = 0usize;

    let total = unique.len();
    for (index, candidate) in unique.into_iter().enumerate() {
        let outcome = fetch_article(renderer, candidate, config).await;
        let hit_network = !matches!(outcome, FetchOutcome::Skipped(_));

        match outcome {
            FetchOutcome::Article(article) => {
                info!(
                    index,
                    url = %candidate.url,
                    source = %article.source_tag().unwrap_or_default(),
                    chars = article.content.chars().count(),
                    "Article extracted"
                );
                summary.fetched += 1;
                articles.push(article);
            }
            FetchOutcome::Skipped(reason) => {
                info!(index, url = %candidate.url, ?reason, "Skipped by URL classification");
                summary.skipped += 1;
            }
            FetchOutcome::InsufficientContent { chars } => {
                warn!(index, url = %candidate.url, chars, "Content below usable floor; dropped");
                summary.insufficient += 1;
            }
            FetchOutcome::Failed(error) => {
                if matches!(error, FetchError::Launch(_)) {
                    launch_failures += 1;
                }
                warn!(index, url = %candidate.url, error = %error, "Fetch failed; continuing with next URL");
                summary.failed += 1;
            }
        }

        // Politeness delay between completed network attempts; skips paid
        // no network cost and get none.
        if hit_network && index + 1 < total {
            let jitter_ms: u64 = rng().random_range(0..=250);
            sleep(config.politeness_delay() + Duration::from_millis(jitter_ms)).await;
        }
    }

    let fetch_attempts = summary.attempted - summary.skipped;
    if fetch_attempts > 0 && launch_failures == fetch_attempts {
        return Err(BatchError::RendererUnavailable {
            attempts: fetch_attempts,
        });
    }

    info!(
        attempted = summary.attempted,
        fetched = summary.fetched,
        skipped = summary.skipped,
        failed = summary.failed,
        insufficient = summary.insufficient,
        "Batch complete"
    );

    Ok(BatchResult { articles, summary })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::fetch::{RenderingSession, SessionError};
    use async_trait::async_trait;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::time::Duration;

    /// Per-URL scripted behavior for the fake rendering capability.
    #[derive(Clone)]
    enum PageScript {
        Serve(String),
        NavError,
        Status(u16),
    }

    struct ScriptedRenderer {
        pages: Arc<HashMap<String, PageScript>>,
        fail_all_launches: bool,
    }

    impl ScriptedRenderer {
        fn new(pages: HashMap<String, PageScript>) -> Self {
            Self {
                pages: Arc::new(pages),
                fail_all_launches: false,
            }
        }
    }

    struct ScriptedSession {
        pages: Arc<HashMap<String, PageScript>>,
        html: Option<String>,
    }

    #[async_trait]
    impl Renderer for ScriptedRenderer {
        async fn launch_session(&self) -> Result<Box<dyn RenderingSession>, SessionError> {
            if self.fail_all_launches {
                return Err(SessionError::Browser("browser gone".into()));
            }
            Ok(Box::new(ScriptedSession {
                pages: Arc::clone(&self.pages),
                html: None,
            }))
        }
    }

    #[async_trait]
    impl RenderingSession for ScriptedSession {
        async fn navigate(&mut self, url: &str) -> Result<Option<u16>, SessionError> {
            match self.pages.get(url) {
                Some(PageScript::Serve(html)) => {
                    self.html = Some(html.clone());
                    Ok(Some(200))
                }
                Some(PageScript::NavError) => {
                    Err(SessionError::Navigation("connection refused".into()))
                }
                Some(PageScript::Status(code)) => Ok(Some(*code)),
                None => Ok(None),
            }
        }

        async fn wait_for_any(&mut self, _selectors: &[&str], _timeout: Duration) -> bool {
            self.html.is_some()
        }

        async fn content(&mut self) -> Result<String, SessionError> {
            self.html
                .clone()
                .ok_or_else(|| SessionError::Browser("no page loaded".into()))
        }

        async fn close(&mut self) {}
    }

    fn fast_config() -> PipelineConfig {
        PipelineConfig {
            retry_delay_millis: 0,
            politeness_delay_millis: 0,
            content_wait_secs: 0,
            ..PipelineConfig::default()
        }
    }

    fn candidate(url: &str) -> CandidateUrl {
        CandidateUrl {
            url: url.to_string(),
            title: String::new(),
            date: None,
        }
    }

    fn long_article(marker: &str) -> String {
        format!(
            "<html><head><title>{marker}</title></head><body><article>{marker} {}</article></body></html>",
            "text ".repeat(100)
        )
    }

    #[tokio::test]
    async fn test_mixed_batch_returns_successes_in_order() {
        // 5 candidates: 2 skippable, 1 permanent navigation failure,
        // 2 that succeed.
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/2025/06/19/first".to_string(),
            PageScript::Serve(long_article("first")),
        );
        pages.insert(
            "https://example.com/2025/06/20/second".to_string(),
            PageScript::Serve(long_article("second")),
        );
        pages.insert(
            "https://example.com/2025/06/21/broken".to_string(),
            PageScript::NavError,
        );
        let renderer = ScriptedRenderer::new(pages);

        let candidates = vec![
            candidate("https://example.com/"),
            candidate("https://example.com/2025/06/19/first"),
            candidate("https://example.com/2025/06/21/broken"),
            candidate("https://example.com/about"),
            candidate("https://example.com/2025/06/20/second"),
        ];

        let result = process_batch(&renderer, &candidates, &fast_config())
            .await
            .unwrap();

        assert_eq!(result.articles.len(), 2);
        assert!(result.articles[0].url.ends_with("first"));
        assert!(result.articles[1].url.ends_with("second"));
        assert_eq!(result.summary.attempted, 5);
        assert_eq!(result.summary.fetched, 2);
        assert_eq!(result.summary.skipped, 2);
        assert_eq!(result.summary.failed, 1);
    }

    #[tokio::test]
    async fn test_empty_input_is_a_batch_error() {
        let renderer = ScriptedRenderer::new(HashMap::new());
        let result = process_batch(&renderer, &[], &fast_config()).await;
        assert!(matches!(result, Err(BatchError::EmptyInput)));
    }

    #[tokio::test]
    async fn test_all_launches_failing_surfaces_renderer_unavailable() {
        let mut renderer = ScriptedRenderer::new(HashMap::new());
        renderer.fail_all_launches = true;

        let candidates = vec![
            candidate("https://example.com/2025/06/19/a"),
            candidate("https://example.com/2025/06/19/b"),
        ];
        let result = process_batch(&renderer, &candidates, &fast_config()).await;

        assert!(matches!(
            result,
            Err(BatchError::RendererUnavailable { attempts: 2 })
        ));
    }

    #[tokio::test]
    async fn test_non_ok_status_counts_as_failed_not_fatal() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/2025/06/19/gone".to_string(),
            PageScript::Status(404),
        );
        pages.insert(
            "https://example.com/2025/06/19/ok".to_string(),
            PageScript::Serve(long_article("ok")),
        );
        let renderer = ScriptedRenderer::new(pages);

        let candidates = vec![
            candidate("https://example.com/2025/06/19/gone"),
            candidate("https://example.com/2025/06/19/ok"),
        ];
        let result = process_batch(&renderer, &candidates, &fast_config())
            .await
            .unwrap();

        assert_eq!(result.summary.failed, 1);
        assert_eq!(result.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_duplicate_urls_deduplicated_first_wins() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/2025/06/19/story".to_string(),
            PageScript::Serve(long_article("story")),
        );
        let renderer = ScriptedRenderer::new(pages);

        let candidates = vec![
            candidate("https://example.com/2025/06/19/story"),
            candidate("https://example.com/2025/06/19/story"),
        ];
        let result = process_batch(&renderer, &candidates, &fast_config())
            .await
            .unwrap();

        assert_eq!(result.summary.attempted, 1);
        assert_eq!(result.articles.len(), 1);
    }

    #[tokio::test]
    async fn test_short_content_counted_as_insufficient() {
        let mut pages = HashMap::new();
        pages.insert(
            "https://example.com/2025/06/19/stub".to_string(),
            PageScript::Serve("<html><body><p>too short</p></body></html>".to_string()),
        );
        let renderer = ScriptedRenderer::new(pages);

        let candidates = vec![candidate("https://example.com/2025/06/19/stub")];
        let result = process_batch(&renderer, &candidates, &fast_config())
            .await
            .unwrap();

        assert_eq!(result.summary.insufficient, 1);
        assert!(result.articles.is_empty());
    }
}
