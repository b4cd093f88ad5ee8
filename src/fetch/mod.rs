//! Per-URL fetch orchestration over a rendering capability.
//!
//! One candidate URL moves through: classification → session launch →
//! bounded navigation with retries → response validation → best-effort
//! content wait → extraction. Every timeout is a soft cancellation: it
//! aborts the attempt, never the batch, and the rendering session is
//! released exactly once on every exit path.
//!
//! The rendering capability itself sits behind the [`Renderer`] and
//! [`RenderingSession`] traits so the orchestrator can be exercised
//! without a browser; the production implementation lives in
//! [`chromium`].

pub mod chromium;

use crate::classify::{self, SkipReason};
use crate::config::PipelineConfig;
use crate::extract::{self, metadata};
use crate::models::{CandidateUrl, ScrapedArticle};
use crate::normalize::normalize;
use crate::utils::truncate_for_log;
use async_trait::async_trait;
use scraper::Html;
use std::future::Future;
use std::time::Duration;
use thiserror::Error;
use tokio::time::sleep;
use tracing::{debug, info, instrument, warn};

/// Structural markers whose presence suggests the page has rendered its
/// main content.
const CONTENT_MARKERS: &[&str] = &["p", "article", ".article-body", ".content", "main"];

/// Errors surfaced by a rendering session implementation.
#[derive(Debug, Error)]
pub enum SessionError {
    /// The browser or browsing context misbehaved.
    #[error("browser error: {0}")]
    Browser(String),
    /// Navigation itself failed (network error, aborted load).
    #[error("navigation error: {0}")]
    Navigation(String),
}

/// Why a URL produced no article. None of these abort the batch.
#[derive(Debug, Error)]
pub enum FetchError {
    /// A rendering session could not be acquired. Non-retryable.
    #[error("rendering session unavailable: {0}")]
    Launch(#[source] SessionError),
    /// Every navigation attempt timed out or errored.
    #[error("navigation failed after {attempts} attempts")]
    NavigationExhausted { attempts: u32 },
    /// No response was obtained, or its status was not 200.
    #[error("non-OK response status: {status:?}")]
    NonOkStatus { status: Option<u16> },
    /// Navigation succeeded but the rendered markup could not be read.
    #[error("could not retrieve rendered markup: {0}")]
    Content(#[source] SessionError),
}

/// The terminal outcome of processing one candidate URL.
///
/// Skips, failures, and too-short content are all distinct so the batch
/// coordinator can count them separately, while none of them is treated
/// as a batch-level error.
#[derive(Debug)]
pub enum FetchOutcome {
    /// The URL was classified as not worth visiting.
    Skipped(SkipReason),
    /// Extraction produced a usable article.
    Article(ScrapedArticle),
    /// The page rendered but its text fell below the content floor.
    InsufficientContent {
        /// Normalized character count that missed the floor.
        chars: usize,
    },
    /// The fetch failed at launch, navigation, or validation.
    Failed(FetchError),
}

/// A single sandboxed browsing context, exclusive to one in-flight URL.
#[async_trait]
pub trait RenderingSession: Send {
    /// Navigate to `url` and return the main document's status code, or
    /// `None` if no response descriptor was observed.
    async fn navigate(&mut self, url: &str) -> Result<Option<u16>, SessionError>;

    /// Wait up to `timeout` for any of `selectors` to appear. Returns
    /// whether a marker was seen; timing out is not an error.
    async fn wait_for_any(&mut self, selectors: &[&str], timeout: Duration) -> bool;

    /// Retrieve the fully rendered markup.
    async fn content(&mut self) -> Result<String, SessionError>;

    /// Tear the browsing context down. Called exactly once per session.
    async fn close(&mut self);
}

/// A long-lived handle to the rendering capability, created at process
/// start and able to mint one session per URL.
#[async_trait]
pub trait Renderer: Send + Sync {
    /// Acquire a fresh sandboxed browsing context.
    ///
    /// The caller races this against a deadline, so implementations must
    /// release any partially created context when the returned future is
    /// dropped before completion.
    async fn launch_session(&self) -> Result<Box<dyn RenderingSession>, SessionError>;
}

/// The result of racing an operation against a deadline.
#[derive(Debug)]
pub enum Bounded<T> {
    /// The operation settled first.
    Completed(T),
    /// The deadline won; the operation was dropped.
    DeadlineExceeded,
}

/// Race `op` against `deadline` and report whichever settles first.
///
/// This is the single timeout primitive for session launch, navigation
/// attempts, and content waits; composing it with an attempt counter
/// gives the retry policy.
pub async fn bounded<F>(deadline: Duration, op: F) -> Bounded<F::Output>
where
    F: Future,
{
    match tokio::time::timeout(deadline, op).await {
        Ok(value) => Bounded::Completed(value),
        Err(_) => Bounded::DeadlineExceeded,
    }
}

/// Fetch and extract one candidate URL.
///
/// Classifies the URL first (a skip pays no network cost), then drives a
/// fresh rendering session through navigation, validation, and
/// extraction. The session is released unconditionally before returning.
#[instrument(level = "info", skip_all, fields(url = %candidate.url))]
pub async fn fetch_article(
    renderer: &dyn Renderer,
    candidate: &CandidateUrl,
    config: &PipelineConfig,
) -> FetchOutcome {
    let classification = classify::classify(&candidate.url);
    if classification.skip {
        info!(reason = ?classification.reason, "URL classified as skippable");
        return FetchOutcome::Skipped(classification.reason);
    }

    let mut session = match bounded(config.launch_timeout(), renderer.launch_session()).await {
        Bounded::Completed(Ok(session)) => session,
        Bounded::Completed(Err(e)) => {
            warn!(error = %e, "Failed to acquire rendering session");
            return FetchOutcome::Failed(FetchError::Launch(e));
        }
        Bounded::DeadlineExceeded => {
            warn!(
                timeout_secs = config.launch_timeout_secs,
                "Rendering session launch timed out"
            );
            return FetchOutcome::Failed(FetchError::Launch(SessionError::Browser(
                "session launch deadline exceeded".to_string(),
            )));
        }
    };

    let outcome = drive_session(session.as_mut(), candidate, config).await;
    session.close().await;
    outcome
}

/// Run navigation, validation, and extraction against an acquired
/// session. Split out so the caller can release the session on every
/// path.
async fn drive_session(
    session: &mut dyn RenderingSession,
    candidate: &CandidateUrl,
    config: &PipelineConfig,
) -> FetchOutcome {
    let mut status = None;
    let mut navigated = false;

    for attempt in 1..=config.navigation_attempts {
        match bounded(config.navigation_timeout(), session.navigate(&candidate.url)).await {
            Bounded::Completed(Ok(observed)) => {
                debug!(attempt, status = ?observed, "Navigation settled");
                status = observed;
                navigated = true;
                break;
            }
            Bounded::Completed(Err(e)) => {
                warn!(attempt, max = config.navigation_attempts, error = %e, "Navigation attempt failed");
            }
            Bounded::DeadlineExceeded => {
                warn!(
                    attempt,
                    max = config.navigation_attempts,
                    timeout_secs = config.navigation_timeout_secs,
                    "Navigation attempt timed out"
                );
            }
        }
        if attempt < config.navigation_attempts {
            sleep(config.retry_delay()).await;
        }
    }

    if !navigated {
        return FetchOutcome::Failed(FetchError::NavigationExhausted {
            attempts: config.navigation_attempts,
        });
    }

    if status != Some(200) {
        warn!(?status, "Response missing or non-OK");
        return FetchOutcome::Failed(FetchError::NonOkStatus { status });
    }

    // Latency optimization only: extraction proceeds whether or not a
    // marker ever appeared.
    let ready = session
        .wait_for_any(CONTENT_MARKERS, config.content_wait())
        .await;
    if !ready {
        debug!("No content marker appeared before the wait expired; extracting anyway");
    }

    let html = match session.content().await {
        Ok(html) => html,
        Err(e) => {
            warn!(error = %e, "Failed to retrieve rendered markup");
            return FetchOutcome::Failed(FetchError::Content(e));
        }
    };

    let raw = extract::extract_content(&html, config);
    let content = normalize(&raw);
    debug!(preview = %truncate_for_log(&content, 120), "Normalized extraction result");
    let chars = content.chars().count();
    if chars < config.min_article_chars {
        info!(
            chars,
            floor = config.min_article_chars,
            "Extracted content below floor"
        );
        return FetchOutcome::InsufficientContent { chars };
    }

    let document = Html::parse_document(&html);
    let title = if candidate.title.trim().is_empty() {
        metadata::extract_title(&document)
    } else {
        candidate.title.clone()
    };
    let published_date = candidate
        .date
        .clone()
        .or_else(|| metadata::extract_date(&document));

    info!(chars, title = %title, "Extracted article");
    FetchOutcome::Article(ScrapedArticle {
        url: candidate.url.clone(),
        title,
        content,
        published_date,
    })
}
