//! Candidate discovery behind the search-provider interface.
//!
//! The pipeline does not decide what to search for; it consumes an
//! ordered list of [`CandidateUrl`] from whatever implements
//! [`SearchProvider`]. The binary ships [`JsonFileProvider`], which
//! serves candidates from a JSON file and applies the count cap and
//! recency window locally.

use crate::models::CandidateUrl;
use async_trait::async_trait;
use chrono::{Duration, Local, NaiveDate};
use std::path::PathBuf;
use thiserror::Error;
use tracing::{debug, info, instrument};

/// Errors from a candidate discovery source.
#[derive(Debug, Error)]
pub enum SourceError {
    #[error("failed to read candidate source: {0}")]
    Io(#[from] std::io::Error),
    #[error("failed to parse candidate source: {0}")]
    Parse(#[from] serde_json::Error),
}

/// Supplies an ordered sequence of candidate URLs for a query, capped at
/// `max_results` and restricted to the last `days` days (0 disables the
/// recency filter).
#[async_trait]
pub trait SearchProvider: Send + Sync {
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        days: u32,
    ) -> Result<Vec<CandidateUrl>, SourceError>;
}

/// A file-backed provider: a JSON array of candidates, typically exported
/// by an external search stage.
///
/// The query is ignored (the file already is the query result); the count
/// cap and recency window are still applied. Candidates whose date is
/// missing or unparseable are kept, since staleness cannot be proven.
pub struct JsonFileProvider {
    path: PathBuf,
}

impl JsonFileProvider {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

#[async_trait]
impl SearchProvider for JsonFileProvider {
    #[instrument(level = "info", skip_all, fields(path = %self.path.display()))]
    async fn search(
        &self,
        query: &str,
        max_results: usize,
        days: u32,
    ) -> Result<Vec<CandidateUrl>, SourceError> {
        if !query.is_empty() {
            debug!(%query, "File provider ignores the query string");
        }

        let raw = tokio::fs::read_to_string(&self.path).await?;
        let candidates: Vec<CandidateUrl> = serde_json::from_str(&raw)?;
        let total = candidates.len();

        let cutoff = if days > 0 {
            Some(Local::now().date_naive() - Duration::days(i64::from(days)))
        } else {
            None
        };

        let selected: Vec<CandidateUrl> = candidates
            .into_iter()
            .filter(|candidate| match (&cutoff, &candidate.date) {
                (Some(cutoff), Some(date)) => match NaiveDate::parse_from_str(date, "%Y-%m-%d") {
                    Ok(parsed) => parsed >= *cutoff,
                    Err(_) => true,
                },
                _ => true,
            })
            .take(max_results)
            .collect();

        info!(
            total,
            selected = selected.len(),
            max_results,
            days,
            "Loaded candidate URLs"
        );
        Ok(selected)
    }
}
