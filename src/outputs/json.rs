//! JSON output for extracted articles.
//!
//! Serializes a [`BatchResult`] to a dated file that the downstream
//! summarization stage consumes.

use crate::models::BatchResult;
use chrono::Local;
use std::error::Error;
use tokio::fs;
use tracing::{error, info, instrument};

/// Write a [`BatchResult`] to `{output_dir}/articles_{date}.json`.
///
/// Creates the output directory if needed and returns the path written.
#[instrument(level = "info", skip_all, fields(output_dir = %output_dir))]
pub async fn write_batch(result: &BatchResult, output_dir: &str) -> Result<String, Box<dyn Error>> {
    let json = serde_json::to_string_pretty(result)?;

    if let Err(e) = fs::create_dir_all(output_dir).await {
        error!(%output_dir, error = %e, "Failed to create output dir");
        return Err(e.into());
    }

    let date = Local::now().date_naive().to_string();
    let path = format!("{}/articles_{}.json", output_dir.trim_end_matches('/'), date);

    info!(path = %path, articles = result.articles.len(), "Writing JSON");
    fs::write(&path, json).await?;
    info!(path = %path, "Wrote batch result");

    Ok(path)
}
