//! newsgather binary: load candidates, run the extraction batch, write
//! the results.
//!
//! ## Flow
//!
//! 1. **Discovery**: read candidate URLs from the input file
//! 2. **Filtering**: drop URLs already in the processed-URL store
//! 3. **Fetching**: run the sequential batch through headless Chromium
//! 4. **Output**: write the extracted articles as a dated JSON file and
//!    update the store
//!
//! ## Usage
//!
//! ```sh
//! newsgather -i ./candidates.json -o ./out
//! ```

use clap::Parser;
use std::error::Error;
use tracing::{debug, error, info, warn};
use tracing_subscriber::{fmt as tfmt, EnvFilter};

use newsgather::batch::process_batch;
use newsgather::cli::Cli;
use newsgather::config::PipelineConfig;
use newsgather::fetch::chromium::ChromiumRenderer;
use newsgather::fetch::{bounded, Bounded};
use newsgather::outputs::json;
use newsgather::sources::{JsonFileProvider, SearchProvider};
use newsgather::store::{JsonFileStore, ProcessedUrlStore};
use newsgather::utils::ensure_writable_dir;

#[tokio::main]
async fn main() -> Result<(), Box<dyn Error>> {
    // --- Tracing init ---
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tfmt()
        .with_env_filter(filter)
        .with_target(true)
        .with_file(false)
        .with_line_number(false)
        .with_timer(tracing_subscriber::fmt::time::UtcTime::rfc_3339())
        .init();

    let start_time = std::time::Instant::now();
    info!("newsgather starting up");

    // Parse CLI
    let args = Cli::parse();
    debug!(?args.input, ?args.output_dir, "Parsed CLI arguments");

    // Early check: ensure output dir is writable
    if let Err(e) = ensure_writable_dir(&args.output_dir).await {
        error!(
            path = %args.output_dir,
            error = %e,
            "Output directory is not writable (fix perms or choose a different path)"
        );
        return Err(e);
    }

    // ---- Load config ----
    let mut config = match &args.config {
        Some(path) => {
            let config = PipelineConfig::load(path).await?;
            info!(config_path = %path, "Loaded configuration");
            config
        }
        None => PipelineConfig::default(),
    };
    if args.remote_browser_url.is_some() {
        config.remote_browser_url = args.remote_browser_url.clone();
    }

    // ---- Discover candidates ----
    let provider = JsonFileProvider::new(&args.input);
    let query = args.query.as_deref().unwrap_or("");
    let candidates = provider
        .search(query, args.max_articles, args.days)
        .await?;
    info!(count = candidates.len(), "Discovered candidate URLs");

    // ---- Filter already-processed URLs ----
    let mut store = match &args.store {
        Some(path) => Some(JsonFileStore::load(path).await?),
        None => None,
    };
    let candidates: Vec<_> = match &store {
        Some(store) => candidates
            .into_iter()
            .filter(|candidate| {
                let seen = store.is_processed(&candidate.url);
                if seen {
                    debug!(url = %candidate.url, "Already processed; skipping");
                }
                !seen
            })
            .collect(),
        None => candidates,
    };

    if candidates.is_empty() {
        info!("No unprocessed candidates; nothing to do");
        return Ok(());
    }

    // ---- Launch rendering capability (one handle for the whole run) ----
    let renderer = match bounded(config.launch_timeout(), ChromiumRenderer::launch(&config)).await
    {
        Bounded::Completed(Ok(renderer)) => renderer,
        Bounded::Completed(Err(e)) => {
            error!(error = %e, "Failed to start rendering capability");
            return Err(Box::new(e));
        }
        Bounded::DeadlineExceeded => {
            error!(
                timeout_secs = config.launch_timeout_secs,
                "Rendering capability launch timed out"
            );
            return Err("browser launch timed out".into());
        }
    };

    // ---- Run the batch ----
    let result = match process_batch(&renderer, &candidates, &config).await {
        Ok(result) => result,
        Err(e) => {
            error!(error = %e, "Batch aborted");
            renderer.close().await;
            return Err(Box::new(e));
        }
    };

    info!(
        attempted = result.summary.attempted,
        fetched = result.summary.fetched,
        skipped = result.summary.skipped,
        failed = result.summary.failed,
        insufficient = result.summary.insufficient,
        "Batch finished"
    );

    // ---- Record successes in the store ----
    if let Some(store) = store.as_mut() {
        for article in &result.articles {
            store.mark_processed(&article.url);
        }
        if let Err(e) = store.flush().await {
            warn!(error = %e, "Failed to persist processed-URL store");
        }
    }

    // ---- Write output ----
    if let Err(e) = json::write_batch(&result, &args.output_dir).await {
        error!(error = %e, "Failed to write batch output");
    }

    renderer.close().await;

    let elapsed = start_time.elapsed();
    info!(
        ?elapsed,
        secs = elapsed.as_secs(),
        articles = result.articles.len(),
        "Execution complete"
    );

    Ok(())
}
