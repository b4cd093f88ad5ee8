//! # newsgather
//!
//! A resilient content-extraction pipeline for news aggregation: decide
//! which candidate URLs are worth visiting, fetch rendered pages through
//! headless Chromium under unreliable network conditions, and extract
//! clean article text and metadata from heterogeneous HTML.
//!
//! ## Architecture
//!
//! The pipeline is a chain of small components:
//! 1. **Classification** ([`classify`]): skip homepages, index pages, and
//!    boilerplate before paying any network cost
//! 2. **Fetching** ([`fetch`]): one sandboxed rendering session per URL,
//!    with bounded navigation retries and resource-type blocking
//! 3. **Extraction** ([`extract`]): a container → paragraph → whole-body
//!    fallback chain plus date/title metadata probes
//! 4. **Coordination** ([`batch`]): sequential processing with per-URL
//!    failure isolation and a politeness delay
//!
//! Everything around the pipeline (candidate discovery, processed-URL
//! bookkeeping, output files) sits behind narrow interfaces in
//! [`sources`], [`store`], and [`outputs`].

pub mod batch;
pub mod classify;
pub mod cli;
pub mod config;
pub mod extract;
pub mod fetch;
pub mod models;
pub mod normalize;
pub mod outputs;
pub mod sources;
pub mod store;
pub mod utils;

pub use batch::{process_batch, BatchError};
pub use classify::{classify, Classification, SkipReason};
pub use config::PipelineConfig;
pub use fetch::{fetch_article, FetchError, FetchOutcome, Renderer, RenderingSession};
pub use models::{BatchResult, BatchSummary, CandidateUrl, ScrapedArticle};
