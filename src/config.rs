//! Pipeline configuration.
//!
//! Every threshold and timeout the pipeline applies lives in
//! [`PipelineConfig`], so the length floors and retry bounds are tunable
//! configuration rather than constants scattered through the extraction
//! code. The config can be loaded from a YAML file; any omitted field
//! falls back to its default.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::time::Duration;

/// Desktop user agent presented to target sites.
const DEFAULT_USER_AGENT: &str = "Mozilla/5.0 (Windows NT 10.0; Win64; x64) \
     AppleWebKit/537.36 (KHTML, like Gecko) Chrome/124.0.0.0 Safari/537.36";

/// All tunables for one pipeline run.
///
/// Defaults: 200-char container threshold, 100-char paragraph floor,
/// 100-char article floor, 60s launch / 30s navigation / 5s content-wait
/// timeouts, 3 navigation attempts with a 2s pause, 1s politeness delay.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Minimum text length for a container match to win outright.
    pub container_min_chars: usize,
    /// Floor below which paragraph-joined text falls through to the whole body.
    pub paragraph_min_chars: usize,
    /// Absolute floor for emitting an article at all (after normalization).
    pub min_article_chars: usize,
    /// Ceiling on rendering-session launch time.
    pub launch_timeout_secs: u64,
    /// Deadline for a single navigation attempt.
    pub navigation_timeout_secs: u64,
    /// How many times navigation is attempted before giving up on a URL.
    pub navigation_attempts: u32,
    /// Pause between navigation attempts.
    pub retry_delay_millis: u64,
    /// Best-effort wait for structural content markers to appear.
    pub content_wait_secs: u64,
    /// Pause between completed URL attempts.
    pub politeness_delay_millis: u64,
    /// User agent presented by the rendering session.
    pub user_agent: String,
    /// Run the browser headless.
    pub headless: bool,
    /// Connect to an already-running Chrome debug endpoint instead of
    /// launching one.
    pub remote_browser_url: Option<String>,
    /// Extra arguments passed to a locally launched Chrome.
    pub chrome_args: Vec<String>,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            container_min_chars: 200,
            paragraph_min_chars: 100,
            min_article_chars: 100,
            launch_timeout_secs: 60,
            navigation_timeout_secs: 30,
            navigation_attempts: 3,
            retry_delay_millis: 2000,
            content_wait_secs: 5,
            politeness_delay_millis: 1000,
            user_agent: DEFAULT_USER_AGENT.to_string(),
            headless: true,
            remote_browser_url: None,
            chrome_args: Vec::new(),
        }
    }
}

impl PipelineConfig {
    /// Load configuration from a YAML file, filling omitted fields with
    /// defaults.
    pub async fn load(path: &str) -> Result<Self, Box<dyn Error>> {
        let raw = tokio::fs::read_to_string(path).await?;
        let config: Self = serde_yaml::from_str(&raw)?;
        Ok(config)
    }

    pub fn launch_timeout(&self) -> Duration {
        Duration::from_secs(self.launch_timeout_secs)
    }

    pub fn navigation_timeout(&self) -> Duration {
        Duration::from_secs(self.navigation_timeout_secs)
    }

    pub fn retry_delay(&self) -> Duration {
        Duration::from_millis(self.retry_delay_millis)
    }

    pub fn content_wait(&self) -> Duration {
        Duration::from_secs(self.content_wait_secs)
    }

    pub fn politeness_delay(&self) -> Duration {
        Duration::from_millis(self.politeness_delay_millis)
    }
}
