//! Command-line interface definitions for newsgather.
//!
//! This module defines the CLI arguments and options using the `clap`
//! crate. Several options can also be provided via environment variables.

use clap::Parser;

/// Command-line arguments for the newsgather binary.
///
/// # Examples
///
/// ```sh
/// # Basic usage: candidates in, articles out
/// newsgather -i ./candidates.json -o ./out
///
/// # With a processed-URL store and a tuned config
/// newsgather -i ./candidates.json -o ./out -s ./processed.json -c config.yaml
///
/// # Against an already-running Chrome
/// newsgather -i ./candidates.json -o ./out --remote-browser-url ws://localhost:9222
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Path to the JSON file of candidate URLs
    #[arg(short, long)]
    pub input: String,

    /// Output directory for the extracted-articles JSON file
    #[arg(short, long)]
    pub output_dir: String,

    /// Optional path to a YAML pipeline config file
    #[arg(short, long)]
    pub config: Option<String>,

    /// Optional path to the processed-URL store (JSON)
    #[arg(short, long)]
    pub store: Option<String>,

    /// Query string forwarded to the search provider
    #[arg(short, long)]
    pub query: Option<String>,

    /// Maximum number of candidates to process
    #[arg(long, default_value_t = 20)]
    pub max_articles: usize,

    /// Recency window in days for dated candidates (0 disables the filter)
    #[arg(long, default_value_t = 7)]
    pub days: u32,

    /// Debug endpoint of an already-running Chrome to connect to instead
    /// of launching one
    #[arg(long, env = "REMOTE_BROWSER_URL")]
    pub remote_browser_url: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_parsing() {
        let cli = Cli::parse_from([
            "newsgather",
            "--input",
            "./candidates.json",
            "--output-dir",
            "./out",
        ]);

        assert_eq!(cli.input, "./candidates.json");
        assert_eq!(cli.output_dir, "./out");
        assert_eq!(cli.max_articles, 20);
        assert_eq!(cli.days, 7);
    }

    #[test]
    fn test_cli_short_flags() {
        let cli = Cli::parse_from([
            "newsgather",
            "-i",
            "/tmp/candidates.json",
            "-o",
            "/tmp/out",
            "-s",
            "/tmp/processed.json",
        ]);

        assert_eq!(cli.input, "/tmp/candidates.json");
        assert_eq!(cli.output_dir, "/tmp/out");
        assert_eq!(cli.store.as_deref(), Some("/tmp/processed.json"));
    }
}
