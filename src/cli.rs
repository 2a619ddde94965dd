//! Command-line interface definitions.
//!
//! Every flag except `--keywords`, `--api-key`, `--report` and `--signals`
//! overrides the matching key of the YAML config file. Keywords and the API
//! key are prompted for when not supplied.

use crate::config::{RunConfig, SummaryFailurePolicy};
use clap::Parser;

/// Command-line arguments.
///
/// # Examples
///
/// ```sh
/// # Prompt for keywords and key
/// keyword_blog
///
/// # Fully non-interactive, three results per keyword
/// keyword_blog -k "solar,wind" -n 3 --api-key "$OPENAI_API_KEY"
///
/// # Keep whatever was summarized if the API fails midway, and write a report
/// keyword_blog -k solar --on-summary-failure write-partial --report run.json
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Comma-separated keywords for the blog post
    #[arg(short, long)]
    pub keywords: Option<String>,

    /// API key for the completions service
    #[arg(long, env = "OPENAI_API_KEY", hide_env_values = true)]
    pub api_key: Option<String>,

    /// Optional path to a YAML config file
    #[arg(short, long, env = "KEYWORD_BLOG_CONFIG")]
    pub config: Option<String>,

    /// Result links fetched per keyword
    #[arg(short, long)]
    pub num_results: Option<usize>,

    /// Output-token budget per completion request
    #[arg(long)]
    pub max_tokens: Option<u32>,

    /// Maximum characters per summary chunk
    #[arg(long)]
    pub chunk_size: Option<usize>,

    /// Completion model identifier
    #[arg(long)]
    pub model: Option<String>,

    /// Base URL of the OpenAI-compatible API
    #[arg(long, env = "OPENAI_API_BASE")]
    pub api_base: Option<String>,

    /// WebDriver server used to render search pages
    #[arg(long, env = "WEBDRIVER_URL")]
    pub webdriver_url: Option<String>,

    /// Summary output file
    #[arg(short = 'o', long)]
    pub summary_path: Option<String>,

    /// Keyword trend output file
    #[arg(short, long)]
    pub trends_path: Option<String>,

    /// Extra attempts per chunk when a completion request fails
    #[arg(long)]
    pub retries: Option<usize>,

    /// What to write when summarization fails partway
    #[arg(long, value_enum)]
    pub on_summary_failure: Option<SummaryFailurePolicy>,

    /// Write a JSON run report to this path
    #[arg(long)]
    pub report: Option<String>,

    /// Write per-keyword salient terms to this path
    #[arg(long)]
    pub signals: Option<String>,
}

impl Cli {
    /// Overlay the flags that were given onto `config`.
    pub fn apply_overrides(&self, config: &mut RunConfig) {
        if let Some(n) = self.num_results {
            config.num_results = n;
        }
        if let Some(n) = self.max_tokens {
            config.max_tokens = n;
        }
        if let Some(n) = self.chunk_size {
            config.chunk_size = n;
        }
        if let Some(ref model) = self.model {
            config.model = model.clone();
        }
        if let Some(ref base) = self.api_base {
            config.api_base = base.clone();
        }
        if let Some(ref url) = self.webdriver_url {
            config.webdriver_url = url.clone();
        }
        if let Some(ref path) = self.summary_path {
            config.summary_path = path.clone();
        }
        if let Some(ref path) = self.trends_path {
            config.trends_path = path.clone();
        }
        if let Some(n) = self.retries {
            config.completion_retries = n;
        }
        if let Some(policy) = self.on_summary_failure {
            config.on_summary_failure = policy;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_cli_defaults_leave_config_untouched() {
        let cli = Cli::parse_from(["keyword_blog"]);
        let mut config = RunConfig::default();
        cli.apply_overrides(&mut config);
        assert_eq!(config.num_results, 5);
        assert_eq!(config.max_tokens, 100);
        assert!(cli.keywords.is_none());
    }

    #[test]
    fn test_cli_overrides() {
        let cli = Cli::parse_from([
            "keyword_blog",
            "-k",
            "solar,wind",
            "-n",
            "2",
            "--chunk-size",
            "500",
            "-o",
            "/tmp/post.md",
            "-t",
            "/tmp/trends.txt",
            "--on-summary-failure",
            "write-partial",
            "--retries",
            "3",
        ]);
        let mut config = RunConfig::default();
        cli.apply_overrides(&mut config);

        assert_eq!(cli.keywords.as_deref(), Some("solar,wind"));
        assert_eq!(config.num_results, 2);
        assert_eq!(config.chunk_size, 500);
        assert_eq!(config.summary_path, "/tmp/post.md");
        assert_eq!(config.trends_path, "/tmp/trends.txt");
        assert_eq!(config.on_summary_failure, SummaryFailurePolicy::WritePartial);
        assert_eq!(config.completion_retries, 3);
    }
}
