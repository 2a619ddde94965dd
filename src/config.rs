//! Run configuration.
//!
//! Values come from built-in defaults, optionally overlaid by a YAML file, and
//! finally by command-line flags (see [`crate::cli::Cli::apply_overrides`]).

use crate::error::ConfigError;
use crate::throttle::ThrottlePolicy;
use serde::{Deserialize, Serialize};
use tracing::{info, instrument};

/// What to do when the completion service fails partway through a summary.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize, clap::ValueEnum)]
#[serde(rename_all = "snake_case")]
pub enum SummaryFailurePolicy {
    /// Write nothing and exit with the error.
    #[default]
    Abort,
    /// Write the lines summarized so far plus the trend map, then exit with the error.
    WritePartial,
}

/// Everything a run needs besides the keywords and the API key.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct RunConfig {
    /// Result links fetched per keyword.
    pub num_results: usize,
    /// Output-token budget for each completion request.
    pub max_tokens: u32,
    /// Maximum characters per summary chunk.
    pub chunk_size: usize,
    /// Completion model identifier.
    pub model: String,
    /// Base URL of the OpenAI-compatible API, without the `/completions` suffix.
    pub api_base: String,
    /// Search endpoint; the query is appended as `?q=...`.
    pub search_base: String,
    /// WebDriver server (chromedriver, geckodriver, selenium).
    pub webdriver_url: String,
    pub throttle: ThrottlePolicy,
    /// Extra attempts per chunk after a failed completion request.
    pub completion_retries: usize,
    pub on_summary_failure: SummaryFailurePolicy,
    pub summary_path: String,
    pub trends_path: String,
}

impl Default for RunConfig {
    fn default() -> Self {
        Self {
            num_results: 5,
            max_tokens: 100,
            chunk_size: 3000,
            model: "gpt-3.5-turbo-instruct".to_string(),
            api_base: "https://api.openai.com/v1".to_string(),
            search_base: "https://www.google.com/search".to_string(),
            webdriver_url: "http://localhost:9515".to_string(),
            throttle: ThrottlePolicy::default(),
            completion_retries: 0,
            on_summary_failure: SummaryFailurePolicy::Abort,
            summary_path: "blog_post.md".to_string(),
            trends_path: "keyword_trends.txt".to_string(),
        }
    }
}

impl RunConfig {
    /// Load a YAML config file. Keys that are absent keep their defaults.
    #[instrument(level = "info", skip_all, fields(%path))]
    pub fn load(path: &str) -> Result<Self, ConfigError> {
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Read {
            path: path.to_string(),
            source,
        })?;
        let config = Self::from_yaml(&raw).map_err(|source| ConfigError::Parse {
            path: path.to_string(),
            source,
        })?;
        info!("Loaded configuration");
        Ok(config)
    }

    pub fn from_yaml(raw: &str) -> Result<Self, serde_yaml::Error> {
        if raw.trim().is_empty() {
            return Ok(Self::default());
        }
        serde_yaml::from_str(raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.chunk_size == 0 {
            return Err(ConfigError::Invalid("chunk_size must be greater than 0".into()));
        }
        if self.num_results == 0 {
            return Err(ConfigError::Invalid("num_results must be greater than 0".into()));
        }
        if self.max_tokens == 0 {
            return Err(ConfigError::Invalid("max_tokens must be greater than 0".into()));
        }
        self.throttle.validate().map_err(ConfigError::Invalid)
    }
}
