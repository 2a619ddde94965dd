//! Error types for each stage of the pipeline.
//!
//! Only per-URL content retrieval is resilient: a [`FetchError`] is logged and
//! mapped to a missing page. Everything else surfaces as a [`PipelineError`]
//! and ends the run.

use thiserror::Error;

/// Failure to retrieve a single result page.
#[derive(Debug, Error)]
pub enum FetchError {
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("unexpected status {status} for {url}")]
    Status { url: String, status: u16 },
}

/// Failure talking to the WebDriver endpoint.
#[derive(Debug, Error)]
pub enum BrowserError {
    #[error("WebDriver transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("WebDriver returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("WebDriver response missing {0}")]
    MalformedResponse(&'static str),
}

/// Failure of one completion request.
#[derive(Debug, Error)]
pub enum CompletionError {
    #[error("completion transport error: {0}")]
    Http(#[from] reqwest::Error),

    #[error("completion API returned {status}: {message}")]
    Api { status: u16, message: String },

    #[error("completion response had no choices")]
    NoChoices,
}

/// Summarization stopped at the 0-based `chunk_index`; `partial` holds the
/// lines gathered from every chunk before it. The message counts from 1.
#[derive(Debug, Error)]
#[error("summarization failed at chunk {} of {total_chunks}: {source}", .chunk_index + 1)]
pub struct SummarizeError {
    pub chunk_index: usize,
    pub total_chunks: usize,
    pub partial: Vec<String>,
    #[source]
    pub source: CompletionError,
}

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("could not read config file {path}: {source}")]
    Read {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not parse config file {path}: {source}")]
    Parse {
        path: String,
        #[source]
        source: serde_yaml::Error,
    },

    #[error("invalid configuration: {0}")]
    Invalid(String),
}

/// Top-level outcome of a run.
#[derive(Debug, Error)]
pub enum PipelineError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error(transparent)]
    Browser(#[from] BrowserError),

    #[error(transparent)]
    Summarize(#[from] SummarizeError),

    #[error("output error for {path}: {source}")]
    Output {
        path: String,
        #[source]
        source: std::io::Error,
    },

    #[error("could not build HTTP client: {0}")]
    Client(#[source] reqwest::Error),
}
