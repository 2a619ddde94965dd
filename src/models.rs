//! Data carried between pipeline stages.
//!
//! - [`BlogDraft`]: raw per-keyword text gathered during the harvest
//! - [`BlogPost`]: the finished summary and trend map
//! - [`KeywordRun`] / [`RunReport`]: bookkeeping for the optional JSON report

use crate::trends::TrendMap;
use serde::Serialize;

/// Append-only concatenation of keyword headers and scraped page text.
#[derive(Debug, Default)]
pub struct BlogDraft {
    text: String,
}

impl BlogDraft {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start the section for `keyword`.
    pub fn push_header(&mut self, keyword: &str) {
        self.text.push_str("# ");
        self.text.push_str(keyword);
        self.text.push_str("\n\n");
    }

    /// Append one page's text.
    pub fn push_content(&mut self, content: &str) {
        self.text.push_str(content);
        self.text.push_str("\n\n");
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }
}

/// The outcome of a complete run.
#[derive(Debug)]
pub struct BlogPost {
    /// Summary lines joined with `\n`.
    pub summary: String,
    pub trends: TrendMap,
    pub lines: usize,
    /// Completion requests the summary took.
    pub chunks: usize,
}

/// What happened for one keyword.
#[derive(Debug, Clone, Serialize)]
pub struct KeywordRun {
    pub keyword: String,
    pub query: String,
    pub search_url: String,
    /// Links taken from the results page, in order.
    pub links: Vec<String>,
    /// Links whose content was retrieved.
    pub fetched: Vec<String>,
    /// Content-derived salient terms, filled only when requested.
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub salient_terms: Vec<String>,
}

/// Machine-readable record of a run, written with `--report`.
#[derive(Debug, Serialize)]
pub struct RunReport {
    pub started_at: String,
    pub finished_at: String,
    pub keywords: Vec<KeywordRun>,
    pub trends: TrendMap,
    pub draft_bytes: usize,
    pub chunks: usize,
    pub summary_lines: usize,
    /// Set when the summary is incomplete.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}
