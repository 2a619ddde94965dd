//! Artifact writers.
//!
//! # Submodules
//!
//! - [`markdown`]: the summary document, written verbatim
//! - [`text`]: the keyword trend listing and the salient-term listing
//! - [`json`]: the optional run report
//!
//! [`write_outcome`] decides which of these a finished run produces. Every
//! writer truncates an existing file of the same name. I/O errors are
//! returned as [`PipelineError::Output`](crate::error::PipelineError::Output).

pub mod json;
pub mod markdown;
pub mod text;

use crate::assembler::Harvest;
use crate::config::{RunConfig, SummaryFailurePolicy};
use crate::error::{PipelineError, SummarizeError};
use crate::models::{BlogPost, RunReport};
use chrono::Utc;
use tracing::{error, instrument, warn};

pub(crate) fn output_error(path: &str) -> impl FnOnce(std::io::Error) -> PipelineError + '_ {
    move |source| PipelineError::Output {
        path: path.to_string(),
        source,
    }
}

/// Where a run's artifacts go. `report` and `signals` are optional.
#[derive(Debug, Clone, Default)]
pub struct OutputPaths {
    pub summary: String,
    pub trends: String,
    pub report: Option<String>,
    pub signals: Option<String>,
}

impl OutputPaths {
    pub fn from_config(config: &RunConfig, report: Option<String>, signals: Option<String>) -> Self {
        Self {
            summary: config.summary_path.clone(),
            trends: config.trends_path.clone(),
            report,
            signals,
        }
    }

    /// Every path that will be written, required ones first.
    pub fn iter(&self) -> impl Iterator<Item = &str> {
        [Some(&self.summary), Some(&self.trends), self.report.as_ref(), self.signals.as_ref()]
            .into_iter()
            .flatten()
            .map(String::as_str)
    }
}

/// Write the artifacts of a finished run.
///
/// A successful summary writes everything. A failed one follows `policy`:
/// `Abort` writes nothing, `WritePartial` writes the lines gathered before
/// the failure along with the full trend map. A failed summary is always
/// returned as an error.
#[instrument(level = "info", skip_all, fields(?policy, ok = outcome.is_ok()))]
pub async fn write_outcome(
    policy: SummaryFailurePolicy,
    harvest: &Harvest,
    outcome: Result<BlogPost, SummarizeError>,
    paths: &OutputPaths,
    started_at: &str,
) -> Result<(), PipelineError> {
    let e = match outcome {
        Ok(post) => {
            markdown::write_summary(&post.summary, &paths.summary).await?;
            text::write_trends(&post.trends, &paths.trends).await?;
            return write_extras(harvest, paths, started_at, post.chunks, post.lines, None).await;
        }
        Err(e) => e,
    };

    match policy {
        SummaryFailurePolicy::Abort => {
            error!(error = %e, "Summarization failed; nothing written");
        }
        SummaryFailurePolicy::WritePartial => {
            warn!(error = %e, lines = e.partial.len(), "Summarization failed; writing partial summary");
            markdown::write_summary(&e.partial.join("\n"), &paths.summary).await?;
            text::write_trends(&harvest.trends, &paths.trends).await?;
            write_extras(
                harvest,
                paths,
                started_at,
                e.total_chunks,
                e.partial.len(),
                Some(e.to_string()),
            )
            .await?;
        }
    }
    Err(e.into())
}

/// The salient-term listing and the JSON run report, when requested.
async fn write_extras(
    harvest: &Harvest,
    paths: &OutputPaths,
    started_at: &str,
    chunks: usize,
    summary_lines: usize,
    error: Option<String>,
) -> Result<(), PipelineError> {
    if let Some(ref path) = paths.signals {
        text::write_salient_terms(&harvest.runs, path).await?;
    }
    if let Some(ref path) = paths.report {
        let report = RunReport {
            started_at: started_at.to_string(),
            finished_at: Utc::now().to_rfc3339(),
            keywords: harvest.runs.clone(),
            trends: harvest.trends.clone(),
            draft_bytes: harvest.draft.len(),
            chunks,
            summary_lines,
            error,
        };
        json::write_report(&report, path).await?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::CompletionError;
    use std::path::Path;

    fn solar_harvest() -> Harvest {
        let mut harvest = Harvest::default();
        harvest.draft.push_header("solar");
        harvest.draft.push_content("solar power solar grid");
        harvest.trends.accumulate("solar", "solar power solar grid");
        harvest.trends.accumulate("wind", "no match here");
        harvest
    }

    fn paths_in(dir: &Path) -> OutputPaths {
        OutputPaths {
            summary: dir.join("blog_post.md").to_string_lossy().into_owned(),
            trends: dir.join("keyword_trends.txt").to_string_lossy().into_owned(),
            report: Some(dir.join("report.json").to_string_lossy().into_owned()),
            signals: None,
        }
    }

    fn failed_at_second_chunk() -> SummarizeError {
        SummarizeError {
            chunk_index: 1,
            total_chunks: 3,
            partial: vec!["Solar keeps growing.".to_string(), "Grids adapt.".to_string()],
            source: CompletionError::Api {
                status: 500,
                message: "boom".to_string(),
            },
        }
    }

    #[tokio::test]
    async fn success_writes_summary_trends_and_report() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());
        let harvest = solar_harvest();
        let post = BlogPost {
            summary: "Solar keeps growing.".to_string(),
            trends: harvest.trends.clone(),
            lines: 1,
            chunks: 1,
        };

        write_outcome(SummaryFailurePolicy::Abort, &harvest, Ok(post), &paths, "2026-01-01T00:00:00Z")
            .await
            .expect("outputs written");

        assert_eq!(std::fs::read_to_string(&paths.summary).unwrap(), "Solar keeps growing.");
        assert_eq!(std::fs::read_to_string(&paths.trends).unwrap(), "solar: 2\nwind: 0\n");
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(paths.report.as_ref().unwrap()).unwrap()).unwrap();
        assert!(report["error"].is_null());
        assert_eq!(report["chunks"], 1);
    }

    #[tokio::test]
    async fn abort_writes_nothing_and_fails() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let result = write_outcome(
            SummaryFailurePolicy::Abort,
            &solar_harvest(),
            Err(failed_at_second_chunk()),
            &paths,
            "2026-01-01T00:00:00Z",
        )
        .await;

        assert!(matches!(result, Err(PipelineError::Summarize(_))));
        for path in paths.iter() {
            assert!(!Path::new(path).exists(), "{path} should not exist");
        }
    }

    #[tokio::test]
    async fn write_partial_keeps_gathered_lines_and_full_trends() {
        let dir = tempfile::tempdir().unwrap();
        let paths = paths_in(dir.path());

        let result = write_outcome(
            SummaryFailurePolicy::WritePartial,
            &solar_harvest(),
            Err(failed_at_second_chunk()),
            &paths,
            "2026-01-01T00:00:00Z",
        )
        .await;

        match result {
            Err(PipelineError::Summarize(e)) => assert_eq!(e.chunk_index, 1),
            other => panic!("expected a summarize error, got {other:?}"),
        }
        assert_eq!(
            std::fs::read_to_string(&paths.summary).unwrap(),
            "Solar keeps growing.\nGrids adapt."
        );
        assert_eq!(std::fs::read_to_string(&paths.trends).unwrap(), "solar: 2\nwind: 0\n");
        let report: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(paths.report.as_ref().unwrap()).unwrap()).unwrap();
        assert_eq!(report["summary_lines"], 2);
        assert!(report["error"].as_str().unwrap().contains("boom"));
    }

    #[test]
    fn paths_skip_unrequested_artifacts() {
        let paths = OutputPaths::from_config(&RunConfig::default(), None, Some("terms.txt".to_string()));
        assert_eq!(paths.iter().collect::<Vec<_>>(), vec!["blog_post.md", "keyword_trends.txt", "terms.txt"]);
    }
}
