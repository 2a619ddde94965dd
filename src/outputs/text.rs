//! Plain-text listings: keyword trends and salient terms.

use super::output_error;
use crate::error::PipelineError;
use crate::models::KeywordRun;
use crate::trends::TrendMap;
use std::fmt::Write;
use tokio::fs;
use tracing::{info, instrument};

/// `keyword: count` lines in first-seen order.
pub fn render_trends(trends: &TrendMap) -> String {
    let mut out = String::new();
    for (keyword, count) in trends.iter() {
        let _ = writeln!(out, "{keyword}: {count}");
    }
    out
}

#[instrument(level = "info", skip_all, fields(%path, keywords = trends.len()))]
pub async fn write_trends(trends: &TrendMap, path: &str) -> Result<(), PipelineError> {
    fs::write(path, render_trends(trends))
        .await
        .map_err(output_error(path))?;
    info!("Keyword trends saved");
    Ok(())
}

/// `keyword: term, term, ...` lines in keyword order.
pub fn render_salient_terms(runs: &[KeywordRun]) -> String {
    let mut out = String::new();
    for run in runs {
        let _ = writeln!(out, "{}: {}", run.keyword, run.salient_terms.join(", "));
    }
    out
}

#[instrument(level = "info", skip_all, fields(%path))]
pub async fn write_salient_terms(runs: &[KeywordRun], path: &str) -> Result<(), PipelineError> {
    fs::write(path, render_salient_terms(runs))
        .await
        .map_err(output_error(path))?;
    info!("Salient terms saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn trend_lines_in_insertion_order() {
        let trends: TrendMap = [("x", 3), ("y", 1)].into_iter().collect();
        assert_eq!(render_trends(&trends), "x: 3\ny: 1\n");
        assert_eq!(render_trends(&TrendMap::new()), "");
    }

    #[tokio::test]
    async fn trend_file_has_exactly_the_entries() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("keyword_trends.txt");
        let path = path.to_str().unwrap();
        std::fs::write(path, "stale: 99\nold: 1\nlines: 7\n").unwrap();

        let trends: TrendMap = [("x", 3), ("y", 1)].into_iter().collect();
        write_trends(&trends, path).await.unwrap();

        let written = std::fs::read_to_string(path).unwrap();
        assert_eq!(written.lines().collect::<Vec<_>>(), vec!["x: 3", "y: 1"]);
    }

    #[test]
    fn salient_term_lines() {
        let run = |keyword: &str, terms: &[&str]| KeywordRun {
            keyword: keyword.to_string(),
            query: String::new(),
            search_url: String::new(),
            links: Vec::new(),
            fetched: Vec::new(),
            salient_terms: terms.iter().map(|t| t.to_string()).collect(),
        };
        let runs = vec![run("solar", &["great", "reliable"]), run("wind", &[])];
        assert_eq!(render_salient_terms(&runs), "solar: great, reliable\nwind: \n");
    }
}
