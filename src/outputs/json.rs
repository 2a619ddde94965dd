//! JSON run report.

use super::output_error;
use crate::error::PipelineError;
use crate::models::RunReport;
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Serialize `report` as pretty JSON to `path`, creating parent directories.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn write_report(report: &RunReport, path: &str) -> Result<(), PipelineError> {
    let json = serde_json::to_string_pretty(report)
        .map_err(|e| output_error(path)(std::io::Error::other(e)))?;

    if let Some(parent) = Path::new(path).parent().filter(|p| !p.as_os_str().is_empty()) {
        fs::create_dir_all(parent).await.map_err(output_error(path))?;
    }
    fs::write(path, json).await.map_err(output_error(path))?;
    info!(keywords = report.keywords.len(), "Wrote run report");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::trends::TrendMap;

    #[tokio::test]
    async fn report_round_trips_through_disk() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("reports/run.json");
        let path = path.to_str().unwrap();

        let report = RunReport {
            started_at: "2026-10-18T09:00:00Z".to_string(),
            finished_at: "2026-10-18T09:01:00Z".to_string(),
            keywords: Vec::new(),
            trends: [("solar", 2)].into_iter().collect::<TrendMap>(),
            draft_bytes: 42,
            chunks: 1,
            summary_lines: 3,
            error: None,
        };
        write_report(&report, path).await.unwrap();

        let value: serde_json::Value =
            serde_json::from_str(&std::fs::read_to_string(path).unwrap()).unwrap();
        assert_eq!(value["trends"]["solar"], 2);
        assert_eq!(value["chunks"], 1);
        assert!(value.get("error").is_none());
    }
}
