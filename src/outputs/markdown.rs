//! Summary document output.

use super::output_error;
use crate::error::PipelineError;
use tokio::fs;
use tracing::{info, instrument};

/// Write `summary` to `path` exactly as given.
#[instrument(level = "info", skip_all, fields(%path))]
pub async fn write_summary(summary: &str, path: &str) -> Result<(), PipelineError> {
    fs::write(path, summary).await.map_err(output_error(path))?;
    info!(bytes = summary.len(), "Blog post saved");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_verbatim_and_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("blog_post.md");
        let path = path.to_str().unwrap();

        write_summary("an older, longer post body", path).await.unwrap();
        write_summary("# Title\nBody", path).await.unwrap();
        assert_eq!(std::fs::read_to_string(path).unwrap(), "# Title\nBody");
    }

    #[tokio::test]
    async fn missing_directory_is_an_output_error() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("no/such/dir/blog_post.md");
        let err = write_summary("x", path.to_str().unwrap()).await.unwrap_err();
        assert!(matches!(err, PipelineError::Output { .. }));
    }
}
