//! Small helpers shared by the binary: keyword parsing, operator prompts,
//! log-friendly truncation and output path checks.

use std::error::Error;
use std::fs as stdfs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tokio::fs;
use tracing::{info, instrument};

/// Split a comma-separated keyword list.
///
/// Items are trimmed; items that are empty after trimming are dropped. Case
/// is preserved.
///
/// ```ignore
/// assert_eq!(parse_keywords("solar, Wind ,,"), vec!["solar", "Wind"]);
/// ```
pub fn parse_keywords(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|k| !k.is_empty())
        .map(str::to_string)
        .collect()
}

/// Print `label` and read one line from `input`, without the line ending.
pub fn prompt_from<R: BufRead, W: Write>(label: &str, input: &mut R, output: &mut W) -> io::Result<String> {
    write!(output, "{label}")?;
    output.flush()?;
    let mut line = String::new();
    input.read_line(&mut line)?;
    Ok(line.trim_end_matches(['\r', '\n']).to_string())
}

/// [`prompt_from`] on the terminal.
pub fn prompt(label: &str) -> io::Result<String> {
    prompt_from(label, &mut io::stdin().lock(), &mut io::stdout())
}

/// Truncate a string for logging purposes.
///
/// Strings longer than `max` bytes are cut at the nearest char boundary at or
/// below `max` and get `"…(+N bytes)"` appended.
pub fn truncate_for_log(s: &str, max: usize) -> String {
    if s.len() <= max {
        return s.to_string();
    }
    let mut end = max;
    while !s.is_char_boundary(end) {
        end -= 1;
    }
    format!("{}…(+{} bytes)", &s[..end], s.len() - end)
}

/// Make sure the directory that will hold `file_path` exists and is writable.
///
/// Creates the directory if needed, then writes and removes a probe file, so
/// a bad output path fails before any searching starts rather than after.
#[instrument(level = "info", skip_all, fields(path = %file_path))]
pub async fn ensure_parent_writable(file_path: &str) -> Result<(), Box<dyn Error>> {
    let dir = Path::new(file_path)
        .parent()
        .filter(|p| !p.as_os_str().is_empty())
        .unwrap_or(Path::new("."));
    fs::create_dir_all(dir).await?;

    let probe_path = dir.join("..__probe_write__");
    stdfs::File::create(&probe_path)?;
    let _ = stdfs::remove_file(&probe_path);
    info!(dir = %dir.display(), "Output directory is writable");
    Ok(())
}
