use std::fs;
use std::path::Path;
use tracing::error;

/// Reads a line-delimited file into trimmed, non-empty lines.
///
/// A missing or unreadable file yields an empty list and an error log line,
/// never a hard failure. Line order is kept for positional pairing.
pub fn read_lines(path: impl AsRef<Path>) -> Vec<String> {
    let path = path.as_ref();
    match fs::read_to_string(path) {
        Ok(content) => content
            .lines()
            .map(str::trim)
            .filter(|line| !line.is_empty())
            .map(str::to_string)
            .collect(),
        Err(e) => {
            error!("Cannot read {}: {}", path.display(), e);
            Vec::new()
        }
    }
}
