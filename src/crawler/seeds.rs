//! Seed file loading

use std::path::Path;

/// Reads seed URLs from a text file, one per line
///
/// Blank lines and lines starting with `#` are ignored. A missing or
/// unreadable file is logged and yields no seeds; the run then finishes
/// immediately with nothing emitted.
pub fn load_seeds(path: Option<&Path>) -> Vec<String> {
    let Some(path) = path else {
        tracing::warn!("No seed file configured; nothing to crawl");
        return Vec::new();
    };

    match std::fs::read_to_string(path) {
        Ok(contents) => parse_seeds(&contents),
        Err(e) => {
            tracing::error!("Seed file '{}' could not be read: {}", path.display(), e);
            Vec::new()
        }
    }
}

fn parse_seeds(contents: &str) -> Vec<String> {
    contents
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(str::to_string)
        .collect()
}
