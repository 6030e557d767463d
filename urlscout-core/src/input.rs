// URL lists for probing: pasted text, plain-text files and one-column CSV exports

use crate::error::{CoreError, Result};
use std::collections::HashSet;
use std::fs;
use std::path::Path;
use tracing::{debug, warn};
use url::Url;

/// Combine URLs given directly with those read from `hosts_file`.
/// Direct URLs come first; duplicates across both sources are dropped.
pub fn load_urls_from_source(urls: &[String], hosts_file: Option<&Path>) -> Result<Vec<String>> {
    let mut combined = parse_url_list(&urls.join("\n"));

    if let Some(path) = hosts_file {
        combined.extend(load_urls_from_file(path)?);
    }

    let combined = dedup_preserving_order(combined);
    if combined.is_empty() {
        return Err(CoreError::NoUrls(
            "input (pass --url or --hosts-file)".to_string(),
        ));
    }

    Ok(combined)
}

/// Load and parse URLs from a text or CSV file.
pub fn load_urls_from_file(path: &Path) -> Result<Vec<String>> {
    let content = fs::read_to_string(path)?;
    let urls = parse_url_list(&content);
    debug!("Loaded {} URL(s) from {}", urls.len(), path.display());

    if urls.is_empty() {
        return Err(CoreError::NoUrls(path.display().to_string()));
    }

    Ok(urls)
}

/// Parse newline-separated input into probe targets, in order, without
/// duplicates. Blank lines, `#` comments and a leading `url` header are
/// skipped.
pub fn parse_url_list(text: &str) -> Vec<String> {
    let urls = text
        .lines()
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .map(first_csv_field)
        .filter(|field| !field.is_empty() && !field.eq_ignore_ascii_case("url"))
        .filter_map(parse_url_line)
        .collect();

    dedup_preserving_order(urls)
}

/// Parse a single entry as a URL, adding http:// when there is no scheme.
pub fn parse_url_line(line: &str) -> Option<String> {
    let candidate = if line.contains("://") {
        line.to_string()
    } else {
        format!("http://{}", line)
    };

    match Url::parse(&candidate) {
        Ok(url) if matches!(url.scheme(), "http" | "https") && url.host_str().is_some() => {
            Some(candidate)
        }
        _ => {
            warn!("Skipping invalid URL '{}'", line);
            None
        }
    }
}

// A quoted first field runs to its closing quote; otherwise it ends at the first comma.
fn first_csv_field(line: &str) -> &str {
    if let Some(rest) = line.strip_prefix('"') {
        return match rest.find('"') {
            Some(end) => rest[..end].trim(),
            None => rest.trim(),
        };
    }

    match line.split_once(',') {
        Some((field, _)) => field.trim(),
        None => line,
    }
}

fn dedup_preserving_order(urls: Vec<String>) -> Vec<String> {
    let mut seen = HashSet::new();
    urls.into_iter()
        .filter(|url| seen.insert(url.clone()))
        .collect()
}
