//! Presenting and saving run payloads.

use std::path::Path;
use std::sync::OnceLock;

use anyhow::{Context, Result};
use regex::Regex;

fn body_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"(?is)<body[^>]*>(.*?)</body>").expect("body regex is valid"))
}

fn tag_regex() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"<[^>]+>").expect("tag regex is valid"))
}

/// Whether a payload came back as an HTML document
pub fn looks_like_html(content: &str) -> bool {
    let lower = content.to_ascii_lowercase();
    lower.contains("<!doctype html>") || lower.contains("<html")
}

/// Reduce an HTML payload to its text; other payloads pass through.
///
/// Models occasionally answer with a full HTML page. Only the `<body>` is
/// kept, with tags removed.
pub fn plain_text(content: &str) -> String {
    if !looks_like_html(content) {
        return content.to_string();
    }

    let body = body_regex()
        .captures(content)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str())
        .unwrap_or(content);

    tag_regex().replace_all(body, "").trim().to_string()
}

/// Write a payload to disk, creating parent directories
pub async fn write_payload(path: &Path, content: &str) -> Result<()> {
    if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
        tokio::fs::create_dir_all(parent)
            .await
            .with_context(|| format!("Failed to create directory: {}", parent.display()))?;
    }

    tokio::fs::write(path, content)
        .await
        .with_context(|| format!("Failed to write output file: {}", path.display()))
}
