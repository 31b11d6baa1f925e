//! URL-list loader: one product URL per line, `#` comments and blank lines
//! skipped, site-relative paths resolved against the configured base origin.

use anyhow::{Context, Result};
use std::path::Path;
use tracing::info;
use url::Url;

pub fn load_url_list(path: &Path, base_url: &str) -> Result<Vec<String>> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read URL list {:?}", path))?;

    let base = Url::parse(base_url)
        .with_context(|| format!("Invalid base URL {:?}", base_url))?;

    let urls = parse_url_lines(text.lines(), &base);
    info!("Read {} URLs from {:?}", urls.len(), path);
    Ok(urls)
}

pub fn parse_url_lines<'a>(lines: impl Iterator<Item = &'a str>, base: &Url) -> Vec<String> {
    lines
        .map(str::trim)
        .filter(|line| !line.is_empty() && !line.starts_with('#'))
        .filter_map(|line| {
            if line.starts_with('/') {
                base.join(line).ok().map(String::from)
            } else {
                Some(line.to_string())
            }
        })
        .collect()
}
