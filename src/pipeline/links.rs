//! Link audit: find pages that still link to a converted page's `.php` URL.
//!
//! Once a page is converted, other pages linking to `name.php` need their
//! links updated by hand. The audit scans the whole content root for
//! `href="…/name.php"` (optionally with a `#fragment`) and reports the
//! matching files. Documentation for product versions before 16.0 is not
//! going to be converted, so hits under such version folders are dropped.
//!
//! The scan is blocking file-system work and runs on tokio's blocking pool.

use crate::config::LINK_AUDIT_MIN_MAJOR_VERSION;
use crate::error::MigrateError;
use jwalk::WalkDir;
use once_cell::sync::Lazy;
use regex::Regex;
use std::path::{Path, PathBuf};
use tracing::debug;

static RE_VERSION: Lazy<Regex> = Lazy::new(|| Regex::new(r"(\d+)\.(\d+)").unwrap());

/// Find files under `root` whose `href`s point at `<page_name>.php`.
///
/// Returned paths are relative to `root`, sorted, with old version folders
/// already filtered out.
pub async fn find_referencing_pages(
    root: &Path,
    page_name: &str,
) -> Result<Vec<PathBuf>, MigrateError> {
    let root = root.to_path_buf();
    let pattern = href_pattern(page_name)?;
    tokio::task::spawn_blocking(move || scan(&root, &pattern))
        .await
        .map_err(|e| MigrateError::Internal(format!("Link audit task panicked: {}", e)))
}

fn href_pattern(page_name: &str) -> Result<Regex, MigrateError> {
    let pattern = format!(
        r#"href=['"](?:[^'"]+/)?{}\.php(?:#[^'"]+)?['"]"#,
        regex::escape(page_name)
    );
    Regex::new(&pattern)
        .map_err(|e| MigrateError::Internal(format!("invalid link-audit pattern: {e}")))
}

fn scan(root: &Path, pattern: &Regex) -> Vec<PathBuf> {
    let mut hits = Vec::new();
    for entry in WalkDir::new(root).skip_hidden(true).sort(true) {
        let entry = match entry {
            Ok(entry) => entry,
            Err(e) => {
                debug!("Skipping unreadable entry: {}", e);
                continue;
            }
        };
        if !entry.file_type().is_file() {
            continue;
        }
        let path = entry.path();
        // Binary files (images, fonts) are not pages.
        let Ok(text) = std::fs::read_to_string(&path) else {
            continue;
        };
        if !pattern.is_match(&text) {
            continue;
        }
        let relative = path.strip_prefix(root).unwrap_or(&path).to_path_buf();
        if is_reportable(&relative) {
            hits.push(relative);
        } else {
            debug!("Ignoring link from old version folder: {}", relative.display());
        }
    }
    hits.sort();
    hits
}

/// Whether a referencing page is recent enough to be worth reporting.
///
/// Paths without a `major.minor` version are always reported.
pub fn is_reportable(path: &Path) -> bool {
    let text = path.to_string_lossy();
    match RE_VERSION.captures(&text) {
        Some(caps) => caps[1]
            .parse::<u32>()
            .map_or(true, |major| major >= LINK_AUDIT_MIN_MAJOR_VERSION),
        None => true,
    }
}
