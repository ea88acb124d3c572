//! Input resolution: map a site-relative page location to the files involved.
//!
//! A location such as `developer/17.0/guides/index` (with or without an
//! extension) names four things: the PHP source in the content root, the
//! Markdown file that replaces it, the optional `.ast` diagnostic dump, and
//! the URL the local server renders the page at.

use crate::config::ConversionConfig;
use crate::error::MigrateError;
use serde::Serialize;
use std::path::{Path, PathBuf};
use tracing::debug;

/// The files and URL belonging to one page.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PagePaths {
    /// Location relative to the content root, without extension.
    pub location: String,
    /// Page name: the last location segment.
    pub name: String,
    /// `<root>/<location>.php`
    pub source: PathBuf,
    /// `<root>/<location>.md`
    pub output: PathBuf,
    /// `<root>/<location>.ast`
    pub ast: PathBuf,
    /// `<server>/<location>`
    pub url: String,
}

impl PagePaths {
    /// Compute the paths for `location` without touching the file system.
    pub fn new(location: &str, config: &ConversionConfig) -> Result<Self, MigrateError> {
        let trimmed = location.trim().trim_matches('/');
        let (folder, file) = match trimmed.rsplit_once('/') {
            Some((folder, file)) => (folder, file),
            None => ("", trimmed),
        };
        let name = Path::new(file)
            .file_stem()
            .and_then(|s| s.to_str())
            .filter(|s| !s.is_empty())
            .ok_or_else(|| {
                MigrateError::InvalidConfig(format!("'{location}' does not name a page"))
            })?
            .to_string();

        let location = if folder.is_empty() {
            name.clone()
        } else {
            format!("{folder}/{name}")
        };
        let sibling = |ext: &str| config.content_root.join(format!("{location}.{ext}"));

        Ok(Self {
            source: sibling("php"),
            output: sibling("md"),
            ast: sibling("ast"),
            url: format!("{}/{}", config.server_url.trim_end_matches('/'), location),
            location,
            name,
        })
    }
}

/// Resolve `location` and check that its PHP source exists.
pub fn resolve_page(location: &str, config: &ConversionConfig) -> Result<PagePaths, MigrateError> {
    let paths = PagePaths::new(location, config)?;
    if !paths.source.is_file() {
        return Err(MigrateError::SourceNotFound { path: paths.source });
    }
    debug!("Resolved page source: {}", paths.source.display());
    Ok(paths)
}
