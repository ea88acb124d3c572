//! Output types returned by the conversion entry points.

use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Where a page's frontmatter title came from.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TitleSource {
    /// `$pagename = '…'` in a legacy page. Always wins.
    Legacy,
    /// The level-1 heading on the first line of the converted page.
    Heading,
    /// `'title' => "…"` in the modern template call.
    Template,
    /// No title could be determined.
    #[default]
    Unknown,
}

/// Summary of one page conversion.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionReport {
    /// Site-relative location, without extension.
    pub location: String,
    /// PHP source that was converted.
    pub source: PathBuf,
    /// Markdown file written.
    pub output: PathBuf,
    /// Diagnostic parse tree, when requested.
    pub ast: Option<PathBuf>,
    /// Title written to the frontmatter.
    pub title: Option<String>,
    pub title_source: TitleSource,
    /// Pages (relative to the content root) that still link to the `.php` page.
    pub referencing_pages: Vec<PathBuf>,
    /// Whether the source was deleted after conversion.
    pub source_deleted: bool,
    /// Wall-clock time for the whole page.
    pub duration_ms: u64,
}
