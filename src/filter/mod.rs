//! Tree filter: rewrite rules over pandoc's JSON document tree.
//!
//! The filter corrects what pandoc's HTML reader and Markdown writer get
//! wrong for help-site pages: indented code blocks, `language-` prefixed
//! classes, auto-generated anchors, link captions and `.php` targets, image
//! attributes and the legacy `body_text` wrapper. It has no state; the only
//! configuration is the fallback code-block language in [`FilterConfig`].
//!
//! ## Data Flow
//!
//! ```text
//! pandoc JSON ──▶ walk ──▶ rules::apply (per node) ──▶ pandoc JSON
//! ```
//!
//! 1. [`ast`]   — typed views over the `{"t", "c"}` nodes the rules touch
//! 2. [`walk`]  — document-order traversal, splicing replacement nodes
//! 3. [`rules`] — the rewrite rules themselves
//!
//! The same code backs the in-process filtering step of
//! [`crate::convert_page`] and the standalone `help2md-filter` binary that
//! can be handed to `pandoc --filter`.

pub mod ast;
pub mod rules;
pub mod walk;

use crate::error::FilterError;
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::io::{Read, Write};
use tracing::debug;

/// Environment variable `pandoc --filter` users set for the fallback language.
pub const CODEBLOCK_LANGUAGE_ENV: &str = "CODEBLOCK_LANGUAGE";

/// Settings for one filter run.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterConfig {
    /// Language given to code blocks that carry no class.
    pub codeblock_language: Option<String>,
}

/// What the driver should do with a node after the rules ran.
#[derive(Debug, Clone, PartialEq)]
pub enum Action {
    /// Keep the node (possibly modified in place) and descend into it.
    Keep,
    /// Remove the node and splice these nodes into its place.
    Replace(Vec<Value>),
}

/// Everything a rule may consult besides the node itself.
#[derive(Debug, Clone, Copy)]
pub struct FilterContext<'a> {
    /// Output format pandoc was asked for (`markdown_phpextra`, `json`, …).
    pub format: &'a str,
    /// Document metadata as found before filtering.
    pub meta: &'a Value,
    pub config: &'a FilterConfig,
}

/// Filter a whole pandoc document.
pub fn filter_document(
    document: Value,
    format: &str,
    config: &FilterConfig,
) -> Result<Value, FilterError> {
    if !document.get("blocks").is_some_and(Value::is_array) {
        return Err(FilterError::MalformedNode {
            tag: "Pandoc".into(),
            detail: "document has no `blocks` array".into(),
        });
    }

    let meta = document.get("meta").cloned().unwrap_or(Value::Null);
    let ctx = FilterContext {
        format,
        meta: &meta,
        config,
    };

    let mut visited = 0usize;
    let filtered = walk::walk(document, &mut |node: &mut Value| {
        visited += 1;
        rules::apply(node, &ctx)
    })?;
    debug!("Filtered {} nodes for format '{}'", visited, format);
    Ok(filtered)
}

/// Read a pandoc JSON document, filter it and write the result.
///
/// This is the `pandoc --filter` protocol: document on stdin, filtered
/// document on stdout.
pub fn filter_json<R: Read, W: Write>(
    reader: R,
    mut writer: W,
    format: &str,
    config: &FilterConfig,
) -> Result<(), FilterError> {
    let document: Value = serde_json::from_reader(reader)?;
    let filtered = filter_document(document, format, config)?;
    serde_json::to_writer(&mut writer, &filtered)?;
    writer.flush()?;
    Ok(())
}
