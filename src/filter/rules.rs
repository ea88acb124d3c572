//! Per-node rewrite rules.
//!
//! Each rule is a pure function over one node. [`apply`] dispatches on the
//! node tag; tags without a rule pass through untouched.
//!
//! Rules:
//! 1. Code blocks without an identifier get a sentinel one, which stops
//!    pandoc from falling back to indented code (rendered fences only).
//! 2. Code-block classes lose their `language-` prefix; a block without any
//!    class gets the configured fallback language.
//! 3. Headers lose identifier, classes and attributes (no auto anchors).
//! 4. Links lose their title; relative targets lose a `.md`/`.php` extension.
//! 5. Images lose identifier, classes and attributes.
//! 6. `Div.body_text` wrappers are replaced by their (filtered) children.

use super::ast::{self, Attr, CodeBlock, Div, Header, Image, Link};
use super::{Action, FilterContext};
use crate::error::FilterError;
use once_cell::sync::Lazy;
use regex::Regex;
use serde_json::Value;

/// Identifier given to code blocks that have none. Never rendered.
pub const INDENTATION_PREVENTION_ID: &str = "code-block-indentation-prevention";

/// Prefix HTML highlighters put on language classes.
pub const LANGUAGE_PREFIX: &str = "language-";

/// Class of the legacy content wrapper.
pub const LEGACY_CONTAINER_CLASS: &str = "body_text";

/// Extensions stripped from internal link targets.
const STRIPPED_LINK_EXTENSIONS: [&str; 2] = ["md", "php"];

/// `scheme:` (`https:`, `mailto:`) or protocol-relative `//` prefix.
static RE_EXTERNAL_TARGET: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(?:[A-Za-z][A-Za-z0-9+.-]*:|//)").unwrap());

/// Apply every rule relevant to `node`.
pub fn apply(node: &mut Value, ctx: &FilterContext<'_>) -> Result<Action, FilterError> {
    match ast::node_tag(node) {
        Some("CodeBlock") => {
            let mut block: CodeBlock = ast::content(node)?;
            force_fenced_code(&mut block.0);
            normalise_code_language(&mut block.0, ctx.config.codeblock_language.as_deref());
            ast::set_content(node, &block)?;
            Ok(Action::Keep)
        }
        Some("Header") => {
            let mut header: Header = ast::content(node)?;
            header.1 = Attr::default();
            ast::set_content(node, &header)?;
            Ok(Action::Keep)
        }
        Some("Link") => {
            let mut link: Link = ast::content(node)?;
            link.2.1.clear();
            link.2.0 = strip_link_extension(&link.2.0);
            ast::set_content(node, &link)?;
            Ok(Action::Keep)
        }
        Some("Image") => {
            let mut image: Image = ast::content(node)?;
            image.0 = Attr::default();
            ast::set_content(node, &image)?;
            Ok(Action::Keep)
        }
        Some("Div") => unwrap_legacy_container(node, ctx),
        _ => Ok(Action::Keep),
    }
}

fn force_fenced_code(attr: &mut Attr) {
    if attr.0.is_empty() {
        attr.0 = INDENTATION_PREVENTION_ID.to_string();
    }
}

fn normalise_code_language(attr: &mut Attr, fallback: Option<&str>) {
    if attr.1.is_empty() {
        if let Some(language) = fallback {
            attr.1.push(language.to_string());
        }
        return;
    }
    for class in attr.1.iter_mut() {
        if let Some(language) = class.strip_prefix(LANGUAGE_PREFIX) {
            *class = language.to_string();
        }
    }
}

/// Drop a `.md` or `.php` extension from a relative link target.
///
/// Only the final path segment is considered, so dotted directory names such
/// as `v16.0/` are left alone. A `?query` or `#fragment` suffix is kept.
/// Targets with a scheme (`https://…`, `mailto:…`) or a protocol-relative
/// `//host` prefix are returned unchanged.
pub fn strip_link_extension(target: &str) -> String {
    if RE_EXTERNAL_TARGET.is_match(target) {
        return target.to_string();
    }

    let path_end = target.find(['?', '#']).unwrap_or(target.len());
    let (path, suffix) = target.split_at(path_end);
    let segment_start = path.rfind('/').map_or(0, |i| i + 1);
    let (dir, segment) = path.split_at(segment_start);

    match segment.rsplit_once('.') {
        Some((stem, ext)) if !stem.is_empty() && STRIPPED_LINK_EXTENSIONS.contains(&ext) => {
            format!("{dir}{stem}{suffix}")
        }
        _ => target.to_string(),
    }
}

/// Replace a `body_text` wrapper with its children.
///
/// The driver walks the contents of replacement nodes but never hands the
/// replacement nodes themselves back to [`apply`], so each child is run
/// through the rules here.
fn unwrap_legacy_container(node: &Value, ctx: &FilterContext<'_>) -> Result<Action, FilterError> {
    let (attr, blocks): Div = ast::content(node)?;
    if !attr.has_class(LEGACY_CONTAINER_CLASS) {
        return Ok(Action::Keep);
    }

    let mut spliced = Vec::with_capacity(blocks.len());
    for mut block in blocks {
        match apply(&mut block, ctx)? {
            Action::Keep => spliced.push(block),
            Action::Replace(nodes) => spliced.extend(nodes),
        }
    }
    Ok(Action::Replace(spliced))
}
