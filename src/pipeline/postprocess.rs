//! Post-processing: turn pandoc's Markdown into the help-site page format.
//!
//! Two things cannot be fixed by the tree filter and are patched in the text
//! afterwards:
//!
//! - The page title belongs in YAML frontmatter, not in the body. It comes
//!   from the legacy `$pagename` declaration if there is one, else from a
//!   leading `# Heading`, else from the template's `'title'` entry.
//! - `<span class="key">…</span>` marks keyboard keys. pandoc has no node
//!   for it, so it comes out as a raw span and is rewritten to `<key>…</key>`.
//!
//! Rules (applied in order):
//! 1. Resolve the title, dropping the first line when it supplied the title
//! 2. Restore `<key>` elements
//! 3. Prepend the frontmatter block

use crate::output::TitleSource;
use crate::pipeline::source::StrippedSource;
use once_cell::sync::Lazy;
use regex::Regex;

/// A finished page ready to be written.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FinishedPage {
    pub markdown: String,
    pub title: Option<String>,
    pub title_source: TitleSource,
}

/// Apply all post-processing rules to pandoc's Markdown output.
pub fn finish_page(converted: &str, declared: &StrippedSource) -> FinishedPage {
    let (title, title_source, body) = resolve_title(converted, declared);
    let body = restore_key_elements(body);
    let markdown = match &title {
        Some(t) => format!("{}\n{}", frontmatter(t), body),
        None => body,
    };
    FinishedPage {
        markdown,
        title,
        title_source,
    }
}

// ── Rule 1: Resolve the title ───────────────────────────────────────────────

static RE_LEVEL1_HEADING: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^#[ \t]+(.*?)[ \t]*$").unwrap());

fn resolve_title<'a>(
    converted: &'a str,
    declared: &StrippedSource,
) -> (Option<String>, TitleSource, &'a str) {
    if let Some(legacy) = &declared.legacy_title {
        return (Some(legacy.clone()), TitleSource::Legacy, converted);
    }

    let (first_line, rest) = converted.split_once('\n').unwrap_or((converted, ""));
    let heading = RE_LEVEL1_HEADING
        .captures(first_line.trim_end_matches('\r'))
        .map(|caps| caps[1].to_string())
        .filter(|h| !h.is_empty());
    if let Some(heading) = heading {
        return (Some(heading), TitleSource::Heading, rest);
    }

    match &declared.modern_title {
        Some(t) => (Some(t.clone()), TitleSource::Template, converted),
        None => (None, TitleSource::Unknown, converted),
    }
}

// ── Rule 2: Restore <key> elements ──────────────────────────────────────────

static RE_KEY_SPAN: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"<span class="key">(.+?)</span>"#).unwrap());

fn restore_key_elements(input: &str) -> String {
    RE_KEY_SPAN.replace_all(input, "<key>$1</key>").to_string()
}

// ── Rule 3: Frontmatter ─────────────────────────────────────────────────────

fn frontmatter(title: &str) -> String {
    format!("---\ntitle: {title}\n---")
}

// ── Tests ────────────────────────────────────────────────────────────────────
