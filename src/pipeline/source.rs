//! Source preparation: strip template boilerplate from a PHP page.
//!
//! The help-site templates emit the site header, navigation and footer. Left
//! in place, all of it ends up in pandoc's output, so the calls that emit it
//! are removed from the source before the page is fetched from the server.
//! The page title declared in the template call would be lost with it; it is
//! kept as a PHP comment instead so later runs can still find it.
//!
//! Running [`strip_template`] on its own output changes nothing.

use once_cell::sync::Lazy;
use regex::{NoExpand, Regex};

static RE_MODERN_TITLE_DOUBLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'title'[ ]*=>[ ]*"([^"]+)""#).unwrap());

static RE_MODERN_TITLE_SINGLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r#"'title'[ ]*=>[ ]*'([^']+)'"#).unwrap());

static RE_HEAD_CALL: Lazy<Regex> = Lazy::new(|| Regex::new(r"head\([^)]*\);?").unwrap());

static RE_LEGACY_TITLE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"\$pagename[ ]*=[ ]*'([^']+)'").unwrap());

const LEGACY_HEADER_INCLUDE: &str = "require_once('header.php');";
const LEGACY_FOOTER_INCLUDE: &str = "include('footer.php');";

/// A page source with its template calls removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrippedSource {
    /// The source text to write back to disk.
    pub contents: String,
    /// Title from `'title' => "…"` in the template call, entity-decoded.
    pub modern_title: Option<String>,
    /// Title from a legacy `$pagename = '…'` assignment, entity-decoded.
    pub legacy_title: Option<String>,
}

impl StrippedSource {
    /// The declared title; a legacy title wins over a modern one.
    pub fn title(&self) -> Option<&str> {
        self.legacy_title
            .as_deref()
            .or(self.modern_title.as_deref())
    }
}

/// Remove the head-emission call and the legacy header/footer includes.
pub fn strip_template(source: &str) -> StrippedSource {
    let modern_title = RE_MODERN_TITLE_DOUBLE
        .captures(source)
        .or_else(|| RE_MODERN_TITLE_SINGLE.captures(source))
        .map(|caps| decode_entities(&caps[1]));

    let comment = modern_title
        .as_ref()
        .map(|t| title_comment(t))
        .unwrap_or_default();

    let contents = RE_HEAD_CALL
        .replace(source, NoExpand(&comment))
        .replacen(LEGACY_HEADER_INCLUDE, "", 1)
        .replacen(LEGACY_FOOTER_INCLUDE, "", 1);

    let legacy_title = RE_LEGACY_TITLE
        .captures(&contents)
        .map(|caps| decode_entities(&caps[1]));

    StrippedSource {
        contents,
        modern_title,
        legacy_title,
    }
}

/// The comment keeping a title, quoted so a re-run reads the same title back.
fn title_comment(title: &str) -> String {
    if title.contains('"') && !title.contains('\'') {
        format!("// 'title' => '{title}'")
    } else {
        format!("// 'title' => \"{title}\"")
    }
}

fn decode_entities(s: &str) -> String {
    s.replace("&amp;", "&")
}
