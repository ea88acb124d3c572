//! Integration tests for page conversion.
//!
//! pandoc is replaced by a small shell script so these run anywhere `sh` is
//! available. The script serves a canned JSON document for `--to json`,
//! records the filtered document it receives on stdin, and writes a canned
//! Markdown file to `-o`.

use help2md::{convert_page, ConversionConfig, MigrateError, TitleSource};
use serde_json::{json, Value};
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

// ── Test helpers ─────────────────────────────────────────────────────────────

const FAKE_PANDOC: &str = r#"#!/bin/sh
dir="$(dirname "$0")"
to=""
out=""
while [ $# -gt 0 ]; do
  case "$1" in
    --to) to="$2"; shift 2 ;;
    -o) out="$2"; shift 2 ;;
    *) shift ;;
  esac
done
case "$to" in
  json) cat "$dir/page.json" ;;
  native) echo '[ Para [ Str "native" ] ]' > "$out" ;;
  *) cat > "$dir/filtered.json"; cp "$dir/page.md" "$out" ;;
esac
"#;

/// A content root plus a scripted pandoc stand-in.
struct Site {
    _dir: TempDir,
    root: PathBuf,
    fake: PathBuf,
}

impl Site {
    fn new() -> Self {
        let dir = tempfile::tempdir().unwrap();
        // The temp dir name starts with '.', which the link audit skips.
        let root = dir.path().join("site");
        let fake = dir.path().join("fake");
        fs::create_dir_all(&root).unwrap();
        fs::create_dir_all(&fake).unwrap();
        fs::write(fake.join("pandoc.sh"), FAKE_PANDOC).unwrap();
        fs::write(fake.join("page.json"), sample_document().to_string()).unwrap();
        fs::write(fake.join("page.md"), "Converted body.\n").unwrap();
        Self {
            _dir: dir,
            root,
            fake,
        }
    }

    fn page(&self, location: &str, contents: &str) -> PathBuf {
        let path = self.root.join(location).with_extension("php");
        fs::create_dir_all(path.parent().unwrap()).unwrap();
        fs::write(&path, contents).unwrap();
        path
    }

    fn converted_markdown(&self, markdown: &str) {
        fs::write(self.fake.join("page.md"), markdown).unwrap();
    }

    fn filtered(&self) -> Value {
        let text = fs::read_to_string(self.fake.join("filtered.json")).unwrap();
        serde_json::from_str(&text).unwrap()
    }

    fn config(&self) -> help2md::ConversionConfigBuilder {
        ConversionConfig::builder()
            .content_root(&self.root)
            .server_url("http://localhost:8055/")
            .pandoc_command([
                "sh".to_string(),
                self.fake.join("pandoc.sh").display().to_string(),
            ])
    }
}

fn sample_document() -> Value {
    json!({
        "pandoc-api-version": [1, 23, 1],
        "meta": {},
        "blocks": [
            {"t": "Header", "c": [1, ["intro", ["title"], [["data-x", "1"]]], [{"t": "Str", "c": "Intro"}]]},
            {"t": "Div", "c": [["", ["body_text"], []], [
                {"t": "CodeBlock", "c": [["", [], []], "let x = 1;"]},
                {"t": "Para", "c": [
                    {"t": "Link", "c": [["", [], []], [{"t": "Str", "c": "see"}], ["../sub.folder/page.php#section", "Tooltip"]]}
                ]}
            ]]},
            {"t": "CodeBlock", "c": [["", ["language-js"], []], "x"]},
            {"t": "Div", "c": [["", ["note"], []], [{"t": "Para", "c": [{"t": "Str", "c": "kept"}]}]]}
        ]
    })
}

const MODERN_PAGE: &str = r#"<?php
  require_once('includes/template.php');
  head([
    'title' => "Keyman &amp; Friends"
  ]);
?>
<p>Body</p>
"#;

fn read(path: &Path) -> String {
    fs::read_to_string(path).unwrap()
}

// ── Tests ────────────────────────────────────────────────────────────────────

#[tokio::test]
async fn template_title_becomes_frontmatter() {
    let site = Site::new();
    let source = site.page("products/guide", MODERN_PAGE);
    site.converted_markdown("Press <span class=\"key\">Enter</span> to start.\n");

    let config = site.config().build().unwrap();
    let report = convert_page("products/guide", &config).await.unwrap();

    assert_eq!(report.output, site.root.join("products/guide.md"));
    assert_eq!(report.title.as_deref(), Some("Keyman & Friends"));
    assert_eq!(report.title_source, TitleSource::Template);
    assert_eq!(
        read(&report.output),
        "---\ntitle: Keyman & Friends\n---\nPress <key>Enter</key> to start.\n"
    );

    // Source stays, stripped of the template call but remembering the title.
    let stripped = read(&source);
    assert!(stripped.contains("// 'title' => \"Keyman & Friends\""));
    assert!(!stripped.contains("head(["));
    assert!(!report.source_deleted);
    assert!(report.ast.is_none());
}

#[tokio::test]
async fn heading_line_becomes_title() {
    let site = Site::new();
    site.page("intro", "<?php head(); ?>\n<h1>Welcome</h1>\n");
    site.converted_markdown("# Welcome\n\nFirst paragraph.\n");

    let config = site.config().build().unwrap();
    let report = convert_page("intro.php", &config).await.unwrap();

    assert_eq!(report.title_source, TitleSource::Heading);
    assert_eq!(
        read(&report.output),
        "---\ntitle: Welcome\n---\n\nFirst paragraph.\n"
    );
}

#[tokio::test]
async fn legacy_title_takes_precedence() {
    let site = Site::new();
    site.page(
        "old/page",
        "<?php\n$pagename = 'Legacy &amp; Title';\nrequire_once('header.php');\n?>\n<h1>Heading</h1>\n<?php include('footer.php'); ?>\n",
    );
    site.converted_markdown("# Heading\n\nText.\n");

    let config = site.config().build().unwrap();
    let report = convert_page("old/page", &config).await.unwrap();

    assert_eq!(report.title.as_deref(), Some("Legacy & Title"));
    assert_eq!(report.title_source, TitleSource::Legacy);
    assert_eq!(
        read(&report.output),
        "---\ntitle: Legacy & Title\n---\n# Heading\n\nText.\n"
    );
}

#[tokio::test]
async fn untitled_page_is_written_without_frontmatter() {
    let site = Site::new();
    site.page("plain", "<p>No title anywhere</p>\n");
    site.converted_markdown("No title anywhere\n");

    let config = site.config().build().unwrap();
    let report = convert_page("plain", &config).await.unwrap();

    assert_eq!(report.title, None);
    assert_eq!(report.title_source, TitleSource::Unknown);
    assert_eq!(read(&report.output), "No title anywhere\n");
}

#[tokio::test]
async fn tree_filter_runs_between_pandoc_calls() {
    let site = Site::new();
    site.page("filtered", MODERN_PAGE);

    let config = site
        .config()
        .codeblock_language("javascript")
        .build()
        .unwrap();
    convert_page("filtered", &config).await.unwrap();

    let doc = site.filtered();
    let blocks = doc["blocks"].as_array().unwrap();

    // body_text wrapper unwrapped, other divs kept
    assert_eq!(blocks.len(), 5);
    assert_eq!(blocks[0]["c"][1], json!(["", [], []]));
    assert_eq!(
        blocks[1],
        json!({"t": "CodeBlock", "c": [["code-block-indentation-prevention", ["javascript"], []], "let x = 1;"]})
    );
    let link = &blocks[2]["c"][0]["c"];
    assert_eq!(link[2], json!(["../sub.folder/page#section", ""]));
    assert_eq!(blocks[3]["c"][0][1], json!(["js"]));
    assert_eq!(blocks[4]["t"], "Div");
    assert_eq!(blocks[4]["c"][0][1], json!(["note"]));
}

#[tokio::test]
async fn ast_mode_writes_parse_tree() {
    let site = Site::new();
    let source = site.page("diag", MODERN_PAGE);

    let config = site.config().ast(true).build().unwrap();
    let report = convert_page("diag", &config).await.unwrap();

    let ast = report.ast.expect("ast path reported");
    assert_eq!(ast, site.root.join("diag.ast"));
    assert!(read(&ast).contains("native"));
    assert!(report.output.exists());
    assert!(source.exists());
}

#[tokio::test]
async fn ast_with_finalize_produces_nothing() {
    let site = Site::new();
    let source = site.page("both", MODERN_PAGE);

    let mut config = site.config().build().unwrap();
    config.ast = true;
    config.finalize = true;

    let err = convert_page("both", &config).await.unwrap_err();
    assert!(matches!(err, MigrateError::ConflictingModes));
    assert_eq!(read(&source), MODERN_PAGE);
    assert!(!site.root.join("both.md").exists());
    assert!(!site.root.join("both.ast").exists());
}

#[tokio::test]
async fn finalize_deletes_source() {
    let site = Site::new();
    let source = site.page("done", MODERN_PAGE);

    let config = site.config().finalize(true).build().unwrap();
    let report = convert_page("done", &config).await.unwrap();

    assert!(report.source_deleted);
    assert!(!source.exists());
    assert!(report.output.exists());
}

#[tokio::test]
async fn missing_source_fails_without_output() {
    let site = Site::new();
    let config = site.config().build().unwrap();

    let err = convert_page("nowhere/page", &config).await.unwrap_err();
    match err {
        MigrateError::SourceNotFound { path } => {
            assert_eq!(path, site.root.join("nowhere/page.php"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!site.root.join("nowhere/page.md").exists());
}

#[tokio::test]
async fn rerun_is_idempotent() {
    let site = Site::new();
    let source = site.page("again", MODERN_PAGE);
    site.converted_markdown("Body\n");

    let config = site.config().build().unwrap();
    convert_page("again", &config).await.unwrap();
    let first_source = read(&source);
    let first_output = read(&site.root.join("again.md"));

    let report = convert_page("again", &config).await.unwrap();
    assert_eq!(read(&source), first_source);
    assert_eq!(read(&report.output), first_output);
    assert_eq!(report.title.as_deref(), Some("Keyman & Friends"));
}

#[tokio::test]
async fn stale_output_is_replaced() {
    let site = Site::new();
    site.page("stale", MODERN_PAGE);
    fs::write(site.root.join("stale.md"), "old conversion that should vanish").unwrap();

    let config = site.config().build().unwrap();
    let report = convert_page("stale", &config).await.unwrap();
    assert!(!read(&report.output).contains("old conversion"));
}

#[tokio::test]
async fn link_audit_reports_recent_referencing_pages() {
    let site = Site::new();
    site.page("developer/17.0/target", MODERN_PAGE);
    site.page(
        "developer/17.0/index",
        r#"<a href="target.php#usage">Target</a>"#,
    );
    site.page("developer/15.0/index", r#"<a href="../17.0/target.php">"#);
    site.page("products/index", r#"<a href='/developer/17.0/target.php'>"#);
    site.page("products/other", r#"<a href="untarget.php">"#);

    let config = site.config().build().unwrap();
    let report = convert_page("developer/17.0/target", &config).await.unwrap();
    assert_eq!(
        report.referencing_pages,
        vec![
            PathBuf::from("developer/17.0/index.php"),
            PathBuf::from("products/index.php"),
        ]
    );

    let config = site.config().link_check(false).build().unwrap();
    let report = convert_page("developer/17.0/target", &config).await.unwrap();
    assert!(report.referencing_pages.is_empty());
}

#[tokio::test]
async fn failing_pandoc_aborts_conversion() {
    let site = Site::new();
    site.page("broken", MODERN_PAGE);
    let script = site.fake.join("broken.sh");
    fs::write(&script, "echo 'could not fetch page' >&2\nexit 2\n").unwrap();

    let config = site
        .config()
        .pandoc_command(["sh".to_string(), script.display().to_string()])
        .build()
        .unwrap();
    let err = convert_page("broken", &config).await.unwrap_err();
    match err {
        MigrateError::PandocFailed { stderr, .. } => {
            assert!(stderr.contains("could not fetch page"));
        }
        other => panic!("unexpected error: {other}"),
    }
    assert!(!site.root.join("broken.md").exists());
}

#[test]
fn sync_wrapper_converts() {
    let site = Site::new();
    site.page("sync", MODERN_PAGE);
    let config = site.config().build().unwrap();
    let report = help2md::convert_page_sync("sync", &config).unwrap();
    assert!(report.output.exists());
}

/// Real pandoc against a running help-site server.
///
/// Run with:
///   E2E_ENABLED=1 HELP2MD_E2E_PAGE=developer/index cargo test --test convert -- --nocapture
#[tokio::test]
async fn e2e_real_pandoc() {
    if std::env::var("E2E_ENABLED").is_err() {
        println!("SKIP — set E2E_ENABLED=1 to run e2e tests");
        return;
    }
    let Ok(page) = std::env::var("HELP2MD_E2E_PAGE") else {
        println!("SKIP — set HELP2MD_E2E_PAGE to a page location");
        return;
    };
    let root = std::env::var("HELP2MD_CONTENT_ROOT")
        .unwrap_or_else(|_| help2md::config::DEFAULT_CONTENT_ROOT.to_string());

    let config = ConversionConfig::builder()
        .content_root(root)
        .verbose(true)
        .build()
        .unwrap();
    let report = convert_page(&page, &config).await.unwrap();
    let md = read(&report.output);
    assert!(!md.trim().is_empty(), "converted page is empty");
    assert!(!md.contains("<span class=\"key\">"));
    println!("{}", serde_json::to_string_pretty(&report).unwrap());
}
