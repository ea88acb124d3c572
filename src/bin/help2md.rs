//! CLI binary for help2md.
//!
//! A thin shim over the library crate that maps CLI flags
//! to `ConversionConfig` and prints results.

use anyhow::{Context, Result};
use clap::{ArgAction, Parser};
use help2md::{convert_pages, ConversionConfig, ConversionReport};
use std::io;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

// ── ANSI colour helpers (no extra deps) ──────────────────────────────────────

fn green(s: &str) -> String {
    format!("\x1b[32m{s}\x1b[0m")
}
fn yellow(s: &str) -> String {
    format!("\x1b[33m{s}\x1b[0m")
}
fn dim(s: &str) -> String {
    format!("\x1b[2m{s}\x1b[0m")
}
fn bold(s: &str) -> String {
    format!("\x1b[1m{s}\x1b[0m")
}

const AFTER_HELP: &str = r#"EXAMPLES:
  # Convert a page, keeping the PHP source
  help2md developer/engine/web/guide

  # Convert and delete the source
  help2md --finalize developer/engine/web/guide

  # Inspect pandoc's parse tree alongside the output
  help2md --ast -v developer/engine/web/guide

  # Untagged code blocks on this page are JavaScript
  help2md --codeblock-language javascript developer/engine/web/reference/api

NOTES:
  The help site must be served at --server-url while converting; pandoc
  fetches the rendered page from there. --ast cannot be combined with
  --finalize.
"#;

#[derive(Parser, Debug)]
#[command(
    name = "help2md",
    version,
    about = "Migrate help-site pages from PHP/HTML to Markdown using pandoc",
    long_about = "Convert pages of the help site from PHP/HTML templates to Markdown. \
Each page is fetched from a local server, converted by pandoc with a document-tree \
filter, given a YAML title block and written next to its source as <page>.md.",
    arg_required_else_help = true,
    disable_help_flag = true,
    color = clap::ColorChoice::Auto,
    after_long_help = AFTER_HELP
)]
struct Cli {
    /// Page locations relative to the content root (e.g. developer/17.0/index).
    #[arg(required = true)]
    locations: Vec<String>,

    /// Also write pandoc's unfiltered parse tree to <page>.ast.
    #[arg(long)]
    ast: bool,

    /// Delete the PHP source once the Markdown has been written.
    #[arg(long, visible_alias = "overwrite")]
    finalize: bool,

    /// Language for code blocks that carry no language class.
    #[arg(long, value_name = "LANGUAGE")]
    codeblock_language: Option<String>,

    /// Root directory of the help-site checkout.
    #[arg(long, env = "HELP2MD_CONTENT_ROOT", default_value = help2md::config::DEFAULT_CONTENT_ROOT)]
    content_root: PathBuf,

    /// Base URL of the server rendering the help site.
    #[arg(long, env = "HELP2MD_SERVER_URL", default_value = help2md::config::DEFAULT_SERVER_URL)]
    server_url: String,

    /// pandoc command (may include leading arguments, split on whitespace).
    #[arg(long, env = "HELP2MD_PANDOC", default_value = "pandoc")]
    pandoc: String,

    /// Skip searching the site for pages still linking to the old .php URL.
    #[arg(long)]
    no_link_check: bool,

    /// Print conversion reports as JSON on stdout.
    #[arg(long)]
    json: bool,

    /// Log pandoc commands and their output (debug-level logging).
    #[arg(short, long, conflicts_with = "quiet")]
    verbose: bool,

    /// Only log errors.
    #[arg(short, long)]
    quiet: bool,

    /// Print help.
    #[arg(short = 'h', long, short_alias = '?', action = ArgAction::Help)]
    help: Option<bool>,
}

#[tokio::main(flavor = "current_thread")]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    // ── Logging setup ────────────────────────────────────────────────────
    let filter = if cli.quiet {
        "error"
    } else if cli.verbose {
        "debug"
    } else {
        "info"
    };

    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(filter)),
        )
        .with_writer(io::stderr)
        .init();

    // ── Build config ─────────────────────────────────────────────────────
    let config = build_config(&cli)?;

    // ── Run conversion ───────────────────────────────────────────────────
    let reports = convert_pages(&cli.locations, &config)
        .await
        .context("Conversion failed")?;

    if cli.json {
        let json = serde_json::to_string_pretty(&reports).context("Failed to serialise reports")?;
        println!("{json}");
    } else if !cli.quiet {
        for report in &reports {
            print_report(report);
        }
    }

    Ok(())
}

/// Map CLI args to `ConversionConfig`.
fn build_config(cli: &Cli) -> Result<ConversionConfig> {
    let mut builder = ConversionConfig::builder()
        .content_root(&cli.content_root)
        .server_url(&cli.server_url)
        .pandoc_command(cli.pandoc.split_whitespace())
        .ast(cli.ast)
        .finalize(cli.finalize)
        .verbose(cli.verbose)
        .link_check(!cli.no_link_check);

    if let Some(language) = &cli.codeblock_language {
        builder = builder.codeblock_language(language);
    }

    builder.build().context("Invalid configuration")
}

fn print_report(report: &ConversionReport) {
    eprintln!(
        "{}  {}  →  {}  {}",
        green("✔"),
        report.location,
        bold(&report.output.display().to_string()),
        dim(&format!("{}ms", report.duration_ms)),
    );

    if !report.referencing_pages.is_empty() {
        eprintln!(
            "{} Paths detected with possible link to {}:",
            yellow("⚠"),
            report.source.display()
        );
        for path in &report.referencing_pages {
            eprintln!("- {}", path.display());
        }
    }
}
