//! pandoc JSON filter binary.
//!
//! Usable directly as `pandoc --filter help2md-filter`: pandoc passes the
//! output format as the first argument and the document on stdin.

use anyhow::{Context, Result};
use clap::Parser;
use help2md::filter::CODEBLOCK_LANGUAGE_ENV;
use help2md::{filter_json, FilterConfig};
use std::io::{self, BufReader, BufWriter};
use tracing_subscriber::EnvFilter;

#[derive(Parser, Debug)]
#[command(
    name = "help2md-filter",
    version,
    about = "pandoc JSON filter that tidies help-site pages for Markdown output"
)]
struct Cli {
    /// Output format pandoc is targeting.
    #[arg(default_value = "markdown")]
    format: String,

    /// Language for code blocks that carry no language class.
    #[arg(long, env = CODEBLOCK_LANGUAGE_ENV, value_name = "LANGUAGE")]
    codeblock_language: Option<String>,
}

fn main() -> Result<()> {
    let cli = Cli::parse();

    // stdout carries the document; logs go to stderr only.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn")),
        )
        .with_writer(io::stderr)
        .init();

    let config = FilterConfig {
        codeblock_language: cli.codeblock_language.filter(|l| !l.is_empty()),
    };

    let stdin = io::stdin();
    let stdout = io::stdout();
    filter_json(
        BufReader::new(stdin.lock()),
        BufWriter::new(stdout.lock()),
        &cli.format,
        &config,
    )
    .context("Failed to filter pandoc document")?;

    Ok(())
}
