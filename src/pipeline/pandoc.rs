//! pandoc invocation: the only stage that runs an external process.
//!
//! Conversion goes through pandoc's JSON representation so the tree filter
//! can run in-process with an explicit [`crate::filter::FilterConfig`]:
//!
//! ```text
//! pandoc --from html --to json <url>        (stdout → filter)
//! pandoc --from json --to <markdown> -o <md> (stdin ← filter)
//! ```
//!
//! Each call is awaited to completion before the next one starts. A non-zero
//! exit aborts the conversion with pandoc's stderr attached.

use crate::config::ConversionConfig;
use crate::error::{FilterError, MigrateError};
use serde_json::Value;
use std::path::Path;
use std::process::{Output, Stdio};
use tokio::io::AsyncWriteExt;
use tokio::process::Command;
use tracing::{debug, info};

/// Markdown flavour written for converted pages.
pub const MARKDOWN_FORMAT: &str = "markdown_phpextra+backtick_code_blocks";

/// Writer name handed to the tree filter, as pandoc would pass it.
pub const FILTER_FORMAT: &str = "markdown_phpextra";

/// A configured pandoc command.
#[derive(Debug, Clone)]
pub struct Pandoc<'a> {
    command: &'a [String],
    verbose: bool,
}

impl<'a> Pandoc<'a> {
    pub fn new(config: &'a ConversionConfig) -> Self {
        Self {
            command: &config.pandoc_command,
            verbose: config.verbose,
        }
    }

    /// Write pandoc's unfiltered native parse tree of `url` to `ast_path`.
    pub async fn dump_native(&self, url: &str, ast_path: &Path) -> Result<(), MigrateError> {
        let ast = ast_path.to_string_lossy();
        let output = self
            .run(&["--from", "html", "--to", "native", url, "-o", &*ast], None)
            .await?;
        self.log_output(&output.stdout);
        Ok(())
    }

    /// Parse the page at `url` into a pandoc JSON document.
    pub async fn read_html(&self, url: &str) -> Result<Value, MigrateError> {
        let output = self
            .run(&["--from", "html", "--to", "json", url], None)
            .await?;
        let document = serde_json::from_slice(&output.stdout).map_err(FilterError::from)?;
        Ok(document)
    }

    /// Render a pandoc JSON document to Markdown at `output_path`.
    pub async fn write_markdown(
        &self,
        document: &Value,
        output_path: &Path,
    ) -> Result<(), MigrateError> {
        let input = serde_json::to_vec(document).map_err(FilterError::from)?;
        let out = output_path.to_string_lossy();
        let output = self
            .run(
                &["--from", "json", "--to", MARKDOWN_FORMAT, "-o", &*out],
                Some(input),
            )
            .await?;
        self.log_output(&output.stdout);
        Ok(())
    }

    async fn run(&self, args: &[&str], input: Option<Vec<u8>>) -> Result<Output, MigrateError> {
        let (program, prefix) = self.command.split_first().ok_or_else(|| {
            MigrateError::InvalidConfig("pandoc command must name a program".into())
        })?;
        let shown = display_command(self.command, args);
        if self.verbose {
            info!("Executing: {}", shown);
        } else {
            debug!("Executing: {}", shown);
        }

        let spawn_err = |source: std::io::Error| MigrateError::PandocSpawn {
            program: program.clone(),
            source,
        };

        let mut cmd = Command::new(program);
        cmd.args(prefix)
            .args(args)
            .stdin(if input.is_some() {
                Stdio::piped()
            } else {
                Stdio::null()
            })
            .stdout(Stdio::piped())
            .stderr(Stdio::piped());
        let mut child = cmd.spawn().map_err(spawn_err)?;

        let output = match input {
            Some(data) => {
                let mut stdin = child
                    .stdin
                    .take()
                    .ok_or_else(|| MigrateError::Internal("pandoc stdin was not piped".into()))?;
                let feed = async move {
                    stdin.write_all(&data).await?;
                    stdin.shutdown().await?;
                    Ok::<(), std::io::Error>(())
                };
                let (fed, output) = tokio::join!(feed, child.wait_with_output());
                let output = output.map_err(spawn_err)?;
                // A failed write is only interesting when pandoc itself succeeded;
                // otherwise its stderr explains the broken pipe.
                if let Err(e) = fed {
                    if output.status.success() {
                        return Err(MigrateError::Internal(format!(
                            "writing to pandoc stdin failed: {e}"
                        )));
                    }
                }
                output
            }
            None => child.wait_with_output().await.map_err(spawn_err)?,
        };

        let stderr = String::from_utf8_lossy(&output.stderr).trim().to_string();
        if !output.status.success() {
            return Err(MigrateError::PandocFailed {
                command: shown,
                status: output.status.to_string(),
                stderr,
            });
        }
        if !stderr.is_empty() {
            self.log_output(stderr.as_bytes());
        }
        Ok(output)
    }

    fn log_output(&self, bytes: &[u8]) {
        let text = String::from_utf8_lossy(bytes);
        let text = text.trim();
        if text.is_empty() {
            return;
        }
        if self.verbose {
            info!("pandoc: {}", text);
        } else {
            debug!("pandoc: {}", text);
        }
    }
}

/// Render a command line for logs, quoting arguments that need it.
fn display_command(command: &[String], args: &[&str]) -> String {
    command
        .iter()
        .map(String::as_str)
        .chain(args.iter().copied())
        .map(|part| {
            if part.is_empty() || part.contains(|c: char| c.is_whitespace() || c == '"') {
                format!("\"{}\"", part.replace('"', "\\\""))
            } else {
                part.to_string()
            }
        })
        .collect::<Vec<_>>()
        .join(" ")
}
