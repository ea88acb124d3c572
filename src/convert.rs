//! Page conversion entry points.
//!
//! [`convert_page`] runs every step for one page, in order:
//!
//! 1. resolve paths, fail if the `.php` source is missing
//! 2. strip template calls from the source and write it back
//! 3. remove any previous `.md` output
//! 4. optionally dump pandoc's unfiltered parse tree to `.ast`
//! 5. html → pandoc JSON → tree filter → Markdown
//! 6. frontmatter title and `<key>` restoration
//! 7. link audit over the content root
//! 8. optionally delete the source
//!
//! A failure part-way leaves the stripped source on disk. That is harmless:
//! stripping is idempotent, so the next run starts from the same input.

use crate::config::ConversionConfig;
use crate::error::MigrateError;
use crate::filter::{self, FilterConfig};
use crate::output::ConversionReport;
use crate::pipeline::{input, links, pandoc, postprocess, source};
use std::path::Path;
use std::time::Instant;
use tracing::{debug, info, warn};

/// Convert one page of the help site to Markdown.
///
/// # Arguments
/// * `location` — page path relative to the content root, e.g.
///   `developer/17.0/guides/index` (an extension is ignored)
/// * `config` — conversion configuration
///
/// # Errors
/// - [`MigrateError::ConflictingModes`] if `ast` and `finalize` are both set;
///   nothing is touched in that case
/// - [`MigrateError::SourceNotFound`] if the `.php` source does not exist
/// - I/O, pandoc and filter failures
pub async fn convert_page(
    location: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionReport, MigrateError> {
    let start = Instant::now();
    config.validate()?;

    // ── Step 1: Resolve paths ────────────────────────────────────────────
    let paths = input::resolve_page(location.as_ref(), config)?;
    info!("Converting {} ({})", paths.location, paths.source.display());

    // ── Step 2: Strip template calls ─────────────────────────────────────
    let original = read_text(&paths.source).await?;
    let stripped = source::strip_template(&original);
    if stripped.contents != original {
        write_text(&paths.source, &stripped.contents).await?;
        debug!("Stripped template calls from {}", paths.source.display());
    }

    // ── Step 3: Remove stale output ──────────────────────────────────────
    remove_if_exists(&paths.output).await?;

    let pandoc = pandoc::Pandoc::new(config);

    // ── Step 4: Diagnostic parse tree ────────────────────────────────────
    if config.ast {
        pandoc.dump_native(&paths.url, &paths.ast).await?;
        info!("Wrote parse tree to {}", paths.ast.display());
    }

    // ── Step 5: Convert through the tree filter ──────────────────────────
    let document = pandoc.read_html(&paths.url).await?;
    let filter_config = FilterConfig {
        codeblock_language: config.codeblock_language.clone(),
    };
    let filtered = filter::filter_document(document, pandoc::FILTER_FORMAT, &filter_config)?;
    pandoc.write_markdown(&filtered, &paths.output).await?;

    // ── Step 6: Title and markup post-processing ─────────────────────────
    let converted = read_text(&paths.output).await?;
    let page = postprocess::finish_page(&converted, &stripped);
    if page.title.is_none() {
        warn!("Could not determine the title of {}", paths.location);
    }
    write_text(&paths.output, &page.markdown).await?;
    info!("Wrote {}", paths.output.display());

    // ── Step 7: Link audit ───────────────────────────────────────────────
    let referencing_pages = if config.link_check {
        let pages = links::find_referencing_pages(&config.content_root, &paths.name).await?;
        debug!("{} pages link to {}.php", pages.len(), paths.name);
        pages
    } else {
        Vec::new()
    };

    // ── Step 8: Finalize ─────────────────────────────────────────────────
    if config.finalize {
        tokio::fs::remove_file(&paths.source)
            .await
            .map_err(|e| MigrateError::io(&paths.source, e))?;
        info!("Deleted {}", paths.source.display());
    }

    Ok(ConversionReport {
        location: paths.location,
        ast: config.ast.then_some(paths.ast),
        source: paths.source,
        output: paths.output,
        title: page.title,
        title_source: page.title_source,
        referencing_pages,
        source_deleted: config.finalize,
        duration_ms: start.elapsed().as_millis() as u64,
    })
}

/// Convert several pages one after another, stopping at the first failure.
pub async fn convert_pages<I, S>(
    locations: I,
    config: &ConversionConfig,
) -> Result<Vec<ConversionReport>, MigrateError>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    let mut reports = Vec::new();
    for location in locations {
        reports.push(convert_page(location, config).await?);
    }
    Ok(reports)
}

/// Synchronous wrapper around [`convert_page`].
///
/// Creates a single-threaded tokio runtime internally.
pub fn convert_page_sync(
    location: impl AsRef<str>,
    config: &ConversionConfig,
) -> Result<ConversionReport, MigrateError> {
    tokio::runtime::Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|e| MigrateError::Internal(format!("Failed to create tokio runtime: {}", e)))?
        .block_on(convert_page(location, config))
}

// ── Internal helpers ─────────────────────────────────────────────────────

async fn read_text(path: &Path) -> Result<String, MigrateError> {
    tokio::fs::read_to_string(path)
        .await
        .map_err(|e| MigrateError::io(path, e))
}

/// Write via a temp file and rename, so readers never see a partial file.
async fn write_text(path: &Path, contents: &str) -> Result<(), MigrateError> {
    let tmp_path = path.with_extension("help2md.tmp");
    tokio::fs::write(&tmp_path, contents)
        .await
        .map_err(|e| MigrateError::io(path, e))?;
    tokio::fs::rename(&tmp_path, path)
        .await
        .map_err(|e| MigrateError::io(path, e))
}

async fn remove_if_exists(path: &Path) -> Result<(), MigrateError> {
    match tokio::fs::remove_file(path).await {
        Ok(()) => {
            debug!("Removed previous conversion {}", path.display());
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
        Err(e) => Err(MigrateError::io(path, e)),
    }
}
