//! Error types for the help2md library.
//!
//! Two error types reflect the two processes involved in a migration:
//!
//! * [`MigrateError`] — raised by the page converter. The user-facing fatal
//!   conditions (missing source page, conflicting modes) live here next to
//!   the I/O and pandoc failures that abort a run.
//!
//! * [`FilterError`] — raised by the tree filter when the document handed
//!   over by pandoc cannot be read, or a node does not have the shape pandoc
//!   documents for its tag.
//!
//! A title that cannot be determined is *not* an error: the page is still
//! written, and a warning is logged instead.

use std::path::PathBuf;
use thiserror::Error;

/// All fatal errors returned by the page converter.
#[derive(Debug, Error)]
pub enum MigrateError {
    // ── Input errors ──────────────────────────────────────────────────────
    /// The PHP/HTML source for the page does not exist.
    #[error("Original PHP/HTML source for the page ({path}) does not exist!")]
    SourceNotFound { path: PathBuf },

    /// `--ast` and `--finalize` were requested together.
    #[error(
        "--ast and --finalize mode are both set. As AST mode is used to diagnose \
automation issues with page conversion, this is considered an error. Aborting."
    )]
    ConflictingModes,

    // ── Config errors ─────────────────────────────────────────────────────
    /// Builder validation failed.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    // ── I/O errors ────────────────────────────────────────────────────────
    /// Reading, writing or removing a file failed.
    #[error("I/O error on '{path}': {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    // ── pandoc errors ─────────────────────────────────────────────────────
    /// The pandoc process could not be started at all.
    #[error("Failed to run `{program}`: {source}\nIs pandoc installed and on PATH? See --pandoc.")]
    PandocSpawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    /// pandoc ran but exited unsuccessfully.
    #[error("`{command}` exited with {status}\n{stderr}")]
    PandocFailed {
        command: String,
        status: String,
        stderr: String,
    },

    /// The tree filter rejected the document pandoc produced.
    #[error("Tree filter failed: {0}")]
    Filter(#[from] FilterError),

    // ── Catch-all ─────────────────────────────────────────────────────────
    /// Unexpected internal error.
    #[error("Internal error: {0}")]
    Internal(String),
}

impl MigrateError {
    /// Wrap an I/O error with the path it concerns.
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        MigrateError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Errors raised while filtering a pandoc document tree.
#[derive(Debug, Error)]
pub enum FilterError {
    /// The document is not valid pandoc JSON.
    #[error("invalid pandoc JSON: {0}")]
    Json(#[from] serde_json::Error),

    /// A node carries a known tag but its content has an unexpected shape.
    #[error("malformed {tag} node: {detail}")]
    MalformedNode { tag: String, detail: String },

    /// Reading the document or writing the result failed.
    #[error("filter I/O error: {0}")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn source_not_found_names_path() {
        let e = MigrateError::SourceNotFound {
            path: PathBuf::from("/site/developer/index.php"),
        };
        assert!(e.to_string().contains("/site/developer/index.php"));
    }

    #[test]
    fn conflicting_modes_mentions_both_flags() {
        let msg = MigrateError::ConflictingModes.to_string();
        assert!(msg.contains("--ast"), "got: {msg}");
        assert!(msg.contains("--finalize"), "got: {msg}");
    }

    #[test]
    fn pandoc_failed_display() {
        let e = MigrateError::PandocFailed {
            command: "pandoc --from json".into(),
            status: "exit status: 64".into(),
            stderr: "Unknown reader".into(),
        };
        let msg = e.to_string();
        assert!(msg.contains("exit status: 64"));
        assert!(msg.contains("Unknown reader"));
    }

    #[test]
    fn filter_error_converts() {
        let inner = FilterError::MalformedNode {
            tag: "Link".into(),
            detail: "missing target".into(),
        };
        let e: MigrateError = inner.into();
        assert!(e.to_string().contains("malformed Link node"));
    }
}
