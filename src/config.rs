//! Configuration types for page migration.
//!
//! All conversion behaviour is controlled through [`ConversionConfig`], built
//! via its [`ConversionConfigBuilder`]. The builder is the only place that
//! validates option combinations, so callers that go through it can never
//! start a run that would have to abort half-way.

use crate::error::MigrateError;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Default location of the help-site checkout, relative to the working directory.
pub const DEFAULT_CONTENT_ROOT: &str = "../help.keyman.com";

/// Default local server that renders the content root.
pub const DEFAULT_SERVER_URL: &str = "http://localhost:8055";

/// Pages under version folders older than this major version are not reported
/// by the link audit.
pub const LINK_AUDIT_MIN_MAJOR_VERSION: u32 = 16;

/// Configuration for migrating one or more pages.
///
/// # Example
/// ```rust
/// use help2md::ConversionConfig;
///
/// let config = ConversionConfig::builder()
///     .content_root("/srv/help.keyman.com")
///     .codeblock_language("javascript")
///     .finalize(true)
///     .build()
///     .unwrap();
/// assert!(config.finalize);
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ConversionConfig {
    /// Root of the site checkout holding the `.php` sources. Default: `../help.keyman.com`.
    pub content_root: PathBuf,

    /// Base URL of the local server rendering `content_root`. Default: `http://localhost:8055`.
    ///
    /// pandoc fetches the rendered page from here rather than reading the
    /// template source, so the server must be running during conversion.
    pub server_url: String,

    /// Command used to run pandoc, program first. Default: `["pandoc"]`.
    pub pandoc_command: Vec<String>,

    /// Also write pandoc's unfiltered parse tree to `<page>.ast`. Default: false.
    pub ast: bool,

    /// Delete the source page once converted. Default: false.
    pub finalize: bool,

    /// Language assigned to code blocks that carry none.
    pub codeblock_language: Option<String>,

    /// Log pandoc commands and their output. Default: false.
    pub verbose: bool,

    /// Scan the content root for pages linking to the converted page. Default: true.
    pub link_check: bool,
}

impl Default for ConversionConfig {
    fn default() -> Self {
        Self {
            content_root: PathBuf::from(DEFAULT_CONTENT_ROOT),
            server_url: DEFAULT_SERVER_URL.to_string(),
            pandoc_command: vec!["pandoc".to_string()],
            ast: false,
            finalize: false,
            codeblock_language: None,
            verbose: false,
            link_check: true,
        }
    }
}

impl ConversionConfig {
    /// Create a new builder for `ConversionConfig`.
    pub fn builder() -> ConversionConfigBuilder {
        ConversionConfigBuilder {
            config: Self::default(),
        }
    }

    /// Check option combinations that cannot be honoured.
    ///
    /// Called by the builder and again at the start of every conversion,
    /// because the fields are public and may be changed after building.
    pub fn validate(&self) -> Result<(), MigrateError> {
        if self.ast && self.finalize {
            return Err(MigrateError::ConflictingModes);
        }
        if self.pandoc_command.first().is_none_or(|p| p.is_empty()) {
            return Err(MigrateError::InvalidConfig(
                "pandoc command must name a program".into(),
            ));
        }
        if self.server_url.trim().is_empty() {
            return Err(MigrateError::InvalidConfig(
                "server URL must not be empty".into(),
            ));
        }
        Ok(())
    }
}

/// Builder for [`ConversionConfig`].
#[derive(Debug)]
pub struct ConversionConfigBuilder {
    config: ConversionConfig,
}

impl ConversionConfigBuilder {
    pub fn content_root(mut self, root: impl Into<PathBuf>) -> Self {
        self.config.content_root = root.into();
        self
    }

    pub fn server_url(mut self, url: impl Into<String>) -> Self {
        self.config.server_url = url.into().trim_end_matches('/').to_string();
        self
    }

    /// Program to run as pandoc, e.g. `"pandoc"` or `"/opt/pandoc/bin/pandoc"`.
    pub fn pandoc(mut self, program: impl Into<String>) -> Self {
        self.config.pandoc_command = vec![program.into()];
        self
    }

    /// Full pandoc command line prefix, e.g. `["docker", "run", "pandoc/core"]`.
    pub fn pandoc_command<I, S>(mut self, command: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.config.pandoc_command = command.into_iter().map(Into::into).collect();
        self
    }

    pub fn ast(mut self, v: bool) -> Self {
        self.config.ast = v;
        self
    }

    pub fn finalize(mut self, v: bool) -> Self {
        self.config.finalize = v;
        self
    }

    pub fn codeblock_language(mut self, language: impl Into<String>) -> Self {
        let language = language.into();
        self.config.codeblock_language = (!language.is_empty()).then_some(language);
        self
    }

    pub fn verbose(mut self, v: bool) -> Self {
        self.config.verbose = v;
        self
    }

    pub fn link_check(mut self, v: bool) -> Self {
        self.config.link_check = v;
        self
    }

    /// Build the configuration, validating constraints.
    pub fn build(self) -> Result<ConversionConfig, MigrateError> {
        self.config.validate()?;
        Ok(self.config)
    }
}
