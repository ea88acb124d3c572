//! # help2md
//!
//! Migrate pages of the Keyman help site from PHP/HTML templates to Markdown.
//!
//! ## Why pandoc plus patches?
//!
//! pandoc does the real HTML → Markdown work, but the help site has habits
//! pandoc does not know about: template calls that emit the whole site chrome,
//! titles declared in PHP, `language-` code classes, `.php` link targets, a
//! legacy `body_text` wrapper and `<span class="key">` keyboard markup. This
//! crate strips the templates before pandoc sees the page, rewrites pandoc's
//! document tree in between, and patches the Markdown afterwards.
//!
//! ## Pipeline Overview
//!
//! ```text
//! page.php
//!  │
//!  ├─ 1. Input    resolve <root>/<location>.php, .md, .ast and server URL
//!  ├─ 2. Source   strip head()/header/footer calls, keep the title
//!  ├─ 3. pandoc   fetch the rendered page: html → JSON
//!  ├─ 4. Filter   rewrite code blocks, headers, links, images, wrappers
//!  ├─ 5. pandoc   JSON → markdown_phpextra+backtick_code_blocks
//!  ├─ 6. Polish   frontmatter title, <key> elements
//!  └─ 7. Audit    list pages still linking to page.php
//! ```
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use help2md::{convert_page, ConversionConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ConversionConfig::builder()
//!         .content_root("../help.keyman.com")
//!         .codeblock_language("javascript")
//!         .build()?;
//!     let report = convert_page("developer/engine/web/guide", &config).await?;
//!     println!("{} → {}", report.source.display(), report.output.display());
//!     Ok(())
//! }
//! ```
//!
//! ## Feature Flags
//!
//! | Feature | Default | Description |
//! |---------|---------|-------------|
//! | `cli`   | on      | Enables the `help2md` and `help2md-filter` binaries (clap + anyhow + tracing-subscriber) |

// ── Modules ──────────────────────────────────────────────────────────────

pub mod config;
pub mod convert;
pub mod error;
pub mod filter;
pub mod output;
pub mod pipeline;

// ── Re-exports ───────────────────────────────────────────────────────────

pub use config::{ConversionConfig, ConversionConfigBuilder};
pub use convert::{convert_page, convert_page_sync, convert_pages};
pub use error::{FilterError, MigrateError};
pub use filter::{filter_document, filter_json, FilterConfig};
pub use output::{ConversionReport, TitleSource};
