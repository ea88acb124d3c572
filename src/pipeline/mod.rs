//! Pipeline stages for converting one help-site page.
//!
//! Each submodule implements one step, so each can be tested without pandoc
//! or a running server.
//!
//! ## Data Flow
//!
//! ```text
//! input ──▶ source ──▶ pandoc ──▶ (filter) ──▶ pandoc ──▶ postprocess ──▶ links
//! (paths)   (strip)    (html→json)             (json→md)  (title, <key>)  (audit)
//! ```
//!
//! 1. [`input`]       — map a site location to source/output/ast paths and URL
//! 2. [`source`]      — remove template calls, keep the declared title
//! 3. [`pandoc`]      — run pandoc; the only stage with process I/O
//! 4. [`postprocess`] — frontmatter title and `<key>` restoration
//! 5. [`links`]       — find pages still linking to the old `.php` URL
//!
//! The tree filter between the two pandoc runs lives in [`crate::filter`].

pub mod input;
pub mod links;
pub mod pandoc;
pub mod postprocess;
pub mod source;
