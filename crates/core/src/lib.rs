//! Core library for blockhtml
//!
//! This crate implements the **Functional Core** of the blockhtml application,
//! following the Functional Core - Imperative Shell architectural pattern.
//!
//! # Architecture Overview
//!
//! The blockhtml project uses a two-crate architecture to enforce separation of concerns:
//!
//! - **`blockhtml_core`** (this crate): Pure transformation functions with zero I/O
//! - **`blockhtml`**: Reading input, writing output and reporting (the Imperative Shell)
//!
//! The core converts an already materialized block tree (the block format used by
//! Notion-style workspaces) into an HTML fragment. It never fetches children, never
//! limits depth, and never fails a conversion because of one bad block: problems are
//! returned as [`Diagnostic`] values next to the markup.
//!
//! # Module Organization
//!
//! - [`block`]: Typed block tree and decoding from JSON-shaped input
//! - [`rich_text`]: Inline spans (text, mention, equation) and their rendering
//! - [`inline`]: Annotation flags and the fixed order they are applied in
//! - [`escape`]: Escaping of markup-significant characters
//! - [`render`]: The tree walker, list grouping and per-kind block rendering
//! - [`document`]: Top-level entry points and document helpers
//! - [`diagnostic`]: The non-fatal diagnostic channel
//!
//! # Example Usage
//!
//! ```rust
//! use serde_json::json;
//!
//! let blocks = json!([
//!     {
//!         "type": "bulleted_list_item",
//!         "bulleted_list_item": {
//!             "rich_text": [{ "type": "text", "text": { "content": "one" }, "plain_text": "one" }]
//!         }
//!     },
//!     { "type": "unsupported_future_kind", "unsupported_future_kind": {} }
//! ]);
//!
//! let rendered = blockhtml_core::render_value(&blocks);
//!
//! assert_eq!(rendered.html, "<ul><li>one</li></ul>");
//! assert_eq!(rendered.diagnostics.len(), 1);
//! ```

pub mod block;
pub mod diagnostic;
pub mod document;
pub mod error;
pub mod escape;
pub mod inline;
pub mod render;
pub mod rich_text;

pub use block::{Block, BlockContent};
pub use diagnostic::{Diagnostic, DiagnosticKind};
pub use document::{render, render_json_str, render_value, tree_depth, wrap_document, Rendered};
pub use error::Error;
pub use rich_text::RichText;
