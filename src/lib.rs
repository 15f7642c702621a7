// Allow some clippy lints that are too pedantic for this project
#![allow(clippy::too_many_arguments)]
#![allow(clippy::should_implement_trait)]
// Allow unused for tests
#![cfg_attr(test, allow(dead_code))]

//! # PDF Pagekit
//!
//! Page-oriented transformation engine for existing PDF documents.
//!
//! ## Core Features
//!
//! ### Page Operations
//! - **Delete, rotate, reorder** pages in place
//! - **Extract and split** into new documents (pages deep-copied with their resources)
//! - **Merge** several documents in list order
//!
//! ### Content Overlays
//! - **Text**: any of six built-in fonts, placed in top-left caller coordinates
//! - **Highlights**: translucent rectangles
//! - **Covers**: opaque rectangles over a region (display-only redaction)
//! - **Replacements**: overlay new text on pages containing a search string
//! - **Change lists**: JSON arrays of `{page, action, x, y, ...}` records
//!
//! ### Safety Rails
//! - Size, page-count and content-type checks before anything is mutated
//! - Every failure classified as invalid input, corrupted document, resource
//!   exhaustion or service failure
//!
//! ## Architecture
//!
//! ```text
//! bytes + content type
//!     ↓
//! [DocumentValidator] → [PdfDocument] (lopdf object model, owned per call)
//!     ↓
//! editor::page_ops | editor::OverlayWriter | changes::apply_changes
//!     ↓
//! PdfDocument::to_bytes → bytes
//! ```
//!
//! ## Quick Start
//!
//! ```ignore
//! use pdf_pagekit::api::{DocumentInput, PdfEngine};
//!
//! let engine = PdfEngine::default();
//! let (edited, report) = engine.apply_changes_json(
//!     DocumentInput::new(&bytes, "application/pdf"),
//!     r#"[{"page": 1, "action": "add_text", "x": 72, "y": 90, "text": "Jane Doe"}]"#,
//! )?;
//! println!("applied {}, skipped {}", report.applied, report.skipped);
//! ```

#![warn(missing_docs)]

// Error handling
pub mod error;

// Configuration
pub mod config;

// Upload validation
pub mod validator;

// Document handle
pub mod document;

// Coordinates, colors and fonts
pub mod color;
pub mod fonts;
pub mod geometry;

// Content stream generation
pub mod writer;

// Page operations and overlays
pub mod editor;

// Declarative change lists
pub mod changes;

// High-level API
pub mod api;

#[cfg(test)]
pub(crate) mod test_support;

// Re-exports
pub use api::{DocumentInput, PdfEngine};
pub use changes::{ApplyReport, ChangeAction, ChangeRecord};
pub use config::EngineConfig;
pub use document::{DocumentSummary, PdfDocument};
pub use error::{Error, ErrorKind, Result};

// Version info
/// Library version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Library name
pub const NAME: &str = env!("CARGO_PKG_NAME");
