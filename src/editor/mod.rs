//! Editing operations on loaded documents.
//!
//! ## Architecture
//!
//! ```text
//! PdfDocument (exclusively owned by one operation)
//!     ↓
//! page_ops      delete / rotate / reorder (in place)
//!               extract / split / merge (new documents, via PageImporter)
//! overlay       text, highlights and covers appended to page content
//!     ↓
//! PdfDocument::to_bytes
//! ```
//!
//! Page numbers are 1-based everywhere in this module.

mod import;
mod overlay;
mod page_ops;

pub use import::PageImporter;
pub use overlay::{OverlayWriter, TextStyle};
pub use page_ops::{
    delete_pages, extract_pages, merge_pdfs, parse_rotations, reorder_pages, rotate_pages,
    split_pdf, split_ranges, Rotation,
};
