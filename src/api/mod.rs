//! High-level engine API.
//!
//! Every operation takes the uploaded bytes and their declared content type and
//! returns new bytes (or named parts, for split):
//!
//! ```ignore
//! use pdf_pagekit::api::{DocumentInput, PdfEngine};
//! use pdf_pagekit::geometry::Point;
//!
//! let engine = PdfEngine::default();
//!
//! // Remove the cover page
//! let trimmed = engine.delete_pages(DocumentInput::pdf(&bytes), &[1])?;
//!
//! // Stamp a name in the top-left corner
//! let stamped = engine.add_text(
//!     DocumentInput::pdf(&trimmed),
//!     1,
//!     "Jane Doe",
//!     Point::new(72.0, 72.0),
//!     "helvetica-bold",
//!     16.0,
//!     "#1a1a1a",
//! )?;
//!
//! // One file per section
//! for (name, part) in engine.split_pdf(DocumentInput::pdf(&stamped), &[3, 5])? {
//!     std::fs::write(name, part)?;
//! }
//! ```
//!
//! Failures are [`Error`](crate::Error)s whose [`kind`](crate::Error::kind)
//! tells the caller whether to fix the request, the file, or retry later.

mod engine;

pub use engine::{DocumentInput, PdfEngine};
