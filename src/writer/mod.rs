//! Content stream generation for page overlays.
//!
//! ## Architecture
//!
//! ```text
//! overlay request (text / rectangle)
//!     ↓
//! [ContentStreamBuilder] (operators → bytes, optionally deflated)
//!     ↓
//! new stream object appended to the page's /Contents
//! ```

mod content_stream;

pub use content_stream::{ContentStreamBuilder, ContentStreamOp};
