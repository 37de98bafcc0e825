//! Lossless JSON interchange and editor session for mEEM configuration
//! documents.
//!
//! - [`json`]: encode/decode each document, with load prechecks
//! - [`align`]: save-time `page_aligned_blocks` resolution
//! - [`session`]: the three documents owned together, loaded all-or-nothing

pub mod align;
pub mod error;
pub mod json;
pub mod session;

pub use align::resolve_page_alignment;
pub use error::{CodecError, DocumentKind, Result};
pub use session::Session;
