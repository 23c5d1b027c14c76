//! Request handler module
//!
//! Resolves request paths to files under the media root and sends them,
//! whole or as a single byte range.

pub mod media;
pub mod resolver;
pub mod router;

// Re-export main entry point
pub use router::{handle_request, MediaRequest};
