//! Request failure taxonomy
//!
//! Every failure ends the request with a single status code and a short
//! plain-text message. Echoed paths are HTML-escaped.

use hyper::StatusCode;
use std::io;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum MediaError {
    #[error("Media file not specified")]
    NotSpecified,

    #[error("File not found: {}", escape_html(.0))]
    NotFound(String),

    #[error("Not a file: {}", escape_html(.0))]
    NotAFile(String),

    /// Literal parent-directory sequence in the requested path
    #[error("Access denied: Invalid path")]
    Traversal,

    /// Canonical path resolved outside the base directory
    #[error("Access denied: Path outside base directory")]
    OutsideBase,

    /// The file resolved fine but could not be opened or read
    #[error("Failed to read media file")]
    Io(#[from] io::Error),
}

impl MediaError {
    pub const fn status(&self) -> StatusCode {
        match self {
            Self::NotSpecified | Self::NotFound(_) | Self::NotAFile(_) => StatusCode::NOT_FOUND,
            Self::Traversal | Self::OutsideBase => StatusCode::FORBIDDEN,
            Self::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    pub const fn is_forbidden(&self) -> bool {
        matches!(self, Self::Traversal | Self::OutsideBase)
    }
}

/// Escape text for inclusion in an HTML document
pub fn escape_html(s: &str) -> String {
    let mut escaped = String::with_capacity(s.len());
    for c in s.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            '\'' => escaped.push_str("&#039;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
