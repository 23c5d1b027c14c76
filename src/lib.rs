//! Static media file server
//!
//! Serves files from a single base directory over HTTP/1.1 with safe path
//! resolution, extension-based content types, long-lived cache headers and
//! single byte-range support for seeking in audio and video.

pub mod config;
pub mod error;
pub mod handler;
pub mod http;
pub mod logger;
pub mod server;
