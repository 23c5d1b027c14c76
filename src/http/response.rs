//! HTTP response building module
//!
//! Builders for media and error responses. Every response carries
//! `X-Content-Type-Options: nosniff` and `Accept-Ranges: bytes`.

use crate::error::MediaError;
use crate::http::body::{self, MediaBody};
use crate::http::cache::CachePolicy;
use crate::http::range::ByteRange;
use chrono::Utc;
use hyper::header::{
    ACCEPT_RANGES, CACHE_CONTROL, CONTENT_LENGTH, CONTENT_RANGE, CONTENT_TYPE, EXPIRES,
    X_CONTENT_TYPE_OPTIONS,
};
use hyper::http::response::Builder;
use hyper::{Response, StatusCode};

fn base_builder(status: StatusCode) -> Builder {
    Response::builder()
        .status(status)
        .header(X_CONTENT_TYPE_OPTIONS, "nosniff")
        .header(ACCEPT_RANGES, "bytes")
}

fn media_builder(status: StatusCode, content_type: &str, cache: CachePolicy) -> Builder {
    base_builder(status)
        .header(CONTENT_TYPE, content_type)
        .header(CACHE_CONTROL, cache.cache_control())
        .header(EXPIRES, cache.expires(Utc::now()))
}

/// Build 200 response carrying the whole file
pub fn build_full_response(
    body: MediaBody,
    content_type: &str,
    cache: CachePolicy,
    file_size: u64,
) -> Response<MediaBody> {
    media_builder(StatusCode::OK, content_type, cache)
        .header(CONTENT_LENGTH, file_size)
        .body(body)
        .unwrap_or_else(|e| fallback("200", &e))
}

/// Build 206 Partial Content response for a single range
pub fn build_partial_response(
    body: MediaBody,
    content_type: &str,
    cache: CachePolicy,
    range: ByteRange,
    file_size: u64,
) -> Response<MediaBody> {
    media_builder(StatusCode::PARTIAL_CONTENT, content_type, cache)
        .header(CONTENT_RANGE, range.content_range(file_size))
        .header(CONTENT_LENGTH, range.len())
        .body(body)
        .unwrap_or_else(|e| fallback("206", &e))
}

/// Build 416 Range Not Satisfiable response
///
/// Carries the same content and cache headers as the file it refers to,
/// with an empty body.
pub fn build_416_response(
    content_type: &str,
    cache: CachePolicy,
    file_size: u64,
) -> Response<MediaBody> {
    media_builder(StatusCode::RANGE_NOT_SATISFIABLE, content_type, cache)
        .header(CONTENT_RANGE, format!("bytes */{file_size}"))
        .header(CONTENT_LENGTH, 0)
        .body(body::empty())
        .unwrap_or_else(|e| fallback("416", &e))
}

/// Build the response a failed request terminates with
pub fn build_error_response(error: &MediaError) -> Response<MediaBody> {
    let message = error.to_string();
    base_builder(error.status())
        .header(CONTENT_TYPE, "text/plain; charset=utf-8")
        .header(CONTENT_LENGTH, message.len())
        .body(body::text(message))
        .unwrap_or_else(|e| fallback(error.status().as_str(), &e))
}

/// Log response build error and answer with a bare 500
fn fallback(status: &str, error: &hyper::http::Error) -> Response<MediaBody> {
    crate::logger::log_error(&format!("Failed to build {status} response: {error}"));
    let mut response = Response::new(body::empty());
    *response.status_mut() = StatusCode::INTERNAL_SERVER_ERROR;
    response
}
