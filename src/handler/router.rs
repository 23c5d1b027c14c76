//! Request dispatch module
//!
//! Entry point for HTTP request processing: extracts what the media pipeline
//! needs from the request, runs it, and writes the access log.

use crate::config::AppState;
use crate::error::MediaError;
use crate::handler::media;
use crate::http::{self, MediaBody};
use crate::logger::{self, AccessLogEntry};
use hyper::header::{HeaderName, CONTENT_LENGTH, HOST, RANGE, REFERER, USER_AGENT};
use hyper::{Request, Response};
use std::convert::Infallible;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Instant;

/// The parts of an HTTP request that decide which bytes are served
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MediaRequest {
    pub host: Option<String>,
    /// Raw (still percent-encoded) URI path, without query string
    pub path: String,
    pub range: Option<String>,
}

impl MediaRequest {
    pub fn from_request<B>(req: &Request<B>) -> Self {
        let header = |name: HeaderName| {
            req.headers()
                .get(name)
                .and_then(|v| v.to_str().ok())
                .map(ToString::to_string)
        };

        Self {
            host: header(HOST).or_else(|| req.uri().authority().map(ToString::to_string)),
            path: req.uri().path().to_string(),
            range: header(RANGE),
        }
    }
}

/// Main entry point for HTTP request handling
pub async fn handle_request<B>(
    req: Request<B>,
    state: Arc<AppState>,
    peer_addr: SocketAddr,
) -> Result<Response<MediaBody>, Infallible> {
    let started = Instant::now();
    let media_req = MediaRequest::from_request(&req);

    let response = serve(&media_req, &state).await;

    if let Some(format) = state.access_log {
        let entry = access_entry(&req, &media_req, &response, peer_addr, started);
        logger::log_access(&entry, format);
    }

    Ok(response)
}

/// Run a request through resolution and sending, mapping failures to responses
pub async fn serve(req: &MediaRequest, state: &AppState) -> Response<MediaBody> {
    match serve_media(req, state).await {
        Ok(response) => response,
        Err(err) => {
            log_failure(req, &err);
            http::build_error_response(&err)
        }
    }
}

async fn serve_media(
    req: &MediaRequest,
    state: &AppState,
) -> Result<Response<MediaBody>, MediaError> {
    let file = state.resolver.resolve(&req.path, req.host.as_deref()).await?;
    media::send_file(&file, req.range.as_deref(), state.cache).await
}

fn log_failure(req: &MediaRequest, err: &MediaError) {
    match err {
        MediaError::Io(source) => {
            logger::log_error(&format!("Failed to read '{}': {source}", req.path));
        }
        // Traversal attempts are already logged by the resolver
        _ if err.is_forbidden() => {}
        _ => logger::log_debug(&format!("{} {}: {err}", err.status().as_u16(), req.path)),
    }
}

fn access_entry<B>(
    req: &Request<B>,
    media_req: &MediaRequest,
    response: &Response<MediaBody>,
    peer_addr: SocketAddr,
    started: Instant,
) -> AccessLogEntry {
    let header = |name: HeaderName| {
        req.headers()
            .get(name)
            .and_then(|v| v.to_str().ok())
            .map(ToString::to_string)
    };

    let mut entry = AccessLogEntry::new(
        peer_addr.ip().to_string(),
        req.method().to_string(),
        media_req.path.clone(),
    );
    entry.query = req.uri().query().map(ToString::to_string);
    entry.http_version = format!("{:?}", req.version())
        .trim_start_matches("HTTP/")
        .to_string();
    entry.status = response.status().as_u16();
    entry.body_bytes = response
        .headers()
        .get(CONTENT_LENGTH)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.parse().ok())
        .unwrap_or(0);
    entry.range.clone_from(&media_req.range);
    entry.referer = header(REFERER);
    entry.user_agent = header(USER_AGENT);
    entry.request_time_us = u64::try_from(started.elapsed().as_micros()).unwrap_or(u64::MAX);
    entry
}
