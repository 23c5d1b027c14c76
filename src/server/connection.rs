// Connection handling module
// Accepts a single TCP connection and serves it with hyper

use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::{TokioIo, TokioTimer};
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Accept a connection if the connection limit allows it.
///
/// # Arguments
///
/// * `stream` - The TCP stream to handle
/// * `peer_addr` - The peer's socket address
/// * `state` - Shared application state
/// * `conn_counter` - Active connection counter
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    conn_counter: &Arc<AtomicUsize>,
) {
    // Increment first, then check, so concurrent accepts cannot overshoot
    let prev_count = conn_counter.fetch_add(1, Ordering::SeqCst);

    if let Some(max_conn) = state.config.performance.max_connections {
        if prev_count >= max_conn {
            conn_counter.fetch_sub(1, Ordering::SeqCst);
            logger::log_warning(&format!(
                "Max connections reached: {prev_count}/{max_conn}. Connection from {peer_addr} rejected."
            ));
            drop(stream);
            return;
        }
    }

    logger::log_connection_accepted(&peer_addr);

    handle_connection(stream, peer_addr, Arc::clone(state), Arc::clone(conn_counter));
}

/// Serve one connection on its own task and release its slot afterwards.
fn handle_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: Arc<AppState>,
    conn_counter: Arc<AtomicUsize>,
) {
    tokio::spawn(async move {
        serve_connection(stream, peer_addr, state).await;
        conn_counter.fetch_sub(1, Ordering::SeqCst);
    });
}

/// Run hyper's HTTP/1 state machine over `stream` until the client is done.
///
/// `performance.connection_timeout` bounds how long the client may take to
/// send request headers, including the idle gap between keep-alive requests.
/// Response bodies are never cut short by it.
async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);
    let timeout_secs = state.config.performance.connection_timeout;

    let mut builder = http1::Builder::new();
    builder.keep_alive(state.config.performance.keep_alive);
    if timeout_secs > 0 {
        builder
            .timer(TokioTimer::new())
            .header_read_timeout(Duration::from_secs(timeout_secs));
    }

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    if let Err(err) = conn.await {
        if err.is_timeout() {
            logger::log_debug(&format!(
                "Connection from {peer_addr} idle for {timeout_secs} seconds, closing"
            ));
        } else {
            logger::log_connection_error(&err);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use tokio::io::{AsyncReadExt, AsyncWriteExt};
    use tokio::net::TcpListener;

    const LARGE_LEN: usize = 16 * 1024 * 1024;

    async fn connected_pair() -> (TcpStream, TcpStream, SocketAddr) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let client = TcpStream::connect(listener.local_addr().unwrap()).await.unwrap();
        let (server, peer_addr) = listener.accept().await.unwrap();
        (client, server, peer_addr)
    }

    #[tokio::test]
    async fn test_slow_download_outlives_timeout() {
        let dir = tempfile::tempdir().unwrap();
        let data: Vec<u8> = (0..LARGE_LEN).map(|i| (i % 251) as u8).collect();
        std::fs::write(dir.path().join("movie.mp4"), &data).unwrap();

        let mut config = Config::load_from("does-not-exist/mediasrv").unwrap();
        config.media.base_dir = dir.path().to_str().unwrap().to_string();
        config.logging.access_log = false;
        config.performance.connection_timeout = 1;
        let state = Arc::new(AppState::new(config).unwrap());

        let (mut client, server, peer_addr) = connected_pair().await;
        let task = tokio::spawn(serve_connection(server, peer_addr, state));

        client
            .write_all(b"GET /movie.mp4 HTTP/1.1\r\nHost: localhost\r\nConnection: close\r\n\r\n")
            .await
            .unwrap();

        // Stall past the timeout while the server still has body left to send
        let mut first = vec![0u8; 4096];
        let n = client.read(&mut first).await.unwrap();
        tokio::time::sleep(Duration::from_millis(2500)).await;

        let mut response = first[..n].to_vec();
        client.read_to_end(&mut response).await.unwrap();

        let head_end = response
            .windows(4)
            .position(|w| w == b"\r\n\r\n")
            .unwrap()
            + 4;
        assert!(response.starts_with(b"HTTP/1.1 200 OK"));
        assert_eq!(response.len() - head_end, LARGE_LEN);
        assert!(response[head_end..] == data[..]);

        task.await.unwrap();
    }
}
