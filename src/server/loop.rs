// Server loop module
// Accepts connections until a shutdown signal arrives

use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;

use super::connection::accept_connection;
use super::signal::wait_for_shutdown;
use crate::config::AppState;
use crate::logger;

/// How long in-flight connections may keep running after shutdown
const DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// Accept connections on `listener` until SIGINT/SIGTERM.
///
/// The listener is closed first, then in-flight connections get up to
/// `DRAIN_TIMEOUT` to finish before the function returns.
pub async fn start_server_loop(listener: TcpListener, state: Arc<AppState>) -> std::io::Result<()> {
    let active_connections = Arc::new(AtomicUsize::new(0));
    let shutdown = wait_for_shutdown();
    tokio::pin!(shutdown);

    loop {
        tokio::select! {
            accept_result = listener.accept() => {
                match accept_result {
                    Ok((stream, peer_addr)) => {
                        accept_connection(stream, peer_addr, &state, &active_connections);
                    }
                    Err(e) => {
                        logger::log_error(&format!("Failed to accept connection: {e}"));
                    }
                }
            }

            signal = &mut shutdown => {
                logger::log_shutdown(signal?);
                break;
            }
        }
    }

    drop(listener);
    drain_connections(&active_connections, DRAIN_TIMEOUT).await;
    Ok(())
}

/// Wait until no connections are active or `timeout` elapses
async fn drain_connections(active: &AtomicUsize, timeout: Duration) {
    let deadline = tokio::time::Instant::now() + timeout;

    loop {
        let remaining = active.load(Ordering::SeqCst);
        if remaining == 0 {
            return;
        }
        if tokio::time::Instant::now() >= deadline {
            logger::log_warning(&format!(
                "Shutting down with {remaining} connection(s) still open"
            ));
            return;
        }
        tokio::time::sleep(Duration::from_millis(50)).await;
    }
}
