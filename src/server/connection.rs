// Connection handling module
// Admits accepted TCP connections and serves each one on its own task

use hyper::server::conn::http1;
use hyper::service::service_fn;
use hyper_util::rt::TokioIo;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;

use crate::config::AppState;
use crate::handler;
use crate::logger;

/// Counts open connections against `performance.max_connections`
#[derive(Debug, Clone, Default)]
pub struct ConnectionLimit {
    active: Arc<AtomicUsize>,
    max: Option<u64>,
}

/// Releases its slot when dropped
#[derive(Debug)]
pub struct ConnectionGuard {
    active: Arc<AtomicUsize>,
}

impl Drop for ConnectionGuard {
    fn drop(&mut self) {
        self.active.fetch_sub(1, Ordering::SeqCst);
    }
}

impl ConnectionLimit {
    pub fn new(max: Option<u64>) -> Self {
        Self {
            active: Arc::new(AtomicUsize::new(0)),
            max,
        }
    }

    /// Take a slot, or `None` when the limit is reached
    pub fn try_acquire(&self) -> Option<ConnectionGuard> {
        // Increment first so two racing accepts cannot both see a free slot
        let prev = self.active.fetch_add(1, Ordering::SeqCst);
        let guard = ConnectionGuard {
            active: Arc::clone(&self.active),
        };
        match self.max {
            Some(max) if prev >= usize::try_from(max).unwrap_or(usize::MAX) => None,
            _ => Some(guard),
        }
    }

    pub fn active(&self) -> usize {
        self.active.load(Ordering::SeqCst)
    }

    pub const fn max(&self) -> Option<u64> {
        self.max
    }
}

/// Admit a connection and spawn a task serving it
///
/// Connections over the limit are closed immediately.
pub fn accept_connection(
    stream: TcpStream,
    peer_addr: SocketAddr,
    state: &Arc<AppState>,
    limit: &ConnectionLimit,
) {
    let Some(guard) = limit.try_acquire() else {
        if let Some(max) = limit.max() {
            logger::log_connection_limit(max);
        }
        drop(stream);
        return;
    };

    if state.access_log() {
        logger::log_connection_accepted(&peer_addr);
    }

    let state = Arc::clone(state);
    tokio::spawn(async move {
        serve_connection(stream, peer_addr, state).await;
        drop(guard);
    });
}

/// Serve HTTP/1.1 on one connection until it closes or times out
async fn serve_connection(stream: TcpStream, peer_addr: SocketAddr, state: Arc<AppState>) {
    let io = TokioIo::new(stream);

    let performance = &state.config.performance;
    let timeout = Duration::from_secs(performance.read_timeout.max(performance.write_timeout));

    let mut builder = http1::Builder::new();
    builder.keep_alive(performance.keep_alive);

    let service_state = Arc::clone(&state);
    let conn = builder.serve_connection(
        io,
        service_fn(move |req| handler::handle_request(req, Arc::clone(&service_state), peer_addr)),
    );

    match tokio::time::timeout(timeout, conn).await {
        Ok(Ok(())) => {}
        Ok(Err(err)) => logger::log_connection_error(&err),
        Err(_) => logger::log_warning(&format!(
            "Connection from {peer_addr} timed out after {} seconds",
            timeout.as_secs()
        )),
    }
}
