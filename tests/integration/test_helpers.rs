// tests/integration/test_helpers.rs

//! Test helpers and utilities shared across the test suites.

use gameframe::connection::{Session, WriteRequest};
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::sync::{broadcast, mpsc};

/// A session wired to an in-memory channel instead of a socket, capturing
/// every line a handler writes.
pub struct TestSession {
    pub session: Arc<Session>,
    writer_rx: mpsc::UnboundedReceiver<WriteRequest>,
}

impl TestSession {
    pub fn new() -> Self {
        let addr: SocketAddr = "127.0.0.1:4242".parse().expect("valid test address");
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let (close_tx, _) = broadcast::channel(1);
        Self {
            session: Session::new(addr, writer_tx, close_tx),
            writer_rx,
        }
    }

    /// Receives the next line written through the session, acknowledging its
    /// send handle, with the trailing newline stripped.
    pub async fn next_line(&mut self) -> String {
        let request = tokio::time::timeout(std::time::Duration::from_secs(5), self.writer_rx.recv())
            .await
            .expect("timed out waiting for a response line")
            .expect("a line should have been written");
        let _ = request.ack.send(Ok(()));
        request.line.trim_end_matches('\n').to_string()
    }

    /// Drains every line written so far without waiting.
    #[allow(dead_code)]
    pub fn drain_lines(&mut self) -> Vec<String> {
        let mut lines = Vec::new();
        while let Ok(request) = self.writer_rx.try_recv() {
            let _ = request.ack.send(Ok(()));
            lines.push(request.line.trim_end_matches('\n').to_string());
        }
        lines
    }
}

impl Default for TestSession {
    fn default() -> Self {
        Self::new()
    }
}
