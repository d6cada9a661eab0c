// src/connection/handler.rs

//! Defines the `ConnectionHandler`, the protocol pipeline managing the full
//! lifecycle of one client connection: framing, parsing, dispatch, idle
//! timers, and teardown.

use super::session::{Session, WriteRequest};
use crate::config::IdleConfig;
use crate::core::protocol::LineCodec;
use crate::core::{CommandDispatcher, GameError, Message};
use futures::stream::{SplitSink, SplitStream};
use futures::{SinkExt, StreamExt};
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpStream;
use tokio::sync::{broadcast, mpsc};
use tokio::task::JoinHandle;
use tokio_util::codec::Framed;
use tracing::{debug, info, warn};

/// How long teardown waits for the writer task to drain before aborting it.
const WRITER_DRAIN_TIMEOUT: Duration = Duration::from_secs(1);

/// The next step for the connection's read loop to take.
#[derive(PartialEq)]
enum Flow {
    Continue,
    Stop,
}

/// Manages the full lifecycle of a client connection.
pub struct ConnectionHandler {
    session: Arc<Session>,
    reader: SplitStream<Framed<TcpStream, LineCodec>>,
    dispatcher: Arc<CommandDispatcher>,
    close_rx: broadcast::Receiver<()>,
    global_shutdown_rx: broadcast::Receiver<()>,
    reader_idle: Duration,
    writer_handle: JoinHandle<()>,
}

impl ConnectionHandler {
    /// Wires up the pipeline for an accepted socket: splits it into a framed
    /// reader and a writer task, and creates the one `Session` for this
    /// connection.
    pub fn new(
        socket: TcpStream,
        addr: SocketAddr,
        dispatcher: Arc<CommandDispatcher>,
        idle: IdleConfig,
        global_shutdown_rx: broadcast::Receiver<()>,
    ) -> Self {
        let framed = Framed::new(socket, LineCodec::default());
        let (writer, reader) = framed.split();
        let (writer_tx, writer_rx) = mpsc::unbounded_channel();
        let (close_tx, close_rx) = broadcast::channel(1);

        let session = Session::new(addr, writer_tx, close_tx);
        let writer_handle = tokio::spawn(writer_task(
            writer,
            writer_rx,
            idle.writer_idle(),
            session.clone(),
        ));

        Self {
            session,
            reader,
            dispatcher,
            close_rx,
            global_shutdown_rx,
            reader_idle: idle.reader_idle(),
            writer_handle,
        }
    }

    pub fn session(&self) -> &Arc<Session> {
        &self.session
    }

    /// The main event loop for the connection, handling inbound lines, idle
    /// expiry, and shutdown signals.
    pub async fn run(mut self) -> Result<(), GameError> {
        info!(
            "connection established - peer: {}, trace_id: {}",
            self.session.remote_addr(),
            self.session.trace_id()
        );
        self.send_welcome();

        let mut result = Ok(());
        'main_loop: loop {
            // Recreated each iteration, so any inbound frame resets it.
            let reader_idle = tokio::time::sleep(self.reader_idle);
            tokio::pin!(reader_idle);

            tokio::select! {
                biased;
                _ = self.global_shutdown_rx.recv() => {
                    info!(trace_id = %self.session.trace_id(), "server shutting down, closing connection");
                    // Wait for the notice to flush before tearing the socket down.
                    let _ = self.session.send_text("server is shutting down").await;
                    break 'main_loop;
                }
                _ = self.close_rx.recv() => {
                    break 'main_loop;
                }
                _ = &mut reader_idle => {
                    warn!(trace_id = %self.session.trace_id(), "reader idle timeout, closing connection");
                    break 'main_loop;
                }
                item = self.reader.next() => {
                    match item {
                        Some(Ok(line)) => {
                            if self.process_line(&line).await == Flow::Stop {
                                break 'main_loop;
                            }
                        }
                        Some(Err(e)) => {
                            warn!(trace_id = %self.session.trace_id(), "connection error: {e}");
                            result = Err(e);
                            break 'main_loop;
                        }
                        None => {
                            debug!(trace_id = %self.session.trace_id(), "connection closed by peer");
                            break 'main_loop;
                        }
                    }
                }
            }
        }

        self.session.close();
        if tokio::time::timeout(WRITER_DRAIN_TIMEOUT, &mut self.writer_handle)
            .await
            .is_err()
        {
            self.writer_handle.abort();
        }

        info!(
            "connection closed - peer: {}, trace_id: {}, uptime: {}ms",
            self.session.remote_addr(),
            self.session.trace_id(),
            self.session.uptime().as_millis()
        );
        result
    }

    /// Greets a new connection with the trace id and the supported commands.
    fn send_welcome(&self) {
        let commands = self.dispatcher.command_names().join(", ");
        let banner = format!(
            "welcome to the gameframe command server! (trace id: {})\n\
             supported commands: {commands}\n\
             protocol: cmd [k=v]...\n\
             example: echo msg=hello seq=1\n\
             type 'quit' or 'exit' to disconnect.",
            self.session.trace_id()
        );
        let _ = self.session.send_text(banner);
    }

    /// Handles one decoded line: disconnect keywords bypass dispatch, parse
    /// failures get a structured response without closing the connection, and
    /// valid messages are handed to the dispatcher.
    async fn process_line(&self, line: &str) -> Flow {
        let trimmed = line.trim();

        if trimmed.eq_ignore_ascii_case("quit") || trimmed.eq_ignore_ascii_case("exit") {
            info!(trace_id = %self.session.trace_id(), "client requested disconnect");
            // Wait for the farewell to flush before tearing the socket down.
            let _ = self.session.send_text("bye!").await;
            return Flow::Stop;
        }

        match Message::parse(trimmed) {
            Ok(message) => {
                debug!(trace_id = %self.session.trace_id(), "received command: {}", message.command());
                self.dispatcher.dispatch(message, &self.session).await;
            }
            Err(e) => {
                warn!(trace_id = %self.session.trace_id(), "failed to parse line '{trimmed}': {e}");
                // No seq is recoverable from an unparseable line.
                let response = Message::error("PARSE_ERROR", "invalid_format", None);
                let _ = self.session.send_message(&response);
            }
        }
        Flow::Continue
    }
}

/// Owns the write half of the connection. Flushes queued lines, acks their
/// send handles, and emits an unsolicited `ping` when nothing has been
/// written for the writer-idle threshold.
async fn writer_task(
    mut writer: SplitSink<Framed<TcpStream, LineCodec>, String>,
    mut writer_rx: mpsc::UnboundedReceiver<WriteRequest>,
    writer_idle: Duration,
    session: Arc<Session>,
) {
    let mut close_rx = session.subscribe_close();
    loop {
        // Recreated each iteration, so any outbound line resets it.
        let idle = tokio::time::sleep(writer_idle);
        tokio::pin!(idle);

        tokio::select! {
            biased;
            _ = close_rx.recv() => break,
            request = writer_rx.recv() => {
                match request {
                    Some(WriteRequest { line, ack }) => {
                        match writer.send(line).await {
                            Ok(()) => {
                                let _ = ack.send(Ok(()));
                            }
                            Err(e) => {
                                warn!(trace_id = %session.trace_id(), "write failed: {e}");
                                let _ = ack.send(Err(e));
                                session.close();
                                break;
                            }
                        }
                    }
                    None => break,
                }
            }
            _ = &mut idle => {
                debug!(trace_id = %session.trace_id(), "writer idle, sending heartbeat ping");
                if writer.send("ping\n".to_string()).await.is_err() {
                    session.close();
                    break;
                }
            }
        }
    }
}
