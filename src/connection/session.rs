// src/connection/session.rs

//! Defines the `Session`, the per-connection state shared between the
//! protocol pipeline and command handlers running on the worker pool.

use crate::core::trace;
use crate::core::{GameError, Message};
use dashmap::DashMap;
use std::future::Future;
use std::net::SocketAddr;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::task::{Context, Poll};
use std::time::{Duration, Instant};
use tokio::sync::{broadcast, mpsc, oneshot};
use tracing::{Span, debug, info_span, warn};

/// A connection-scoped attribute value stored by command handlers.
#[derive(Debug, Clone, PartialEq)]
pub enum AttrValue {
    Str(String),
    Int(i64),
    Bool(bool),
}

impl AttrValue {
    pub fn as_str(&self) -> Option<&str> {
        match self {
            AttrValue::Str(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_int(&self) -> Option<i64> {
        match self {
            AttrValue::Int(i) => Some(*i),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            AttrValue::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl From<&str> for AttrValue {
    fn from(s: &str) -> Self {
        AttrValue::Str(s.to_string())
    }
}

impl From<String> for AttrValue {
    fn from(s: String) -> Self {
        AttrValue::Str(s)
    }
}

impl From<i64> for AttrValue {
    fn from(i: i64) -> Self {
        AttrValue::Int(i)
    }
}

impl From<bool> for AttrValue {
    fn from(b: bool) -> Self {
        AttrValue::Bool(b)
    }
}

/// One outbound line queued to the connection's writer task. The `ack` side
/// resolves the `SendHandle` returned to the caller once the line is flushed.
#[derive(Debug)]
pub struct WriteRequest {
    pub line: String,
    pub ack: oneshot::Sender<Result<(), GameError>>,
}

/// Holds the state of a single client connection.
///
/// All public methods are safe to call from any thread, and none block on
/// network I/O: writes are queued to the connection's writer task.
#[derive(Debug)]
pub struct Session {
    trace_id: String,
    remote_addr: SocketAddr,
    attributes: DashMap<String, AttrValue>,
    created_at: Instant,
    active: AtomicBool,
    writer_tx: mpsc::UnboundedSender<WriteRequest>,
    close_tx: broadcast::Sender<()>,
    span: Span,
}

impl Session {
    /// Creates a session for a freshly accepted connection, allocating its
    /// trace id. Exactly one session is created per connection.
    pub fn new(
        remote_addr: SocketAddr,
        writer_tx: mpsc::UnboundedSender<WriteRequest>,
        close_tx: broadcast::Sender<()>,
    ) -> Arc<Self> {
        let trace_id = trace::generate_trace_id();
        let span = info_span!("session", trace_id = %trace_id, peer = %remote_addr);
        debug!(trace_id = %trace_id, peer = %remote_addr, "session created");
        Arc::new(Self {
            trace_id,
            remote_addr,
            attributes: DashMap::new(),
            created_at: Instant::now(),
            active: AtomicBool::new(true),
            writer_tx,
            close_tx,
            span,
        })
    }

    pub fn trace_id(&self) -> &str {
        &self.trace_id
    }

    pub fn remote_addr(&self) -> SocketAddr {
        self.remote_addr
    }

    /// The tracing span carrying this session's trace id. Command execution
    /// is instrumented with a clone of this span so that logs emitted on
    /// worker tasks stay correlated with the originating connection.
    pub fn span(&self) -> Span {
        self.span.clone()
    }

    /// Stores a connection-scoped attribute.
    pub fn set_attribute(&self, key: impl Into<String>, value: impl Into<AttrValue>) {
        self.attributes.insert(key.into(), value.into());
    }

    /// Returns a clone of the attribute value, if present.
    pub fn attribute(&self, key: &str) -> Option<AttrValue> {
        self.attributes.get(key).map(|entry| entry.value().clone())
    }

    /// Returns the attribute value, or the default if absent.
    pub fn attribute_or(&self, key: &str, default: AttrValue) -> AttrValue {
        self.attribute(key).unwrap_or(default)
    }

    /// Removes the attribute, returning the previous value if any.
    pub fn remove_attribute(&self, key: &str) -> Option<AttrValue> {
        self.attributes.remove(key).map(|(_, value)| value)
    }

    pub fn has_attribute(&self, key: &str) -> bool {
        self.attributes.contains_key(key)
    }

    /// Queues a text line for asynchronous delivery, appending a trailing
    /// `\n` when absent. Never blocks and never fails synchronously: on an
    /// inactive session it logs a warning and returns a pre-failed handle.
    pub fn send_text(&self, text: impl Into<String>) -> SendHandle {
        let mut line = text.into();
        if !self.is_active() {
            warn!(trace_id = %self.trace_id, "send on inactive session dropped: {line}");
            return SendHandle::failed(GameError::InactiveSession);
        }
        if !line.ends_with('\n') {
            line.push('\n');
        }
        let (ack, rx) = oneshot::channel();
        if self.writer_tx.send(WriteRequest { line, ack }).is_err() {
            warn!(trace_id = %self.trace_id, "writer task is gone, send dropped");
            return SendHandle::failed(GameError::InactiveSession);
        }
        SendHandle::pending(rx)
    }

    /// Sends a command message, rendered to its wire line.
    pub fn send_message(&self, message: &Message) -> SendHandle {
        self.send_text(message.to_line())
    }

    pub fn is_active(&self) -> bool {
        self.active.load(Ordering::Acquire)
    }

    /// Marks the session inactive and signals the connection task to close
    /// the socket. Idempotent; safe from any thread.
    pub fn close(&self) {
        if self.active.swap(false, Ordering::AcqRel) {
            debug!(trace_id = %self.trace_id, "session closing");
            let _ = self.close_tx.send(());
        }
    }

    /// Subscribes to the close signal; used by the connection tasks.
    pub fn subscribe_close(&self) -> broadcast::Receiver<()> {
        self.close_tx.subscribe()
    }

    pub fn created_at(&self) -> Instant {
        self.created_at
    }

    /// Time elapsed since the connection was accepted.
    pub fn uptime(&self) -> Duration {
        self.created_at.elapsed()
    }
}

enum SendHandleInner {
    Failed(Option<GameError>),
    Pending(oneshot::Receiver<Result<(), GameError>>),
}

/// A future resolving once the queued line has been written, or to an error
/// if the session was inactive or the connection died first. Dropping the
/// handle makes the send fire-and-forget.
pub struct SendHandle {
    inner: SendHandleInner,
}

impl SendHandle {
    fn failed(err: GameError) -> Self {
        Self {
            inner: SendHandleInner::Failed(Some(err)),
        }
    }

    fn pending(rx: oneshot::Receiver<Result<(), GameError>>) -> Self {
        Self {
            inner: SendHandleInner::Pending(rx),
        }
    }
}

impl Future for SendHandle {
    type Output = Result<(), GameError>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        match &mut self.inner {
            SendHandleInner::Failed(err) => {
                Poll::Ready(Err(err.take().unwrap_or(GameError::InactiveSession)))
            }
            SendHandleInner::Pending(rx) => Pin::new(rx).poll(cx).map(|res| match res {
                Ok(outcome) => outcome,
                // The writer task dropped the ack: the connection is gone.
                Err(_) => Err(GameError::InactiveSession),
            }),
        }
    }
}
