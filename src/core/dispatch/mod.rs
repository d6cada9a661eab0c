// src/core/dispatch/mod.rs

//! Command routing: the handler registry and the dispatcher that executes
//! handlers on a bounded worker pool, isolated from connection I/O tasks.

pub mod worker_pool;

pub use worker_pool::WorkerPool;

use crate::config::WorkerPoolConfig;
use crate::connection::Session;
use crate::core::commands::CommandHandler;
use crate::core::protocol::message::is_valid_command;
use crate::core::{GameError, Message};
use dashmap::DashMap;
use futures::FutureExt;
use std::panic::AssertUnwindSafe;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};
use tracing::{Instrument, debug, error, info, warn};

/// Grace period for draining in-flight commands on shutdown.
const SHUTDOWN_GRACE: Duration = Duration::from_secs(10);

/// Routes parsed messages to registered command handlers.
///
/// The registry map is safe for concurrent reads and writes; handler
/// execution concurrency across sessions is unconstrained. One dispatcher is
/// owned by the server context and shared by every connection pipeline.
pub struct CommandDispatcher {
    handlers: DashMap<String, Arc<dyn CommandHandler>>,
    pool: WorkerPool,
    draining: AtomicBool,
}

impl CommandDispatcher {
    pub fn new(cfg: &WorkerPoolConfig) -> Self {
        info!(
            "command dispatcher initialized - worker pool: core={}, max={}, queue={}",
            cfg.core_size, cfg.max_size, cfg.queue_size
        );
        Self {
            handlers: DashMap::new(),
            pool: WorkerPool::new(cfg),
            draining: AtomicBool::new(false),
        }
    }

    /// Registers a handler for a command name. Re-registering replaces the
    /// previous handler with a warning. Fails once the dispatcher is
    /// draining.
    pub fn register_handler(
        &self,
        command: impl Into<String>,
        handler: Arc<dyn CommandHandler>,
    ) -> Result<(), GameError> {
        let command = command.into();
        if !is_valid_command(&command) {
            return Err(GameError::Parse(format!("invalid command name: {command}")));
        }
        if self.draining.load(Ordering::Acquire) {
            return Err(GameError::InvalidState(
                "dispatcher is draining, registration refused".to_string(),
            ));
        }
        if self.handlers.insert(command.clone(), handler).is_some() {
            warn!("command handler overwritten: {command}");
        } else {
            info!("registered command handler: {command}");
        }
        Ok(())
    }

    /// Removes a handler, returning it if it was registered.
    pub fn unregister_handler(&self, command: &str) -> Option<Arc<dyn CommandHandler>> {
        let removed = self.handlers.remove(command).map(|(_, handler)| handler);
        if removed.is_some() {
            info!("unregistered command handler: {command}");
        }
        removed
    }

    pub fn handler_count(&self) -> usize {
        self.handlers.len()
    }

    pub fn has_handler(&self, command: &str) -> bool {
        self.handlers.contains_key(command)
    }

    /// The registered command names, sorted.
    pub fn command_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self
            .handlers
            .iter()
            .map(|entry| entry.key().clone())
            .collect();
        names.sort();
        names
    }

    /// Routes a message to its handler on the worker pool.
    ///
    /// Unknown commands are answered directly from the calling task with an
    /// `UNKNOWN_COMMAND` error and never reach the pool. Under pool
    /// saturation the handler runs inline on the calling task (caller-runs
    /// backpressure).
    pub async fn dispatch(&self, request: Message, session: &Arc<Session>) {
        let Some(handler) = self
            .handlers
            .get(request.command())
            .map(|entry| entry.value().clone())
        else {
            warn!("unknown command: {}", request.command());
            let response = Message::error(
                "UNKNOWN_COMMAND",
                &format!("unknown command: {}", request.command()),
                request.seq(),
            );
            let _ = session.send_message(&response);
            return;
        };

        // The session span travels inside the job so logs on the worker task
        // carry the originating connection's trace id.
        let span = session.span();
        let session = session.clone();
        let job = Box::pin(execute_command(handler, request, session).instrument(span));
        self.pool.execute(job).await;
    }

    /// Stops accepting registrations and drains the worker pool, aborting
    /// work still running after the grace period.
    pub async fn shutdown(&self) {
        info!("shutting down command dispatcher");
        self.draining.store(true, Ordering::Release);
        self.pool.shutdown(SHUTDOWN_GRACE).await;
        info!("command dispatcher stopped");
    }
}

/// Runs one handler invocation: timing, panic isolation, and the generic
/// `COMMAND_ERROR` response for failures.
async fn execute_command(handler: Arc<dyn CommandHandler>, request: Message, session: Arc<Session>) {
    let command = request.command().to_string();
    let started = Instant::now();
    debug!("command started: {command}");

    let outcome = AssertUnwindSafe(handler.handle(&request, &session))
        .catch_unwind()
        .await;
    let elapsed_ms = started.elapsed().as_millis();

    match outcome {
        Ok(Ok(())) => {
            debug!("command finished: {command} ({elapsed_ms}ms)");
        }
        Ok(Err(e)) => {
            error!("command failed: {command} ({elapsed_ms}ms): {e}");
            let response = Message::error(
                "COMMAND_ERROR",
                &format!("command failed: {e}"),
                request.seq(),
            );
            let _ = session.send_message(&response);
        }
        Err(_) => {
            error!("command panicked: {command} ({elapsed_ms}ms)");
            let response = Message::error("COMMAND_ERROR", "internal_error", request.seq());
            let _ = session.send_message(&response);
        }
    }
}
