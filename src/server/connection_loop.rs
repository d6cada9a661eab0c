// src/server/connection_loop.rs

//! Contains the main server loop for accepting connections and handling
//! graceful shutdown.

use super::context::ServerContext;
use crate::connection::ConnectionHandler;
use std::time::Duration;
use tokio::signal::unix::{SignalKind, signal};
use tokio::task::JoinSet;
use tracing::{error, info, warn};

const CLIENT_DRAIN_TIMEOUT: Duration = Duration::from_secs(5);

/// The main server loop that accepts connections and handles graceful
/// shutdown. Runs until a termination signal arrives or `shutdown_tx` fires.
pub async fn run(mut ctx: ServerContext) {
    let mut client_tasks = JoinSet::new();
    let mut shutdown_rx = ctx.shutdown_tx.subscribe();

    let mut sigint = match signal(SignalKind::interrupt()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to register SIGINT handler: {e}");
            return;
        }
    };
    let mut sigterm = match signal(SignalKind::terminate()) {
        Ok(stream) => stream,
        Err(e) => {
            error!("failed to register SIGTERM handler: {e}");
            return;
        }
    };

    loop {
        tokio::select! {
            biased;

            _ = sigint.recv() => {
                info!("SIGINT received, initiating graceful shutdown");
                break;
            }
            _ = sigterm.recv() => {
                info!("SIGTERM received, initiating graceful shutdown");
                break;
            }
            _ = shutdown_rx.recv() => {
                info!("shutdown requested, initiating graceful shutdown");
                break;
            }

            res = ctx.listener.accept() => {
                match res {
                    Ok((socket, addr)) => {
                        ctx.stats.connection_opened();
                        let dispatcher = ctx.dispatcher.clone();
                        let stats = ctx.stats.clone();
                        let idle = ctx.config.idle;
                        let global_shutdown_rx = ctx.shutdown_tx.subscribe();
                        client_tasks.spawn(async move {
                            let handler = ConnectionHandler::new(
                                socket,
                                addr,
                                dispatcher,
                                idle,
                                global_shutdown_rx,
                            );
                            if let Err(e) = handler.run().await {
                                warn!("connection from {addr} terminated unexpectedly: {e}");
                            }
                            stats.connection_closed();
                        });
                    }
                    Err(e) => error!("failed to accept connection: {e}"),
                }
            },

            Some(res) = client_tasks.join_next() => {
                if let Err(e) = res
                    && e.is_panic()
                {
                    error!("a client handler panicked: {e:?}");
                }
            },
        }
    }

    info!("shutting down, signaling all connections");
    // Every live connection holds a subscriber, so this only fails when no
    // connections remain.
    let _ = ctx.shutdown_tx.send(());

    if tokio::time::timeout(CLIENT_DRAIN_TIMEOUT, async {
        while client_tasks.join_next().await.is_some() {}
    })
    .await
    .is_err()
    {
        warn!("timed out waiting for client connections to drain, aborting the rest");
        client_tasks.shutdown().await;
    }
    info!("all client connections closed");

    ctx.dispatcher.shutdown().await;
    ctx.components.stop_all().await;
    info!("server shutdown complete");
}
