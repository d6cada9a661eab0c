// src/server/context.rs

use crate::config::Config;
use crate::core::CommandDispatcher;
use crate::core::component::ComponentManager;
use crate::core::metrics::ServerStats;
use std::net::SocketAddr;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;

/// Holds all the initialized state required to run the server's main loop.
pub struct ServerContext {
    pub config: Config,
    pub listener: TcpListener,
    pub dispatcher: Arc<CommandDispatcher>,
    pub stats: Arc<ServerStats>,
    pub components: ComponentManager,
    pub shutdown_tx: broadcast::Sender<()>,
}

impl ServerContext {
    /// The address the listener is actually bound to. Useful when the
    /// configured port is 0.
    pub fn local_addr(&self) -> std::io::Result<SocketAddr> {
        self.listener.local_addr()
    }
}
