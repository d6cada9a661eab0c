// src/server/initialization.rs

//! Handles the complete server initialization process, from dispatcher and
//! handler registration to component startup and socket binding.

use super::context::ServerContext;
use crate::config::Config;
use crate::core::CommandDispatcher;
use crate::core::commands::register_builtins;
use crate::core::component::ComponentManager;
use crate::core::metrics::{MetricsReporter, ServerStats};
use crate::core::storage::InMemoryPlayerRepository;
use crate::services;
use anyhow::Result;
use std::sync::Arc;
use tokio::net::TcpListener;
use tokio::sync::broadcast;
use tracing::info;

/// Initializes all server components before starting the main loop.
pub async fn setup(config: Config) -> Result<ServerContext> {
    info!(
        "starting gameframe server (workers {}..{}, queue {})",
        config.worker_pool.core_size, config.worker_pool.max_size, config.worker_pool.queue_size
    );
    let (shutdown_tx, _) = broadcast::channel(1);

    let stats = ServerStats::new();
    let dispatcher = Arc::new(CommandDispatcher::new(&config.worker_pool));

    let players = InMemoryPlayerRepository::new();
    register_builtins(&dispatcher, players)?;

    let mut components = ComponentManager::new();
    if config.metrics.enabled {
        components.register(Arc::new(MetricsReporter::new(stats.clone(), &config.metrics)))?;
    }
    for service in services::placeholders() {
        components.register(service)?;
    }
    components.init_all().await?;
    components.start_all().await?;
    info!("{} components started", components.component_count());

    let listener = TcpListener::bind((config.host.as_str(), config.port)).await?;
    info!(
        "gameframe server listening on {}",
        listener.local_addr()?
    );

    Ok(ServerContext {
        config,
        listener,
        dispatcher,
        stats,
        components,
        shutdown_tx,
    })
}
