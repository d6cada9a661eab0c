// src/server/mod.rs

use crate::config::Config;
use anyhow::Result;

mod connection_loop;
mod context;
mod initialization;

pub use connection_loop::run as serve;
pub use context::ServerContext;
pub use initialization::setup;

/// The main server startup function, orchestrating all setup phases.
pub async fn run(config: Config) -> Result<()> {
    // 1. Initialize components, handlers, and the listener.
    let server_context = initialization::setup(config).await?;

    // 2. Accept connections until shutdown.
    connection_loop::run(server_context).await;

    Ok(())
}
