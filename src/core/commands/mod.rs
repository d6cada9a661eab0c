// src/core/commands/mod.rs

//! The command handler trait and the built-in reference handlers validating
//! the framework end to end.

pub mod echo;
pub mod ping;
pub mod player;
pub mod sum;
pub mod time;

pub use echo::EchoHandler;
pub use ping::PingHandler;
pub use player::{PlayerGetHandler, PlayerSaveHandler};
pub use sum::SumHandler;
pub use time::TimeHandler;

use crate::connection::Session;
use crate::core::storage::PlayerRepository;
use crate::core::{CommandDispatcher, GameError, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Business logic for one command.
///
/// Handlers run on the worker pool, so they may perform blocking-style async
/// work. They validate their own parameters and answer validation failures
/// with structured error responses; a returned `Err` is treated as an
/// execution failure and answered with a generic `COMMAND_ERROR` by the
/// dispatcher. A handler may emit zero, one, or many response lines.
#[async_trait]
pub trait CommandHandler: Send + Sync {
    async fn handle(&self, request: &Message, session: &Arc<Session>) -> Result<(), GameError>;
}

/// Registers the built-in command set on a dispatcher.
pub fn register_builtins(
    dispatcher: &CommandDispatcher,
    players: Arc<dyn PlayerRepository>,
) -> Result<(), GameError> {
    dispatcher.register_handler("echo", Arc::new(EchoHandler))?;
    dispatcher.register_handler("time", Arc::new(TimeHandler))?;
    dispatcher.register_handler("sum", Arc::new(SumHandler))?;
    dispatcher.register_handler("ping", Arc::new(PingHandler))?;
    dispatcher.register_handler("player-save", Arc::new(PlayerSaveHandler::new(players.clone())))?;
    dispatcher.register_handler("player-get", Arc::new(PlayerGetHandler::new(players)))?;
    info!(
        "registered {} built-in command handlers",
        dispatcher.handler_count()
    );
    Ok(())
}
