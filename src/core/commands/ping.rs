// src/core/commands/ping.rs

use super::CommandHandler;
use crate::connection::Session;
use crate::core::{GameError, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::debug;

/// Heartbeat: answers `ping [seq=n]` with `pong [seq=n]`.
pub struct PingHandler;

#[async_trait]
impl CommandHandler for PingHandler {
    async fn handle(&self, request: &Message, session: &Arc<Session>) -> Result<(), GameError> {
        let seq = request.seq();
        debug!("ping - seq: {seq:?}");

        let response = Message::builder("pong")?.seq_opt(seq)?.build();
        let _ = session.send_message(&response);
        Ok(())
    }
}
