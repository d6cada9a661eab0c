// src/core/commands/echo.rs

use super::CommandHandler;
use crate::connection::Session;
use crate::core::{GameError, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// Echoes the `msg` parameter back to the client.
pub struct EchoHandler;

#[async_trait]
impl CommandHandler for EchoHandler {
    async fn handle(&self, request: &Message, session: &Arc<Session>) -> Result<(), GameError> {
        let message = request.param_or("msg", "");
        let seq = request.seq();
        info!("echo - msg: {message}, seq: {seq:?}");

        let mut builder = Message::builder("echo")?;
        // An empty value cannot be rendered on the wire, so it is omitted.
        if !message.is_empty() {
            builder = builder.param("msg", message)?;
        }
        let response = builder.seq_opt(seq)?.build();
        let _ = session.send_message(&response);
        Ok(())
    }
}
