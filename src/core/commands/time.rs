// src/core/commands/time.rs

use super::CommandHandler;
use crate::connection::Session;
use crate::core::{GameError, Message};
use async_trait::async_trait;
use chrono::Local;
use std::sync::Arc;
use tracing::info;

/// Reports the server time: `time timestamp=<unix-millis>
/// datetime=<yyyy-MM-ddTHH:mm:ss> [seq=n]`.
pub struct TimeHandler;

#[async_trait]
impl CommandHandler for TimeHandler {
    async fn handle(&self, request: &Message, session: &Arc<Session>) -> Result<(), GameError> {
        let seq = request.seq();
        info!("time - seq: {seq:?}");

        let now = Local::now();
        let response = Message::builder("time")?
            .param("timestamp", now.timestamp_millis().to_string())?
            .param("datetime", now.format("%Y-%m-%dT%H:%M:%S").to_string())?
            .seq_opt(seq)?
            .build();
        let _ = session.send_message(&response);
        Ok(())
    }
}
