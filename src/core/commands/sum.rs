// src/core/commands/sum.rs

use super::CommandHandler;
use crate::connection::Session;
use crate::core::{GameError, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

/// Adds two integer operands: `sum a=10 b=20 seq=3` answers
/// `sum a=10 b=20 result=30 seq=3`. Missing or non-integer operands get an
/// `INVALID_PARAMETER` error response.
pub struct SumHandler;

#[async_trait]
impl CommandHandler for SumHandler {
    async fn handle(&self, request: &Message, session: &Arc<Session>) -> Result<(), GameError> {
        let seq = request.seq();
        let a_raw = request.param("a");
        let b_raw = request.param("b");
        info!("sum - a: {a_raw:?}, b: {b_raw:?}, seq: {seq:?}");

        let (Some(a_raw), Some(b_raw)) = (a_raw, b_raw) else {
            send_invalid(session, "parameters a and b are required", seq);
            return Ok(());
        };

        let (Ok(a), Ok(b)) = (a_raw.parse::<i64>(), b_raw.parse::<i64>()) else {
            warn!("sum - operands are not valid integers: a={a_raw}, b={b_raw}");
            send_invalid(session, "parameters a and b must be valid integers", seq);
            return Ok(());
        };

        let result = a.saturating_add(b);
        let response = Message::builder("sum")?
            .param("a", a_raw)?
            .param("b", b_raw)?
            .param("result", result.to_string())?
            .seq_opt(seq)?
            .build();
        let _ = session.send_message(&response);
        Ok(())
    }
}

fn send_invalid(session: &Arc<Session>, message: &str, seq: Option<&str>) {
    let response = Message::error("INVALID_PARAMETER", message, seq);
    let _ = session.send_message(&response);
}
