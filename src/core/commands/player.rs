// src/core/commands/player.rs

//! Player persistence commands, demonstrating handlers that carry shared
//! state behind a repository trait.
//!
//! `player-save name=alice level=10 seq=1` answers
//! `player-save ok id=1 name=alice level=10 seq=1`, and
//! `player-get id=1` answers `player-get ok id=1 name=alice level=10` or
//! `player-get not_found id=1`. Validation failures answer with
//! `player-save err msg=...` style lines; error text is kept single-token
//! so it survives the wire format.

use super::CommandHandler;
use crate::connection::Session;
use crate::core::storage::{Player, PlayerRepository};
use crate::core::{GameError, Message};
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{info, warn};

pub struct PlayerSaveHandler {
    players: Arc<dyn PlayerRepository>,
}

impl PlayerSaveHandler {
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        PlayerSaveHandler { players }
    }
}

#[async_trait]
impl CommandHandler for PlayerSaveHandler {
    async fn handle(&self, request: &Message, session: &Arc<Session>) -> Result<(), GameError> {
        let seq = request.seq();
        let Some(name) = request.param("name") else {
            send_err(session, "player-save", "name_required", seq);
            return Ok(());
        };

        let level = match request.param("level") {
            None => 1,
            Some(raw) => match raw.parse::<u32>() {
                Ok(level) => level,
                Err(_) => {
                    warn!("player-save - level is not an integer: {raw}");
                    send_err(session, "player-save", "level_not_an_integer", seq);
                    return Ok(());
                }
            },
        };

        let saved = match self.players.save(Player::new(name, level)).await {
            Ok(saved) => saved,
            Err(e) => {
                warn!("player-save failed: {e}");
                send_err(session, "player-save", "internal_server_error", seq);
                return Ok(());
            }
        };
        let Some(id) = saved.id else {
            send_err(session, "player-save", "internal_server_error", seq);
            return Ok(());
        };
        info!("player-save - saved player {id} ({})", saved.name);

        let response = Message::builder("player-save")?
            .param("ok", "true")?
            .param("id", id.to_string())?
            .param("name", saved.name)?
            .param("level", saved.level.to_string())?
            .seq_opt(seq)?
            .build();
        let _ = session.send_message(&response);
        Ok(())
    }
}

pub struct PlayerGetHandler {
    players: Arc<dyn PlayerRepository>,
}

impl PlayerGetHandler {
    pub fn new(players: Arc<dyn PlayerRepository>) -> Self {
        PlayerGetHandler { players }
    }
}

#[async_trait]
impl CommandHandler for PlayerGetHandler {
    async fn handle(&self, request: &Message, session: &Arc<Session>) -> Result<(), GameError> {
        let seq = request.seq();
        let Some(raw_id) = request.param("id") else {
            send_err(session, "player-get", "id_required", seq);
            return Ok(());
        };
        let Ok(id) = raw_id.parse::<u64>() else {
            warn!("player-get - id is not an integer: {raw_id}");
            send_err(session, "player-get", "id_not_an_integer", seq);
            return Ok(());
        };

        let found = match self.players.find_by_id(id).await {
            Ok(found) => found,
            Err(e) => {
                warn!("player-get failed: {e}");
                send_err(session, "player-get", "internal_server_error", seq);
                return Ok(());
            }
        };

        let response = match found {
            Some(player) => Message::builder("player-get")?
                .param("ok", "true")?
                .param("id", id.to_string())?
                .param("name", player.name)?
                .param("level", player.level.to_string())?
                .seq_opt(seq)?
                .build(),
            None => Message::builder("player-get")?
                .param("not_found", "true")?
                .param("id", id.to_string())?
                .seq_opt(seq)?
                .build(),
        };
        let _ = session.send_message(&response);
        Ok(())
    }
}

fn send_err(session: &Arc<Session>, command: &str, msg: &str, seq: Option<&str>) {
    let response = match build_err(command, msg, seq) {
        Ok(response) => response,
        Err(e) => {
            warn!("failed to build {command} error response: {e}");
            return;
        }
    };
    let _ = session.send_message(&response);
}

fn build_err(command: &str, msg: &str, seq: Option<&str>) -> Result<Message, GameError> {
    Ok(Message::builder(command)?
        .param("err", "true")?
        .param("msg", msg)?
        .seq_opt(seq)?
        .build())
}
