// src/core/storage/mod.rs

//! Persistence seam for player records.
//!
//! Handlers depend on the `PlayerRepository` trait only, so the in-memory
//! store can be swapped for a real backend without touching command code.

use crate::core::errors::GameError;
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, Ordering};
use tracing::debug;

/// A persisted player record. `id` is `None` until the record is first saved.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Player {
    pub id: Option<u64>,
    pub name: String,
    pub level: u32,
}

impl Player {
    pub fn new(name: impl Into<String>, level: u32) -> Self {
        Player {
            id: None,
            name: name.into(),
            level,
        }
    }
}

/// Async data access for player records.
#[async_trait]
pub trait PlayerRepository: Send + Sync {
    /// Inserts the player when `id` is `None`, otherwise updates the existing
    /// record. Returns the stored record with its identifier filled in.
    async fn save(&self, player: Player) -> Result<Player, GameError>;

    async fn find_by_id(&self, id: u64) -> Result<Option<Player>, GameError>;

    async fn find_by_name(&self, name: &str) -> Result<Option<Player>, GameError>;

    /// Removes the record, reporting whether it existed.
    async fn delete_by_id(&self, id: u64) -> Result<bool, GameError>;
}

/// Concurrent in-memory repository with a monotonic id sequence.
#[derive(Debug, Default)]
pub struct InMemoryPlayerRepository {
    players: DashMap<u64, Player>,
    next_id: AtomicU64,
}

impl InMemoryPlayerRepository {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn len(&self) -> usize {
        self.players.len()
    }

    pub fn is_empty(&self) -> bool {
        self.players.is_empty()
    }
}

#[async_trait]
impl PlayerRepository for InMemoryPlayerRepository {
    async fn save(&self, mut player: Player) -> Result<Player, GameError> {
        let id = match player.id {
            Some(id) => {
                if !self.players.contains_key(&id) {
                    return Err(GameError::Storage(format!(
                        "cannot update missing player {id}"
                    )));
                }
                id
            }
            None => self.next_id.fetch_add(1, Ordering::Relaxed) + 1,
        };
        player.id = Some(id);
        debug!("saving player {id} ({})", player.name);
        self.players.insert(id, player.clone());
        Ok(player)
    }

    async fn find_by_id(&self, id: u64) -> Result<Option<Player>, GameError> {
        Ok(self.players.get(&id).map(|entry| entry.clone()))
    }

    async fn find_by_name(&self, name: &str) -> Result<Option<Player>, GameError> {
        Ok(self
            .players
            .iter()
            .find(|entry| entry.name == name)
            .map(|entry| entry.clone()))
    }

    async fn delete_by_id(&self, id: u64) -> Result<bool, GameError> {
        Ok(self.players.remove(&id).is_some())
    }
}
