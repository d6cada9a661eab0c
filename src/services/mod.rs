// src/services/mod.rs

//! Game service skeletons.
//!
//! Each service is a named lifecycle slot where real game systems plug in.
//! The placeholders only log their transitions, but they pin down the startup
//! order the real implementations will inherit.

use crate::core::component::Component;
use crate::core::errors::GameError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::info;

/// A named, ordered service slot with no behavior yet.
pub struct PlaceholderService {
    name: &'static str,
    order: i32,
}

impl PlaceholderService {
    pub fn new(name: &'static str, order: i32) -> Self {
        Self { name, order }
    }
}

#[async_trait]
impl Component for PlaceholderService {
    fn name(&self) -> &str {
        self.name
    }

    fn order(&self) -> i32 {
        self.order
    }

    async fn init(&self) -> Result<(), GameError> {
        info!("service '{}' initialized", self.name);
        Ok(())
    }

    async fn start(&self) -> Result<(), GameError> {
        info!("service '{}' started", self.name);
        Ok(())
    }

    async fn stop(&self) -> Result<(), GameError> {
        info!("service '{}' stopped", self.name);
        Ok(())
    }
}

/// The standard set of game services in startup order.
pub fn placeholders() -> Vec<Arc<dyn Component>> {
    vec![
        Arc::new(PlaceholderService::new("gateway", 10)),
        Arc::new(PlaceholderService::new("login", 20)),
        Arc::new(PlaceholderService::new("logic", 30)),
        Arc::new(PlaceholderService::new("scene", 40)),
        Arc::new(PlaceholderService::new("rank", 50)),
        Arc::new(PlaceholderService::new("chat", 60)),
        Arc::new(PlaceholderService::new("pay", 70)),
    ]
}
