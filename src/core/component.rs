// src/core/component.rs

//! Ordered lifecycle management for server subsystems.
//!
//! Components initialize and start in ascending `order` and stop in the
//! reverse order, so later components may depend on earlier ones being up.

use crate::core::errors::GameError;
use async_trait::async_trait;
use std::sync::Arc;
use tracing::{error, info};

/// A managed server subsystem with a three-phase lifecycle.
#[async_trait]
pub trait Component: Send + Sync {
    fn name(&self) -> &str;

    /// Startup position. Lower orders initialize and start first and stop
    /// last.
    fn order(&self) -> i32;

    /// Acquires resources. Must not serve traffic yet.
    async fn init(&self) -> Result<(), GameError> {
        Ok(())
    }

    /// Begins active work. Called after every component has initialized.
    async fn start(&self) -> Result<(), GameError> {
        Ok(())
    }

    /// Releases resources. Called in reverse start order.
    async fn stop(&self) -> Result<(), GameError> {
        Ok(())
    }
}

/// Drives registered components through init, start, and stop.
#[derive(Default)]
pub struct ComponentManager {
    components: Vec<Arc<dyn Component>>,
    initialized: bool,
    started: bool,
}

impl ComponentManager {
    pub fn new() -> Self {
        Self::default()
    }

    /// Adds a component. Registration is rejected once startup has begun.
    pub fn register(&mut self, component: Arc<dyn Component>) -> Result<(), GameError> {
        if self.initialized || self.started {
            return Err(GameError::InvalidState(format!(
                "cannot register component '{}' after startup",
                component.name()
            )));
        }
        self.components.push(component);
        self.components.sort_by_key(|c| c.order());
        Ok(())
    }

    pub fn component_count(&self) -> usize {
        self.components.len()
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn is_started(&self) -> bool {
        self.started
    }

    /// Initializes all components in ascending order. The first failure
    /// aborts startup.
    pub async fn init_all(&mut self) -> Result<(), GameError> {
        for component in &self.components {
            info!(
                "initializing component '{}' (order {})",
                component.name(),
                component.order()
            );
            component.init().await.map_err(|e| {
                GameError::Component(format!(
                    "component '{}' failed to initialize: {e}",
                    component.name()
                ))
            })?;
        }
        self.initialized = true;
        Ok(())
    }

    /// Starts all components in ascending order.
    pub async fn start_all(&mut self) -> Result<(), GameError> {
        if !self.initialized {
            return Err(GameError::InvalidState(
                "components must be initialized before starting".to_string(),
            ));
        }
        for component in &self.components {
            info!("starting component '{}'", component.name());
            component.start().await.map_err(|e| {
                GameError::Component(format!(
                    "component '{}' failed to start: {e}",
                    component.name()
                ))
            })?;
        }
        self.started = true;
        Ok(())
    }

    /// Stops all components in reverse order. A failing stop is logged and
    /// the remaining components are still stopped.
    pub async fn stop_all(&mut self) {
        for component in self.components.iter().rev() {
            info!("stopping component '{}'", component.name());
            if let Err(e) = component.stop().await {
                error!("component '{}' failed to stop: {e}", component.name());
            }
        }
        self.started = false;
        self.initialized = false;
    }
}
