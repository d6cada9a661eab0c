// src/core/metrics.rs

//! Connection counters and the periodic runtime stats reporter.

use crate::config::MetricsConfig;
use crate::core::component::Component;
use crate::core::errors::GameError;
use async_trait::async_trait;
use std::sync::Arc;
use std::sync::atomic::{AtomicU64, AtomicUsize, Ordering};
use std::time::{Duration, Instant};
use sysinfo::{Pid, ProcessRefreshKind, ProcessesToUpdate, System};
use tokio::sync::Notify;
use tracing::{debug, info};

/// Shared connection counters, updated by the accept loop.
#[derive(Debug)]
pub struct ServerStats {
    total_connections: AtomicU64,
    active_connections: AtomicUsize,
    started_at: Instant,
}

impl Default for ServerStats {
    fn default() -> Self {
        Self {
            total_connections: AtomicU64::new(0),
            active_connections: AtomicUsize::new(0),
            started_at: Instant::now(),
        }
    }
}

impl ServerStats {
    pub fn new() -> Arc<Self> {
        Arc::new(Self::default())
    }

    pub fn connection_opened(&self) {
        self.total_connections.fetch_add(1, Ordering::Relaxed);
        self.active_connections.fetch_add(1, Ordering::Relaxed);
    }

    pub fn connection_closed(&self) {
        self.active_connections.fetch_sub(1, Ordering::Relaxed);
    }

    pub fn total_connections(&self) -> u64 {
        self.total_connections.load(Ordering::Relaxed)
    }

    pub fn active_connections(&self) -> usize {
        self.active_connections.load(Ordering::Relaxed)
    }

    pub fn uptime(&self) -> Duration {
        self.started_at.elapsed()
    }
}

/// Logs connection counters and process memory at a fixed interval.
pub struct MetricsReporter {
    stats: Arc<ServerStats>,
    interval: Duration,
    shutdown: Arc<Notify>,
}

impl MetricsReporter {
    pub fn new(stats: Arc<ServerStats>, config: &MetricsConfig) -> Self {
        Self {
            stats,
            interval: Duration::from_secs(config.interval_secs),
            shutdown: Arc::new(Notify::new()),
        }
    }

    fn report(stats: &ServerStats, sys: &mut System) {
        let pid = Pid::from_u32(std::process::id());
        sys.refresh_processes_specifics(
            ProcessesToUpdate::Some(&[pid]),
            true,
            ProcessRefreshKind::nothing().with_memory(),
        );
        let memory_bytes = sys.process(pid).map(|p| p.memory()).unwrap_or(0);
        info!(
            active_connections = stats.active_connections(),
            total_connections = stats.total_connections(),
            uptime_secs = stats.uptime().as_secs(),
            memory_bytes,
            "runtime stats"
        );
    }
}

#[async_trait]
impl Component for MetricsReporter {
    fn name(&self) -> &str {
        "metrics-reporter"
    }

    fn order(&self) -> i32 {
        0
    }

    async fn start(&self) -> Result<(), GameError> {
        let stats = self.stats.clone();
        let interval = self.interval;
        let shutdown = self.shutdown.clone();
        tokio::spawn(async move {
            let mut sys = System::new();
            let mut ticker = tokio::time::interval(interval);
            ticker.tick().await;
            loop {
                tokio::select! {
                    _ = shutdown.notified() => break,
                    _ = ticker.tick() => Self::report(&stats, &mut sys),
                }
            }
            debug!("metrics reporter stopped");
        });
        Ok(())
    }

    async fn stop(&self) -> Result<(), GameError> {
        self.shutdown.notify_waiters();
        Ok(())
    }
}
