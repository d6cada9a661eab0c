// src/config.rs

//! Manages server configuration: loading from TOML, defaults, and validation.

use anyhow::{Context, Result, anyhow};
use serde::{Deserialize, Serialize};
use std::fs;
use std::time::Duration;
use tracing::warn;

/// Idle timeouts for the connection pipeline, in seconds.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct IdleConfig {
    /// The connection is closed after this long without an inbound line.
    /// `0` disables the reader idle check.
    #[serde(default = "default_reader_idle_secs")]
    pub reader_secs: u64,
    /// A `ping` probe is written after this long without an outbound line.
    /// `0` disables the writer idle probe.
    #[serde(default = "default_writer_idle_secs")]
    pub writer_secs: u64,
}

impl Default for IdleConfig {
    fn default() -> Self {
        Self {
            reader_secs: default_reader_idle_secs(),
            writer_secs: default_writer_idle_secs(),
        }
    }
}

impl IdleConfig {
    pub fn reader_idle(&self) -> Duration {
        secs_or_forever(self.reader_secs)
    }

    pub fn writer_idle(&self) -> Duration {
        secs_or_forever(self.writer_secs)
    }
}

/// A zero timeout means "disabled"; a very large sleep stands in for never.
fn secs_or_forever(secs: u64) -> Duration {
    if secs == 0 {
        Duration::from_secs(u64::MAX / 4)
    } else {
        Duration::from_secs(secs)
    }
}

fn default_reader_idle_secs() -> u64 {
    60
}
fn default_writer_idle_secs() -> u64 {
    30
}

/// Sizing for the command worker pool.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct WorkerPoolConfig {
    /// Workers that are always resident.
    #[serde(default = "default_core_size")]
    pub core_size: usize,
    /// Upper bound on workers when the queue is saturated.
    #[serde(default = "default_max_size")]
    pub max_size: usize,
    /// How long an overflow worker may sit idle before retiring.
    #[serde(default = "default_keep_alive_secs")]
    pub keep_alive_secs: u64,
    /// Capacity of the pending-command queue.
    #[serde(default = "default_queue_size")]
    pub queue_size: usize,
}

impl Default for WorkerPoolConfig {
    fn default() -> Self {
        Self {
            core_size: default_core_size(),
            max_size: default_max_size(),
            keep_alive_secs: default_keep_alive_secs(),
            queue_size: default_queue_size(),
        }
    }
}

fn default_core_size() -> usize {
    4
}
fn default_max_size() -> usize {
    16
}
fn default_keep_alive_secs() -> u64 {
    60
}
fn default_queue_size() -> usize {
    1000
}

/// Configuration for the periodic runtime stats reporter.
#[derive(Serialize, Deserialize, Debug, Clone, Copy)]
pub struct MetricsConfig {
    #[serde(default = "default_metrics_enabled")]
    pub enabled: bool,
    #[serde(default = "default_metrics_interval_secs")]
    pub interval_secs: u64,
}

impl Default for MetricsConfig {
    fn default() -> Self {
        Self {
            enabled: default_metrics_enabled(),
            interval_secs: default_metrics_interval_secs(),
        }
    }
}

fn default_metrics_enabled() -> bool {
    true
}
fn default_metrics_interval_secs() -> u64 {
    60
}

/// The validated server configuration.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub idle: IdleConfig,
    #[serde(default)]
    pub worker_pool: WorkerPoolConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

fn default_host() -> String {
    "127.0.0.1".to_string()
}
fn default_port() -> u16 {
    9090
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for Config {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            log_level: default_log_level(),
            idle: IdleConfig::default(),
            worker_pool: WorkerPoolConfig::default(),
            metrics: MetricsConfig::default(),
        }
    }
}

impl Config {
    /// Creates a new `Config` instance by reading and parsing a TOML file.
    pub fn from_file(path: &str) -> Result<Self> {
        let contents = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file at '{path}'"))?;
        let config: Config = toml::from_str(&contents)
            .with_context(|| format!("Failed to parse TOML from '{path}'"))?;
        config.validate()?;
        Ok(config)
    }

    /// Validates the configuration for logical consistency.
    pub fn validate(&self) -> Result<()> {
        if self.host.trim().is_empty() {
            return Err(anyhow!("host cannot be empty"));
        }
        if self.worker_pool.core_size == 0 {
            return Err(anyhow!("worker_pool.core_size cannot be 0"));
        }
        if self.worker_pool.max_size < self.worker_pool.core_size {
            return Err(anyhow!(
                "worker_pool.max_size ({}) cannot be smaller than core_size ({})",
                self.worker_pool.max_size,
                self.worker_pool.core_size
            ));
        }
        if self.worker_pool.queue_size == 0 {
            return Err(anyhow!("worker_pool.queue_size cannot be 0"));
        }
        if self.idle.writer_secs > 0 && self.idle.writer_secs >= self.idle.reader_secs
            && self.idle.reader_secs > 0
        {
            warn!(
                "idle.writer_secs ({}) is not below idle.reader_secs ({}); clients may be \
                 disconnected before the keep-alive probe fires",
                self.idle.writer_secs, self.idle.reader_secs
            );
        }
        if self.metrics.enabled && self.metrics.interval_secs == 0 {
            return Err(anyhow!(
                "metrics.interval_secs cannot be 0 when metrics are enabled"
            ));
        }
        Ok(())
    }
}
