// src/core/dispatch/worker_pool.rs

//! A bounded, elastic worker pool for command execution.
//!
//! The pool keeps `core_size` resident workers consuming a bounded job
//! queue. When the queue fills it grows up to `max_size` workers; the extra
//! workers retire after `keep_alive` of idleness. When the queue is full and
//! the pool cannot grow any further, the submitted job runs inline on the
//! submitting task (caller-runs backpressure): the I/O task stalls rather
//! than dropping the command or queueing without bound.

use crate::config::WorkerPoolConfig;
use std::future::Future;
use std::pin::Pin;
use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;
use tokio::sync::{Mutex, mpsc};
use tokio::task::JoinSet;
use tracing::{debug, warn};

/// A unit of work submitted to the pool.
pub type Job = Pin<Box<dyn Future<Output = ()> + Send + 'static>>;

pub struct WorkerPool {
    // `None` once the pool is shut down.
    queue_tx: Mutex<Option<mpsc::Sender<Job>>>,
    queue_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    workers: Mutex<JoinSet<()>>,
    worker_count: Arc<AtomicUsize>,
    max_size: usize,
    keep_alive: Duration,
}

impl WorkerPool {
    /// Starts the resident workers. Must be called inside a Tokio runtime.
    pub fn new(cfg: &WorkerPoolConfig) -> Self {
        let (queue_tx, queue_rx) = mpsc::channel(cfg.queue_size);
        let queue_rx = Arc::new(Mutex::new(queue_rx));
        let worker_count = Arc::new(AtomicUsize::new(0));

        let mut workers = JoinSet::new();
        for _ in 0..cfg.core_size {
            worker_count.fetch_add(1, Ordering::AcqRel);
            workers.spawn(worker_loop(queue_rx.clone(), None, worker_count.clone()));
        }

        Self {
            queue_tx: Mutex::new(Some(queue_tx)),
            queue_rx,
            workers: Mutex::new(workers),
            worker_count,
            max_size: cfg.max_size,
            keep_alive: Duration::from_secs(cfg.keep_alive_secs),
        }
    }

    /// Submits a job. Never blocks waiting for queue space: a saturated pool
    /// first tries to grow, then falls back to running the job inline on the
    /// calling task.
    pub async fn execute(&self, job: Job) {
        let Some(queue_tx) = self.queue_tx.lock().await.clone() else {
            warn!("worker pool is shut down, discarding submitted task");
            return;
        };

        match queue_tx.try_send(job) {
            Ok(()) => {}
            Err(mpsc::error::TrySendError::Full(job)) => {
                let job = if self.try_grow().await {
                    match queue_tx.try_send(job) {
                        Ok(()) => return,
                        Err(mpsc::error::TrySendError::Full(job))
                        | Err(mpsc::error::TrySendError::Closed(job)) => job,
                    }
                } else {
                    job
                };
                warn!("worker pool saturated, running task on the submitting context");
                job.await;
            }
            Err(mpsc::error::TrySendError::Closed(_)) => {
                warn!("worker pool queue is closed, discarding submitted task");
            }
        }
    }

    /// Current number of live workers.
    pub fn worker_count(&self) -> usize {
        self.worker_count.load(Ordering::Acquire)
    }

    /// Spawns one overflow worker if the pool is below `max_size`.
    async fn try_grow(&self) -> bool {
        loop {
            let current = self.worker_count.load(Ordering::Acquire);
            if current >= self.max_size {
                return false;
            }
            if self
                .worker_count
                .compare_exchange(current, current + 1, Ordering::AcqRel, Ordering::Acquire)
                .is_ok()
            {
                debug!("growing worker pool to {} workers", current + 1);
                self.workers.lock().await.spawn(worker_loop(
                    self.queue_rx.clone(),
                    Some(self.keep_alive),
                    self.worker_count.clone(),
                ));
                return true;
            }
        }
    }

    /// Closes the queue, waits up to `grace` for workers to drain it, then
    /// aborts whatever is left.
    pub async fn shutdown(&self, grace: Duration) {
        self.queue_tx.lock().await.take();

        let mut workers = self.workers.lock().await;
        let drained = tokio::time::timeout(grace, async {
            while workers.join_next().await.is_some() {}
        })
        .await;
        if drained.is_err() {
            warn!(
                "worker pool did not drain within {}s, aborting remaining workers",
                grace.as_secs()
            );
            workers.shutdown().await;
        }
    }
}

/// One worker: takes jobs off the shared queue and runs them to completion.
/// Resident workers (`keep_alive` of `None`) wait indefinitely; overflow
/// workers retire after the keep-alive elapses with no work.
async fn worker_loop(
    queue_rx: Arc<Mutex<mpsc::Receiver<Job>>>,
    keep_alive: Option<Duration>,
    worker_count: Arc<AtomicUsize>,
) {
    loop {
        let job = match keep_alive {
            None => queue_rx.lock().await.recv().await,
            Some(ttl) => {
                match tokio::time::timeout(ttl, async { queue_rx.lock().await.recv().await }).await
                {
                    Ok(job) => job,
                    // Idle overflow worker retires.
                    Err(_) => break,
                }
            }
        };
        match job {
            Some(job) => job.await,
            // Queue closed and drained: the pool is shutting down.
            None => break,
        }
    }
    worker_count.fetch_sub(1, Ordering::AcqRel);
}
