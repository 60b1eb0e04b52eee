//! Bounded scheduling for CPU-bound encode/package tasks.
//!
//! One pool instance is shared across all concurrent upload requests and is
//! the primary backpressure mechanism: transcodes never run with unbounded
//! parallelism no matter how many uploads arrive. The submission queue is
//! bounded too; once it fills, `submit` rejects instead of queuing without
//! limit.

use std::future::Future;
use std::sync::Arc;

use thiserror::Error;
use tokio::sync::{oneshot, Semaphore, TryAcquireError};

/// Error returned when the pool's submission queue is full.
#[derive(Debug, Error, PartialEq, Eq)]
#[error("task pool full ({workers} workers, {max_queued} queued)")]
pub struct PoolFull {
    pub workers: usize,
    pub max_queued: usize,
}

/// Bounded pool for encode/package task bundles.
pub struct EncoderPool {
    workers: Arc<Semaphore>,
    slots: Arc<Semaphore>,
    worker_count: usize,
    max_queued: usize,
}

impl EncoderPool {
    /// Create a pool with `workers` concurrent tasks and room for
    /// `max_queued` submissions waiting for a worker.
    pub fn new(workers: usize, max_queued: usize) -> Self {
        assert!(workers > 0, "pool needs at least one worker");
        Self {
            workers: Arc::new(Semaphore::new(workers)),
            slots: Arc::new(Semaphore::new(workers + max_queued)),
            worker_count: workers,
            max_queued,
        }
    }

    /// Submit a task; it runs once a worker frees up.
    ///
    /// Returns a handle resolving to the task's output, or `PoolFull` when
    /// both the workers and the queue are saturated.
    pub fn submit<F, T>(&self, task: F) -> Result<TaskHandle<T>, PoolFull>
    where
        F: Future<Output = T> + Send + 'static,
        T: Send + 'static,
    {
        let slot = match Arc::clone(&self.slots).try_acquire_owned() {
            Ok(permit) => permit,
            Err(TryAcquireError::NoPermits) | Err(TryAcquireError::Closed) => {
                return Err(PoolFull {
                    workers: self.worker_count,
                    max_queued: self.max_queued,
                })
            }
        };

        let workers = Arc::clone(&self.workers);
        let (tx, rx) = oneshot::channel();

        tokio::spawn(async move {
            // Hold the queue slot for the task's whole lifetime; the worker
            // permit is what limits actual concurrency.
            let _slot = slot;
            let Ok(_permit) = workers.acquire_owned().await else {
                return;
            };
            let out = task.await;
            let _ = tx.send(out);
        });

        Ok(TaskHandle { rx })
    }

    /// Configured worker count.
    pub fn workers(&self) -> usize {
        self.worker_count
    }
}

/// Handle to a submitted task.
pub struct TaskHandle<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> TaskHandle<T> {
    /// Wait for the task's output. Returns `None` if the task panicked or was
    /// dropped before completing.
    pub async fn join(self) -> Option<T> {
        self.rx.await.ok()
    }
}
