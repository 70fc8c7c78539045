//! Batching engine
//!
//! `BatchingEngine` is an explicitly constructed instance owning one request
//! queue and one worker task. Several engines can run side by side (one per
//! test, for example); nothing is process-global.
//!
//! # Architecture
//!
//! ```text
//! BatchingEngine
//!     ├── TransferSubmitter      (cloneable producer handle)
//!     ├── JoinHandle<()>         (worker task running BatchAccumulator::run)
//!     │     ├── RequestQueue     (bounded, capacity = max_batch_size)
//!     │     ├── Dispatcher       (Arc<dyn LedgerClient>)
//!     │     └── ResponseRouter
//!     └── Arc<BatchStats>
//! ```

use super::accumulator::BatchAccumulator;
use super::config::{BatchConfig, MAX_BATCH_SIZE_CEILING};
use super::dispatcher::Dispatcher;
use super::queue::{PendingOutcome, RequestQueue, TransferSubmitter};
use super::router::ResponseRouter;
use super::stats::{BatchStats, BatchStatsSnapshot};
use crate::ledger::LedgerClient;
use crate::types::{PaymentError, TransferError, TransferOutcome, TransferRequest};
use std::sync::Arc;
use tokio::task::JoinHandle;

/// Handle to a running batching engine
#[derive(Debug)]
pub struct BatchingEngine {
    submitter: TransferSubmitter,
    worker: JoinHandle<()>,
    stats: Arc<BatchStats>,
}

impl BatchingEngine {
    /// Start an engine over `ledger`
    ///
    /// Spawns the worker on the current tokio runtime, so this must be
    /// called from within one. `max_batch_size` is kept within
    /// `1..=MAX_BATCH_SIZE_CEILING` even when `config` was built by hand.
    pub fn start(ledger: Arc<dyn LedgerClient>, config: &BatchConfig) -> Self {
        let max_batch_size = config.max_batch_size.clamp(1, MAX_BATCH_SIZE_CEILING);
        let (submitter, queue) = RequestQueue::bounded(max_batch_size);
        let stats = Arc::new(BatchStats::default());

        let accumulator = BatchAccumulator::new(
            queue,
            Dispatcher::new(ledger, config.ledger_timeout),
            ResponseRouter,
            Arc::clone(&stats),
            max_batch_size,
            config.max_batch_delay,
        );
        let worker = tokio::spawn(accumulator.run());

        Self {
            submitter,
            worker,
            stats,
        }
    }

    /// A producer handle that can be moved into other tasks
    ///
    /// The worker keeps running while any handle is alive.
    pub fn submitter(&self) -> TransferSubmitter {
        self.submitter.clone()
    }

    /// Submit a transfer and wait for its outcome
    pub async fn submit_transfer(&self, request: TransferRequest) -> TransferOutcome {
        self.submitter.submit_transfer(request).await
    }

    /// Enqueue a transfer without waiting for its outcome
    pub async fn submit(&self, request: TransferRequest) -> Result<PendingOutcome, TransferError> {
        self.submitter.submit(request).await
    }

    pub fn stats(&self) -> BatchStatsSnapshot {
        self.stats.snapshot()
    }

    /// Stop accepting work and wait for the worker to drain
    ///
    /// Returns once every other `TransferSubmitter` clone has also been
    /// dropped and all accepted requests have received their outcomes.
    pub async fn shutdown(self) -> Result<BatchStatsSnapshot, PaymentError> {
        let Self {
            submitter,
            worker,
            stats,
        } = self;
        drop(submitter);

        worker.await.map_err(|e| PaymentError::Runtime {
            message: format!("batch worker failed: {}", e),
        })?;

        Ok(stats.snapshot())
    }
}
