//! Batch accumulation and the worker loop
//!
//! The `BatchAccumulator` is the single consumer of the request queue. It
//! waits on "next item or timer expiry, whichever comes first", collects
//! items into an ordered batch, and flushes that batch through the
//! `Dispatcher` and `ResponseRouter` when either
//!
//! - the batch reaches `max_batch_size` (size trigger, checked on every item), or
//! - `max_batch_delay` passes with no new arrival (timer trigger).
//!
//! Every arrival restarts the timer, so a steady trickle of requests defers
//! the time-based flush until the trickle pauses or the batch fills.
//!
//! # States
//!
//! ```text
//!            item (len < max)
//!         ┌───────────────────┐
//!         ▼                   │
//!  Idle ──item──▶ Accumulating ──item (len == max) / timer──▶ Flushing
//!   ▲  │                                                       │
//!   │  └─timer: no-op                                          │
//!   └──────────────────── dispatch + deliver ──────────────────┘
//! ```
//!
//! The worker awaits each flush before dequeuing again, so at most one
//! ledger call from this engine is ever in flight.

use super::config::{millis, DEFAULT_MAX_BATCH_SIZE};
use super::dispatcher::Dispatcher;
use super::queue::{RequestQueue, TransferQuery};
use super::router::ResponseRouter;
use super::stats::BatchStats;
use std::mem;
use std::sync::Arc;
use std::time::Duration;
use tokio::time::{self, Instant};
use tracing::{debug, info};

/// Where the accumulator is in its cycle
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AccumulatorState {
    /// Empty batch
    Idle,
    /// Holding between 1 and `max_batch_size - 1` items
    Accumulating,
    /// A batch has been handed to the dispatcher
    Flushing,
}

/// Why a batch was flushed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlushTrigger {
    Size,
    Timer,
    /// Every submitter is gone; the remainder is flushed before exiting
    Shutdown,
}

impl FlushTrigger {
    fn as_str(&self) -> &'static str {
        match self {
            FlushTrigger::Size => "size",
            FlushTrigger::Timer => "timer",
            FlushTrigger::Shutdown => "shutdown",
        }
    }
}

/// Single consumer that turns queued requests into ledger batches
#[derive(Debug)]
pub struct BatchAccumulator {
    queue: RequestQueue,
    dispatcher: Dispatcher,
    router: ResponseRouter,
    stats: Arc<BatchStats>,
    max_batch_size: usize,
    max_batch_delay: Duration,
    batch: Vec<TransferQuery>,
    state: AccumulatorState,
}

impl BatchAccumulator {
    pub fn new(
        queue: RequestQueue,
        dispatcher: Dispatcher,
        router: ResponseRouter,
        stats: Arc<BatchStats>,
        max_batch_size: usize,
        max_batch_delay: Duration,
    ) -> Self {
        let max_batch_size = max_batch_size.max(1);
        Self {
            queue,
            dispatcher,
            router,
            stats,
            max_batch_size,
            max_batch_delay,
            batch: Vec::with_capacity(initial_capacity(max_batch_size)),
            state: AccumulatorState::Idle,
        }
    }

    pub fn state(&self) -> AccumulatorState {
        self.state
    }

    /// Number of items in the current batch
    pub fn pending(&self) -> usize {
        self.batch.len()
    }

    /// Run until every submitter has been dropped and the queue is drained
    ///
    /// A partial batch still held at that point is flushed first, so every
    /// accepted request gets its outcome even on shutdown.
    pub async fn run(mut self) {
        info!(
            max_batch_size = self.max_batch_size,
            max_batch_delay_ms = millis(self.max_batch_delay),
            "Batch worker started"
        );

        let timer = time::sleep(self.max_batch_delay);
        tokio::pin!(timer);

        loop {
            tokio::select! {
                // Arrivals win over an expired timer: the size check must
                // see every item before a timer flush can cut the batch.
                biased;

                next = self.queue.dequeue() => match next {
                    Some(query) => {
                        if let Some(trigger) = self.accept(query) {
                            self.flush(trigger).await;
                        }
                        timer.as_mut().reset(Instant::now() + self.max_batch_delay);
                    }
                    None => {
                        if !self.batch.is_empty() {
                            self.flush(FlushTrigger::Shutdown).await;
                        }
                        break;
                    }
                },

                () = &mut timer => {
                    if let Some(trigger) = self.on_timer() {
                        self.flush(trigger).await;
                    }
                    timer.as_mut().reset(Instant::now() + self.max_batch_delay);
                }
            }
        }

        info!("Batch worker stopped");
    }

    /// Append an item; reports `Size` when the batch is now full
    fn accept(&mut self, query: TransferQuery) -> Option<FlushTrigger> {
        debug_assert_ne!(self.state, AccumulatorState::Flushing);

        self.batch.push(query);
        self.state = AccumulatorState::Accumulating;

        (self.batch.len() >= self.max_batch_size).then_some(FlushTrigger::Size)
    }

    /// Timer expiry; reports `Timer` only when there is something to flush
    fn on_timer(&self) -> Option<FlushTrigger> {
        (!self.batch.is_empty()).then_some(FlushTrigger::Timer)
    }

    /// Hand the current batch to the dispatcher and route its outcomes
    async fn flush(&mut self, trigger: FlushTrigger) {
        self.state = AccumulatorState::Flushing;
        let batch = mem::replace(
            &mut self.batch,
            Vec::with_capacity(initial_capacity(self.max_batch_size)),
        );

        debug!(batch_size = batch.len(), trigger = trigger.as_str(), "Flushing batch");

        let outcomes = self.dispatcher.submit(&batch).await;
        let failed = outcomes.iter().filter(|outcome| !outcome.is_success()).count();
        let delivery = self.router.deliver(batch, outcomes);

        self.stats.record_flush(trigger, &delivery, failed);
        self.state = AccumulatorState::Idle;
    }
}

/// Reserve at most a default-sized batch up front; larger batches grow on demand
fn initial_capacity(max_batch_size: usize) -> usize {
    max_batch_size.min(DEFAULT_MAX_BATCH_SIZE)
}
