//! Counters kept by the batch worker
//!
//! Written only by the worker, read by anyone holding the engine. Relaxed
//! ordering is enough: each counter is independent and only ever grows.

use super::accumulator::FlushTrigger;
use super::router::Delivery;
use std::sync::atomic::{AtomicU64, Ordering};

#[derive(Debug, Default)]
pub struct BatchStats {
    batches_dispatched: AtomicU64,
    size_flushes: AtomicU64,
    timer_flushes: AtomicU64,
    items_dispatched: AtomicU64,
    items_failed: AtomicU64,
    outcomes_delivered: AtomicU64,
    outcomes_abandoned: AtomicU64,
}

/// Point-in-time copy of `BatchStats`
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct BatchStatsSnapshot {
    pub batches_dispatched: u64,
    pub size_flushes: u64,
    pub timer_flushes: u64,
    pub items_dispatched: u64,
    pub items_failed: u64,
    /// Outcomes written to a sink whose submitter was still waiting
    pub outcomes_delivered: u64,
    /// Outcomes written to a sink whose submitter had already gone
    pub outcomes_abandoned: u64,
}

impl BatchStats {
    pub(crate) fn record_flush(&self, trigger: FlushTrigger, delivery: &Delivery, failed: usize) {
        self.batches_dispatched.fetch_add(1, Ordering::Relaxed);
        match trigger {
            FlushTrigger::Size => self.size_flushes.fetch_add(1, Ordering::Relaxed),
            FlushTrigger::Timer => self.timer_flushes.fetch_add(1, Ordering::Relaxed),
            FlushTrigger::Shutdown => 0,
        };

        let delivered = delivery.delivered as u64;
        let abandoned = delivery.abandoned as u64;
        self.items_dispatched
            .fetch_add(delivered + abandoned, Ordering::Relaxed);
        self.items_failed.fetch_add(failed as u64, Ordering::Relaxed);
        self.outcomes_delivered
            .fetch_add(delivered, Ordering::Relaxed);
        self.outcomes_abandoned
            .fetch_add(abandoned, Ordering::Relaxed);
    }

    pub fn snapshot(&self) -> BatchStatsSnapshot {
        BatchStatsSnapshot {
            batches_dispatched: self.batches_dispatched.load(Ordering::Relaxed),
            size_flushes: self.size_flushes.load(Ordering::Relaxed),
            timer_flushes: self.timer_flushes.load(Ordering::Relaxed),
            items_dispatched: self.items_dispatched.load(Ordering::Relaxed),
            items_failed: self.items_failed.load(Ordering::Relaxed),
            outcomes_delivered: self.outcomes_delivered.load(Ordering::Relaxed),
            outcomes_abandoned: self.outcomes_abandoned.load(Ordering::Relaxed),
        }
    }
}
