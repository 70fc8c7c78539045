//! Transfer batching core
//!
//! This module contains the components between a transfer submitter and
//! the ledger:
//! - `queue` - Bounded request queue and per-request outcome channel
//! - `accumulator` - Single worker collecting requests into batches
//! - `dispatcher` - One ledger call per batch, outcome mapping
//! - `router` - Delivery of outcomes back to submitters
//! - `engine` - Construction and lifecycle of the whole pipeline
//! - `config` - Batch size and delay knobs
//! - `stats` - Worker counters

pub mod accumulator;
pub mod config;
pub mod dispatcher;
pub mod engine;
pub mod queue;
pub mod router;
pub mod stats;

pub use accumulator::{AccumulatorState, BatchAccumulator, FlushTrigger};
pub use config::BatchConfig;
pub use dispatcher::Dispatcher;
pub use engine::BatchingEngine;
pub use queue::{PendingOutcome, RequestQueue, TransferQuery, TransferSubmitter};
pub use router::{Delivery, ResponseRouter};
pub use stats::BatchStatsSnapshot;
