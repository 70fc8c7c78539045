//! Rust Transfer Batcher Library
//! # Overview
//!
//! This library sits between many concurrent transfer submitters and a
//! double-entry ledger. Submitted transfers are coalesced into batches, each
//! batch is sent to the ledger as a single call, and every submitter receives
//! exactly one outcome for its own transfer.
//!
//! # Architecture
//!
//! - [`types`] - Core data types (AccountId, TransferRequest, TransferOutcome, errors)
//! - [`ledger`] - Ledger client boundary and an in-memory ledger
//! - [`core`] - Batching engine:
//!   - [`core::queue`] - Bounded request queue with backpressure
//!   - [`core::accumulator`] - Size and debounce-timer flush state machine
//!   - [`core::dispatcher`] - One ledger call per batch, rejection mapping
//!   - [`core::router`] - Exactly-once outcome delivery
//! - [`service`] - Account creation, funding, balances and transfers
//! - [`io`] - CSV reading and balance output
//! - [`pipeline`] - Replays an operations file through the service
//! - [`cli`] - CLI arguments parsing
//! - [`logging`] - tracing subscriber setup
//!
//! # Flush Triggers
//!
//! - **Size**: the batch reached `max_batch_size` items
//! - **Timer**: `max_batch_delay` passed with no new arrival
//! - **Shutdown**: every submitter is gone and the remainder is drained

// Module declarations
pub mod cli;
pub mod core;
pub mod io;
pub mod ledger;
pub mod logging;
pub mod pipeline;
pub mod service;
pub mod types;

pub use crate::core::{BatchConfig, BatchingEngine, TransferSubmitter};
pub use ledger::{InMemoryLedger, LedgerClient};
pub use pipeline::FilePipeline;
pub use service::TransferService;
pub use types::{
    AccountBalance, AccountId, LedgerError, PaymentError, TransferError, TransferOutcome,
    TransferRequest,
};
