//! Request queue between submitters and the batching worker
//!
//! Submitters hold cloneable `TransferSubmitter` handles; the single worker
//! owns the `RequestQueue`. The queue is a bounded tokio `mpsc` channel, so
//! `enqueue` waits for space instead of dropping, and every item carries a
//! `oneshot` sink through which its outcome comes back.
//!
//! ```text
//! TransferSubmitter ──enqueue──▶ RequestQueue ──dequeue──▶ worker
//!        ▲                                                   │
//!        └──────────── PendingOutcome ◀── oneshot ───────────┘
//! ```

use super::config::MAX_BATCH_SIZE_CEILING;
use crate::types::{TransferError, TransferOutcome, TransferRequest};
use tokio::sync::{mpsc, oneshot};

/// One transfer request paired with the sink for its outcome
///
/// Owned by the queue, then by the worker, until `resolve` consumes it.
/// Consuming `self` is what makes the outcome write happen at most once.
#[derive(Debug)]
pub struct TransferQuery {
    request: TransferRequest,
    result_sink: oneshot::Sender<TransferOutcome>,
}

impl TransferQuery {
    /// Pair `request` with a fresh outcome channel
    pub fn new(request: TransferRequest) -> (Self, PendingOutcome) {
        let (result_sink, receiver) = oneshot::channel();
        (
            Self {
                request,
                result_sink,
            },
            PendingOutcome { receiver },
        )
    }

    pub fn request(&self) -> &TransferRequest {
        &self.request
    }

    /// Write the outcome into the sink
    ///
    /// Never blocks: the sink buffers exactly one value. Returns `false` when
    /// the submitter has already stopped waiting, in which case the outcome
    /// is discarded.
    pub fn resolve(self, outcome: TransferOutcome) -> bool {
        self.result_sink.send(outcome).is_ok()
    }
}

/// The submitter's half of a `TransferQuery`
#[derive(Debug)]
pub struct PendingOutcome {
    receiver: oneshot::Receiver<TransferOutcome>,
}

impl PendingOutcome {
    /// Wait for the outcome
    ///
    /// If the sink was dropped without a value (the worker is gone), this
    /// resolves to `TransferError::EngineClosed` instead of hanging.
    pub async fn wait(self) -> TransferOutcome {
        self.receiver
            .await
            .unwrap_or(TransferOutcome::Failure(TransferError::EngineClosed))
    }
}

/// Producer handle onto the request queue
#[derive(Debug, Clone)]
pub struct TransferSubmitter {
    tx: mpsc::Sender<TransferQuery>,
}

impl TransferSubmitter {
    /// Append `query` at the tail of the queue, waiting while it is full
    ///
    /// # Errors
    ///
    /// `TransferError::EngineClosed` if the worker has stopped; the query is
    /// dropped, so its `PendingOutcome` also resolves to `EngineClosed`.
    pub async fn enqueue(&self, query: TransferQuery) -> Result<(), TransferError> {
        self.tx
            .send(query)
            .await
            .map_err(|_| TransferError::EngineClosed)
    }

    /// Enqueue `request` and hand back the handle to await its outcome
    ///
    /// Returns as soon as the request is accepted, which lets a caller keep
    /// several requests in flight while preserving their submission order.
    pub async fn submit(&self, request: TransferRequest) -> Result<PendingOutcome, TransferError> {
        let (query, pending) = TransferQuery::new(request);
        self.enqueue(query).await?;
        Ok(pending)
    }

    /// Submit `request` and wait for its outcome
    pub async fn submit_transfer(&self, request: TransferRequest) -> TransferOutcome {
        match self.submit(request).await {
            Ok(pending) => pending.wait().await,
            Err(error) => TransferOutcome::Failure(error),
        }
    }

    /// Whether the consuming side has gone away
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// Consumer end of the request queue, owned by the worker
#[derive(Debug)]
pub struct RequestQueue {
    rx: mpsc::Receiver<TransferQuery>,
    capacity: usize,
}

impl RequestQueue {
    /// Create a queue holding at most `capacity` items
    ///
    /// The capacity is kept within `1..=MAX_BATCH_SIZE_CEILING`.
    pub fn bounded(capacity: usize) -> (TransferSubmitter, RequestQueue) {
        let capacity = capacity.clamp(1, MAX_BATCH_SIZE_CEILING);
        let (tx, rx) = mpsc::channel(capacity);
        (TransferSubmitter { tx }, RequestQueue { rx, capacity })
    }

    /// Remove and return the head item, waiting while the queue is empty
    ///
    /// Returns `None` once every submitter has been dropped and the queue
    /// is drained.
    pub async fn dequeue(&mut self) -> Option<TransferQuery> {
        self.rx.recv().await
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Number of items currently waiting
    pub fn len(&self) -> usize {
        self.rx.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rx.is_empty()
    }
}
