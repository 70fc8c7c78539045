//! Batch dispatch to the ledger
//!
//! Turns one accumulated batch into exactly one `submit_transfers` call and
//! maps the answer back onto the batch, position by position:
//!
//! - call failed as a whole: every item gets the same `Transport` failure
//! - call succeeded: items listed as rejected get `Rejected`, all others `Success`
//!
//! The ledger is the only judge of which transfers are acceptable; nothing
//! here validates amounts or accounts.

use super::config::millis;
use super::queue::TransferQuery;
use crate::ledger::{LedgerClient, Transfer, TransferRejection, TransferResult};
use crate::types::{LedgerError, TransferError, TransferOutcome};
use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;
use tracing::{debug, warn};

/// Submits batches to the ledger and interprets the result
#[derive(Debug, Clone)]
pub struct Dispatcher {
    ledger: Arc<dyn LedgerClient>,
    timeout: Option<Duration>,
}

impl Dispatcher {
    /// Create a dispatcher over `ledger`
    ///
    /// When `timeout` is set, a ledger call that does not answer in time is
    /// treated as a transport failure of the whole batch.
    pub fn new(ledger: Arc<dyn LedgerClient>, timeout: Option<Duration>) -> Self {
        Self { ledger, timeout }
    }

    /// Submit `batch` as one ledger call
    ///
    /// The returned vector always has `batch.len()` entries, and entry `i`
    /// is the outcome for `batch[i]`.
    pub async fn submit(&self, batch: &[TransferQuery]) -> Vec<TransferOutcome> {
        if batch.is_empty() {
            return Vec::new();
        }

        let transfers: Vec<Transfer> = batch
            .iter()
            .map(|query| Transfer::from_request(query.request()))
            .collect();

        match self.call_ledger(&transfers).await {
            Ok(rejections) => {
                debug!(
                    batch_size = batch.len(),
                    rejected = rejections.len(),
                    "Ledger accepted batch"
                );
                outcomes_from_rejections(batch.len(), &rejections)
            }
            Err(error) => {
                warn!(
                    batch_size = batch.len(),
                    error = %error,
                    "Ledger call failed, failing every transfer in the batch"
                );
                let failure = TransferOutcome::Failure(TransferError::from(error));
                vec![failure; batch.len()]
            }
        }
    }

    async fn call_ledger(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<TransferRejection>, LedgerError> {
        match self.timeout {
            Some(limit) => tokio::time::timeout(limit, self.ledger.submit_transfers(transfers))
                .await
                .unwrap_or(Err(LedgerError::Timeout {
                    after_ms: millis(limit),
                })),
            None => self.ledger.submit_transfers(transfers).await,
        }
    }
}

/// Expand a rejection list into one outcome per batch position
///
/// Indices outside the batch are ignored (and logged); if an index appears
/// twice, the last reason wins.
pub fn outcomes_from_rejections(
    batch_len: usize,
    rejections: &[TransferRejection],
) -> Vec<TransferOutcome> {
    let mut rejected: HashMap<usize, TransferResult> = HashMap::with_capacity(rejections.len());
    for rejection in rejections {
        let index = rejection.index as usize;
        if index < batch_len {
            rejected.insert(index, rejection.result);
        } else {
            warn!(index, batch_len, result = %rejection.result, "Ledger rejected an index outside the batch");
        }
    }

    (0..batch_len)
        .map(|index| match rejected.get(&index) {
            Some(&result) => TransferOutcome::Failure(TransferError::Rejected { result }),
            None => TransferOutcome::Success,
        })
        .collect()
}
