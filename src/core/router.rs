//! Outcome delivery
//!
//! Writes each outcome of a dispatched batch into the sink of the query at
//! the same position. Sinks are one-shot and buffer their single value, so
//! delivery never waits on a slow or absent reader.

use super::queue::TransferQuery;
use crate::types::{TransferError, TransferOutcome};
use tracing::{debug, error};

/// Result of delivering one batch
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Delivery {
    /// Outcomes received by a waiting submitter
    pub delivered: usize,
    /// Outcomes written after the submitter stopped waiting
    pub abandoned: usize,
}

/// Routes per-item outcomes back to their submitters
#[derive(Debug, Default, Clone, Copy)]
pub struct ResponseRouter;

impl ResponseRouter {
    /// Deliver `outcomes[i]` to `batch[i]`, consuming both
    ///
    /// Every query in `batch` is resolved exactly once. If `outcomes` is
    /// shorter than `batch` (a dispatcher bug), the unmatched queries get a
    /// transport failure rather than being left without an answer.
    pub fn deliver(&self, batch: Vec<TransferQuery>, outcomes: Vec<TransferOutcome>) -> Delivery {
        let expected = batch.len();
        let received = outcomes.len();
        if expected != received {
            error!(expected, received, "Outcome count does not match batch size");
        }

        let mut outcomes = outcomes.into_iter();
        let mut delivery = Delivery::default();

        for query in batch {
            let outcome = outcomes.next().unwrap_or_else(|| {
                TransferOutcome::Failure(TransferError::Transport {
                    message: format!("no outcome for batch item ({received} of {expected})"),
                })
            });

            if query.resolve(outcome) {
                delivery.delivered += 1;
            } else {
                delivery.abandoned += 1;
            }
        }

        if delivery.abandoned > 0 {
            debug!(
                abandoned = delivery.abandoned,
                "Outcomes delivered to submitters that stopped waiting"
            );
        }

        delivery
    }
}
