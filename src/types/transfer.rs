//! Transfer request and outcome types
//!
//! A `TransferRequest` is what a caller submits; a `TransferOutcome` is the
//! single terminal answer that caller receives once the request's batch has
//! been executed by the ledger.

use super::account::AccountId;
use super::error::TransferError;

/// A request to move `amount` from `source` to `dest`
///
/// Immutable once constructed. No business validation happens here: whether
/// the source can afford the transfer, or whether either account exists, is
/// decided by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRequest {
    /// Account that is debited
    pub source: AccountId,

    /// Account that is credited
    pub dest: AccountId,

    /// Amount in the ledger's smallest unit
    pub amount: u64,
}

impl TransferRequest {
    pub fn new(source: AccountId, dest: AccountId, amount: u64) -> Self {
        Self {
            source,
            dest,
            amount,
        }
    }
}

/// Terminal result of a submitted transfer
///
/// Exactly one outcome is produced per accepted request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TransferOutcome {
    /// The ledger posted the transfer
    Success,

    /// The transfer was not posted
    Failure(TransferError),
}

impl TransferOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, TransferOutcome::Success)
    }

    /// Convert into a `Result` so callers can use `?`
    pub fn into_result(self) -> Result<(), TransferError> {
        match self {
            TransferOutcome::Success => Ok(()),
            TransferOutcome::Failure(error) => Err(error),
        }
    }
}

impl From<TransferError> for TransferOutcome {
    fn from(error: TransferError) -> Self {
        TransferOutcome::Failure(error)
    }
}
