//! Ledger engine collaborator
//!
//! The ledger is external to the batching core. This module defines the
//! narrow interface the core needs from it (`LedgerClient`) together with the
//! wire types that cross that interface, and ships an in-process
//! implementation (`InMemoryLedger`) used by the CLI and the tests.

pub mod memory;
pub mod types;

pub use memory::InMemoryLedger;
pub use types::{
    AccountFlags, AccountRejection, CreateAccountResult, LedgerAccount, Transfer,
    TransferRejection, TransferResult, BANK_ID, DEFAULT_CODE, LEDGER,
};

use crate::types::{AccountId, LedgerError};
use async_trait::async_trait;
use std::fmt;

/// Client connection to a double-entry ledger engine
///
/// Every method is one round trip. Batch methods return only the rejected
/// items; an empty vector means every item was applied. A returned `Err`
/// means the call failed as a whole and nothing can be said about any item.
#[async_trait]
pub trait LedgerClient: Send + Sync {
    /// Create accounts, in order
    async fn create_accounts(
        &self,
        accounts: &[LedgerAccount],
    ) -> Result<Vec<AccountRejection>, LedgerError>;

    /// Submit a batch of transfers, in order
    async fn submit_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<TransferRejection>, LedgerError>;

    /// Look up accounts by id; unknown ids are absent from the result
    async fn lookup_accounts(&self, ids: &[AccountId]) -> Result<Vec<LedgerAccount>, LedgerError>;
}

impl fmt::Debug for dyn LedgerClient {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("dyn LedgerClient")
    }
}
