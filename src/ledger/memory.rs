//! In-process double-entry ledger
//!
//! `InMemoryLedger` implements `LedgerClient` without any network hop. It keeps
//! accounts in a `DashMap` so lookups from any task proceed concurrently,
//! while postings are serialized so a transfer's limit check and its effect
//! are never interleaved with another posting.
//!
//! Each transfer of a batch is validated and applied independently and in
//! order: later items observe the effects of earlier ones, and a rejected
//! item leaves no trace.

use super::types::{
    AccountRejection, CreateAccountResult, LedgerAccount, Transfer, TransferRejection,
    TransferResult,
};
use super::LedgerClient;
use crate::types::{AccountId, LedgerError};
use async_trait::async_trait;
use dashmap::DashMap;
use std::sync::{Mutex, MutexGuard};

/// Thread-safe in-memory ledger engine
#[derive(Debug, Default)]
pub struct InMemoryLedger {
    /// Account table keyed by id
    accounts: DashMap<AccountId, LedgerAccount>,

    /// Every posted transfer, keyed by transfer id
    transfers: DashMap<u128, Transfer>,

    /// Held for the duration of a create or submit batch
    posting: Mutex<()>,
}

impl InMemoryLedger {
    /// Create an empty ledger
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of accounts created so far
    pub fn account_count(&self) -> usize {
        self.accounts.len()
    }

    /// Number of transfers posted so far
    pub fn transfer_count(&self) -> usize {
        self.transfers.len()
    }

    fn lock_postings(&self) -> MutexGuard<'_, ()> {
        // The guarded value is `()`, so a poisoned lock carries no broken state.
        self.posting
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    fn create_one(&self, account: &LedgerAccount) -> Result<(), CreateAccountResult> {
        if account.id.is_zero() {
            return Err(CreateAccountResult::IdMustNotBeZero);
        }
        if account.flags.debits_must_not_exceed_credits
            && account.flags.credits_must_not_exceed_debits
        {
            return Err(CreateAccountResult::FlagsAreMutuallyExclusive);
        }
        if self.accounts.contains_key(&account.id) {
            return Err(CreateAccountResult::Exists);
        }

        self.accounts.insert(
            account.id,
            LedgerAccount {
                debits_posted: 0,
                credits_posted: 0,
                ..account.clone()
            },
        );
        Ok(())
    }

    /// Validate and post a single transfer
    ///
    /// Must be called with the posting lock held.
    fn post_one(&self, transfer: &Transfer) -> Result<(), TransferResult> {
        if transfer.id == 0 {
            return Err(TransferResult::IdMustNotBeZero);
        }
        if transfer.debit_account_id == transfer.credit_account_id {
            return Err(TransferResult::AccountsMustBeDifferent);
        }

        // Snapshot both sides; the shard guards are released before posting.
        let debit = self
            .accounts
            .get(&transfer.debit_account_id)
            .map(|entry| entry.value().clone())
            .ok_or(TransferResult::DebitAccountNotFound)?;
        let credit = self
            .accounts
            .get(&transfer.credit_account_id)
            .map(|entry| entry.value().clone())
            .ok_or(TransferResult::CreditAccountNotFound)?;

        if debit.ledger != transfer.ledger || credit.ledger != transfer.ledger {
            return Err(TransferResult::LedgerMustMatch);
        }
        if self.transfers.contains_key(&transfer.id) {
            return Err(TransferResult::Exists);
        }

        let debits_posted = debit
            .debits_posted
            .checked_add(transfer.amount)
            .ok_or(TransferResult::OverflowsDebitsPosted)?;
        let credits_posted = credit
            .credits_posted
            .checked_add(transfer.amount)
            .ok_or(TransferResult::OverflowsCreditsPosted)?;

        if debit.flags.debits_must_not_exceed_credits && debits_posted > debit.credits_posted {
            return Err(TransferResult::ExceedsCredits);
        }
        if credit.flags.credits_must_not_exceed_debits && credits_posted > credit.debits_posted {
            return Err(TransferResult::ExceedsDebits);
        }

        if let Some(mut entry) = self.accounts.get_mut(&transfer.debit_account_id) {
            entry.debits_posted = debits_posted;
        }
        if let Some(mut entry) = self.accounts.get_mut(&transfer.credit_account_id) {
            entry.credits_posted = credits_posted;
        }
        self.transfers.insert(transfer.id, transfer.clone());

        Ok(())
    }
}

#[async_trait]
impl LedgerClient for InMemoryLedger {
    async fn create_accounts(
        &self,
        accounts: &[LedgerAccount],
    ) -> Result<Vec<AccountRejection>, LedgerError> {
        let _guard = self.lock_postings();

        Ok(accounts
            .iter()
            .enumerate()
            .filter_map(|(index, account)| {
                self.create_one(account)
                    .err()
                    .map(|result| AccountRejection {
                        index: index as u32,
                        result,
                    })
            })
            .collect())
    }

    async fn submit_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<TransferRejection>, LedgerError> {
        let _guard = self.lock_postings();

        Ok(transfers
            .iter()
            .enumerate()
            .filter_map(|(index, transfer)| {
                self.post_one(transfer)
                    .err()
                    .map(|result| TransferRejection {
                        index: index as u32,
                        result,
                    })
            })
            .collect())
    }

    async fn lookup_accounts(&self, ids: &[AccountId]) -> Result<Vec<LedgerAccount>, LedgerError> {
        Ok(ids
            .iter()
            .filter_map(|id| self.accounts.get(id).map(|entry| entry.value().clone()))
            .collect())
    }
}
