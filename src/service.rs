//! Account and transfer service
//!
//! `TransferService` is what an API layer talks to. It owns the batching
//! engine and a handle to the ledger:
//!
//! - transfers go through the batching engine
//! - account creation and balance lookups go straight to the ledger
//!
//! New accounts get their opening balance from the bank account
//! (`BANK_ID`), which is created with `credits_must_not_exceed_debits` and
//! is only ever used to fund customers.

use crate::core::{BatchConfig, BatchStatsSnapshot, BatchingEngine, TransferSubmitter};
use crate::ledger::{AccountFlags, CreateAccountResult, LedgerAccount, LedgerClient, BANK_ID};
use crate::types::{AccountBalance, AccountId, PaymentError, TransferError, TransferRequest};
use std::sync::Arc;
use tracing::{debug, info};

/// Front door for balance and transfer operations
#[derive(Debug)]
pub struct TransferService {
    ledger: Arc<dyn LedgerClient>,
    engine: BatchingEngine,
}

impl TransferService {
    /// Start a service, and its batching engine, over `ledger`
    ///
    /// Must be called from within a tokio runtime.
    pub fn start(ledger: Arc<dyn LedgerClient>, config: &BatchConfig) -> Self {
        let engine = BatchingEngine::start(Arc::clone(&ledger), config);
        Self { ledger, engine }
    }

    /// Create the bank account if it does not exist yet
    pub async fn initialize_bank(&self) -> Result<(), PaymentError> {
        match self.create(BANK_ID, AccountFlags::bank()).await {
            Ok(()) => {
                info!(bank = %BANK_ID, "Bank account created");
                Ok(())
            }
            Err(PaymentError::AccountRejected {
                result: CreateAccountResult::Exists,
                ..
            }) => {
                debug!(bank = %BANK_ID, "Bank account already exists");
                Ok(())
            }
            Err(e) => Err(e),
        }
    }

    /// Create a customer account with a zero balance
    ///
    /// The account can never pay out more than it has received.
    pub async fn create_account(&self, id: AccountId) -> Result<(), PaymentError> {
        self.create(id, AccountFlags::customer()).await
    }

    /// Create a customer account and fund it from the bank
    ///
    /// The funding transfer goes through the batching engine like any other.
    /// A zero `amount` skips funding.
    pub async fn create_with_balance(&self, id: AccountId, amount: u64) -> Result<(), PaymentError> {
        self.create_account(id).await?;

        if amount > 0 {
            self.transfer(BANK_ID, id, amount).await?;
        }

        debug!(account = %id, amount, "Account created with balance");
        Ok(())
    }

    /// Current posted balance of `id`
    ///
    /// Read directly from the ledger; does not wait for queued transfers.
    pub async fn balance(&self, id: AccountId) -> Result<AccountBalance, PaymentError> {
        self.ledger
            .lookup_accounts(&[id])
            .await?
            .into_iter()
            .find(|account| account.id == id)
            .map(|account| account.balance())
            .ok_or_else(|| PaymentError::account_not_found(id))
    }

    /// Move `amount` from `source` to `dest`, waiting for the outcome
    pub async fn transfer(
        &self,
        source: AccountId,
        dest: AccountId,
        amount: u64,
    ) -> Result<(), TransferError> {
        self.engine
            .submit_transfer(TransferRequest::new(source, dest, amount))
            .await
            .into_result()
    }

    /// A handle for submitting transfers from other tasks
    pub fn submitter(&self) -> TransferSubmitter {
        self.engine.submitter()
    }

    pub fn stats(&self) -> BatchStatsSnapshot {
        self.engine.stats()
    }

    /// Drain the batching engine and stop its worker
    pub async fn shutdown(self) -> Result<BatchStatsSnapshot, PaymentError> {
        self.engine.shutdown().await
    }

    async fn create(&self, id: AccountId, flags: AccountFlags) -> Result<(), PaymentError> {
        let rejections = self
            .ledger
            .create_accounts(&[LedgerAccount::new(id, flags)])
            .await?;

        match rejections.first() {
            Some(rejection) => Err(PaymentError::account_rejected(id, rejection.result)),
            None => Ok(()),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ledger::{InMemoryLedger, TransferResult};

    fn service() -> TransferService {
        TransferService::start(Arc::new(InMemoryLedger::new()), &BatchConfig::default())
    }

    #[tokio::test]
    async fn test_initialize_bank_is_idempotent() {
        let service = service();
        service.initialize_bank().await.unwrap();
        service.initialize_bank().await.unwrap();
        assert_eq!(service.balance(BANK_ID).await.unwrap().net(), 0);
    }

    #[tokio::test]
    async fn test_create_with_balance_funds_from_bank() {
        let service = service();
        service.initialize_bank().await.unwrap();
        let id = AccountId::new(0xa1);

        service.create_with_balance(id, 500).await.unwrap();

        assert_eq!(service.balance(id).await.unwrap().net(), 500);
        assert_eq!(service.balance(BANK_ID).await.unwrap().net(), -500);
    }

    #[tokio::test]
    async fn test_create_with_zero_balance_skips_funding() {
        let service = service();
        service.initialize_bank().await.unwrap();

        service.create_with_balance(AccountId::new(1), 0).await.unwrap();

        assert_eq!(service.stats().batches_dispatched, 0);
        assert_eq!(service.balance(AccountId::new(1)).await.unwrap().net(), 0);
    }

    #[tokio::test]
    async fn test_duplicate_account_is_rejected() {
        let service = service();
        service.create_account(AccountId::new(7)).await.unwrap();

        let result = service.create_account(AccountId::new(7)).await;

        assert_eq!(
            result,
            Err(PaymentError::account_rejected(
                AccountId::new(7),
                CreateAccountResult::Exists
            ))
        );
    }

    #[tokio::test]
    async fn test_transfer_and_overdraft() {
        let service = service();
        service.initialize_bank().await.unwrap();
        let (alice, bob) = (AccountId::new(1), AccountId::new(2));
        service.create_with_balance(alice, 100).await.unwrap();
        service.create_account(bob).await.unwrap();

        service.transfer(alice, bob, 60).await.unwrap();
        let overdraft = service.transfer(alice, bob, 60).await;

        assert_eq!(
            overdraft,
            Err(TransferError::Rejected {
                result: TransferResult::ExceedsCredits
            })
        );
        assert_eq!(service.balance(alice).await.unwrap().net(), 40);
        assert_eq!(service.balance(bob).await.unwrap().net(), 60);
    }

    #[tokio::test]
    async fn test_balance_of_unknown_account() {
        let service = service();
        let result = service.balance(AccountId::new(99)).await;
        assert_eq!(result, Err(PaymentError::account_not_found(AccountId::new(99))));
    }

    #[tokio::test]
    async fn test_shutdown_reports_stats() {
        let service = service();
        service.initialize_bank().await.unwrap();
        service.create_with_balance(AccountId::new(1), 10).await.unwrap();

        let stats = service.shutdown().await.unwrap();

        assert_eq!(stats.items_dispatched, 1);
        assert_eq!(stats.outcomes_delivered, 1);
    }
}
