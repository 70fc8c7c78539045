//! Shared helpers for integration tests

#![allow(dead_code)]

use async_trait::async_trait;
use rust_transfer_batcher::ledger::{
    AccountFlags, AccountRejection, LedgerAccount, LedgerClient, Transfer, TransferRejection,
    BANK_ID,
};
use rust_transfer_batcher::{AccountId, InMemoryLedger, LedgerError, TransferRequest};
use std::sync::Mutex;
use std::time::Duration;
use tokio::time::Instant;

/// One `submit_transfers` call as seen by the ledger
#[derive(Debug, Clone)]
pub struct RecordedBatch {
    pub at: Instant,
    pub amounts: Vec<u64>,
}

/// Ledger double that records every transfer batch
///
/// Accepted batches are forwarded to an `InMemoryLedger`, so balances and
/// rejections behave like the real thing. A failing ledger records the
/// batch and then returns the configured error without applying anything.
pub struct RecordingLedger {
    inner: InMemoryLedger,
    batches: Mutex<Vec<RecordedBatch>>,
    failure: Option<LedgerError>,
    delay: Duration,
}

impl RecordingLedger {
    pub fn new() -> Self {
        Self {
            inner: InMemoryLedger::new(),
            batches: Mutex::new(Vec::new()),
            failure: None,
            delay: Duration::ZERO,
        }
    }

    pub fn failing(error: LedgerError) -> Self {
        Self {
            failure: Some(error),
            ..Self::new()
        }
    }

    /// Hold every transfer call for `delay` before answering
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Create a customer account holding `amount`, bypassing the recorder
    pub async fn fund(&self, id: AccountId, amount: u64) {
        self.inner
            .create_accounts(&[
                LedgerAccount::new(BANK_ID, AccountFlags::bank()),
                LedgerAccount::new(id, AccountFlags::customer()),
            ])
            .await
            .unwrap();

        if amount > 0 {
            let funding = Transfer::from_request(&TransferRequest::new(BANK_ID, id, amount));
            let rejections = self.inner.submit_transfers(&[funding]).await.unwrap();
            assert!(rejections.is_empty(), "funding rejected: {:?}", rejections);
        }
    }

    pub async fn net_balance(&self, id: AccountId) -> i128 {
        self.inner.lookup_accounts(&[id]).await.unwrap()[0]
            .balance()
            .net()
    }

    pub fn batches(&self) -> Vec<RecordedBatch> {
        self.batches.lock().unwrap().clone()
    }

    pub fn batch_amounts(&self) -> Vec<Vec<u64>> {
        self.batches()
            .into_iter()
            .map(|batch| batch.amounts)
            .collect()
    }
}

#[async_trait]
impl LedgerClient for RecordingLedger {
    async fn create_accounts(
        &self,
        accounts: &[LedgerAccount],
    ) -> Result<Vec<AccountRejection>, LedgerError> {
        self.inner.create_accounts(accounts).await
    }

    async fn submit_transfers(
        &self,
        transfers: &[Transfer],
    ) -> Result<Vec<TransferRejection>, LedgerError> {
        self.batches.lock().unwrap().push(RecordedBatch {
            at: Instant::now(),
            amounts: transfers.iter().map(|transfer| transfer.amount).collect(),
        });

        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }

        match &self.failure {
            Some(error) => Err(error.clone()),
            None => self.inner.submit_transfers(transfers).await,
        }
    }

    async fn lookup_accounts(&self, ids: &[AccountId]) -> Result<Vec<LedgerAccount>, LedgerError> {
        self.inner.lookup_accounts(ids).await
    }
}

/// A transfer between two fixed accounts, tagged by `amount`
pub fn tagged(amount: u64) -> TransferRequest {
    TransferRequest::new(AccountId::new(1), AccountId::new(2), amount)
}
