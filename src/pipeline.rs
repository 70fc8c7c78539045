//! CSV-driven processing pipeline
//!
//! Reads an operations file, replays it against an in-memory ledger through
//! the batching engine and writes the resulting balances.
//!
//! # Architecture
//!
//! ```text
//! FilePipeline
//!     ├── OperationReader   (chunked CSV reading)
//!     ├── TransferService
//!     │     ├── BatchingEngine  (transfers)
//!     │     └── InMemoryLedger  (accounts, balances)
//!     └── write_balances_csv
//! ```
//!
//! # Ordering
//!
//! Transfers are enqueued in file order without waiting for their outcomes,
//! so consecutive transfer rows share ledger batches. A `create` row is a
//! barrier: every outstanding transfer is settled before the account is
//! created, and transfers after it are only enqueued once it is funded.

use crate::core::{BatchConfig, PendingOutcome};
use crate::io::{write_balances_csv, Operation, OperationReader};
use crate::ledger::{InMemoryLedger, LedgerClient};
use crate::service::TransferService;
use crate::types::{AccountBalance, AccountId, PaymentError, TransferOutcome, TransferRequest};
use futures::future::join_all;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::Path;
use std::sync::Arc;
use tracing::{info, warn};

/// Replays an operations CSV file and reports final balances
#[derive(Debug, Clone)]
pub struct FilePipeline {
    /// Batching configuration for the engine
    config: BatchConfig,
    /// Runtime worker threads
    workers: usize,
}

impl FilePipeline {
    /// Create a pipeline; `workers` of zero is treated as one
    pub fn new(config: BatchConfig, workers: usize) -> Self {
        Self {
            config,
            workers: workers.max(1),
        }
    }

    /// Process `input_path` and write the balance CSV to `output`
    ///
    /// Fatal errors (missing file, runtime failure, ledger unavailable during
    /// setup) are returned. Invalid rows and failed operations are logged and
    /// skipped.
    pub fn process(&self, input_path: &Path, output: &mut dyn Write) -> Result<(), PaymentError> {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(self.workers)
            .enable_all()
            .build()
            .map_err(|e| PaymentError::Runtime {
                message: format!("Failed to create tokio runtime: {}", e),
            })?;

        let balances = runtime.block_on(self.replay(input_path))?;

        write_balances_csv(&balances, output)
    }

    async fn replay(&self, input_path: &Path) -> Result<Vec<AccountBalance>, PaymentError> {
        let ledger: Arc<dyn LedgerClient> = Arc::new(InMemoryLedger::new());
        let service = TransferService::start(Arc::clone(&ledger), &self.config);
        service.initialize_bank().await?;

        let file = tokio::fs::File::open(input_path).await.map_err(|e| {
            if e.kind() == std::io::ErrorKind::NotFound {
                PaymentError::FileNotFound {
                    path: input_path.display().to_string(),
                }
            } else {
                PaymentError::from(e)
            }
        })?;

        // Wrap tokio file in a compatibility layer for csv-async
        let compat_file = tokio_util::compat::TokioAsyncReadCompatExt::compat(file);
        let mut reader = OperationReader::new(compat_file);

        let submitter = service.submitter();
        let mut accounts = BTreeSet::new();
        let mut pending = Vec::new();
        let mut failed = 0;

        loop {
            let chunk = reader.read_chunk(self.config.max_batch_size).await;
            if chunk.is_empty() {
                break;
            }

            for operation in chunk {
                match operation {
                    Operation::Create { account, amount } => {
                        failed += settle(&mut pending).await;
                        accounts.insert(account);

                        if let Err(e) = service.create_with_balance(account, amount).await {
                            warn!(account = %account, amount, error = %e, "Account setup failed");
                        }
                    }
                    Operation::Transfer(request) => {
                        let outcome = submitter.submit(request).await?;
                        pending.push((request, outcome));
                    }
                }
            }

            // Bound the number of outstanding outcomes to one chunk
            failed += settle(&mut pending).await;
        }

        drop(submitter);

        let balances = lookup_balances(ledger.as_ref(), &accounts).await?;
        let stats = service.shutdown().await?;
        info!(
            accounts = balances.len(),
            failed_transfers = failed,
            batches = stats.batches_dispatched,
            size_flushes = stats.size_flushes,
            timer_flushes = stats.timer_flushes,
            "Replay finished"
        );

        Ok(balances)
    }
}

/// Wait for every outstanding transfer and log the failures
///
/// Returns the number of failed transfers.
async fn settle(pending: &mut Vec<(TransferRequest, PendingOutcome)>) -> usize {
    let outcomes = join_all(
        pending
            .drain(..)
            .map(|(request, outcome)| async move { (request, outcome.wait().await) }),
    )
    .await;

    let mut failed = 0;
    for (request, outcome) in outcomes {
        if let TransferOutcome::Failure(e) = outcome {
            failed += 1;
            warn!(
                source = %request.source,
                dest = %request.dest,
                amount = request.amount,
                error = %e,
                "Transfer failed"
            );
        }
    }
    failed
}

async fn lookup_balances(
    ledger: &dyn LedgerClient,
    accounts: &BTreeSet<AccountId>,
) -> Result<Vec<AccountBalance>, PaymentError> {
    let ids: Vec<AccountId> = accounts.iter().copied().collect();
    let found = ledger.lookup_accounts(&ids).await?;
    Ok(found.iter().map(|account| account.balance()).collect())
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    /// Helper function to create a temporary CSV file for testing
    fn create_temp_csv(content: &str) -> NamedTempFile {
        let mut file = NamedTempFile::new().expect("Failed to create temp file");
        file.write_all(content.as_bytes())
            .expect("Failed to write to temp file");
        file.flush().expect("Failed to flush temp file");
        file
    }

    fn pipeline() -> FilePipeline {
        FilePipeline::new(BatchConfig::new(16, Duration::from_millis(5)), 2)
    }

    fn run(content: &str) -> String {
        let file = create_temp_csv(content);
        let mut output = Vec::new();
        pipeline().process(file.path(), &mut output).unwrap();
        String::from_utf8(output).unwrap()
    }

    #[test]
    fn test_transfers_move_balances() {
        let output = run("type,account,counterparty,amount\n\
                          create,1,,100\n\
                          create,2,,0\n\
                          transfer,1,2,30\n\
                          transfer,2,1,10\n");

        assert_eq!(
            output,
            "account,balance\n\
             00000000000000000000000000000001,80\n\
             00000000000000000000000000000002,20\n"
        );
    }

    #[test]
    fn test_overdraft_is_rejected_and_rest_of_batch_applies() {
        let output = run("type,account,counterparty,amount\n\
                          create,1,,50\n\
                          create,2,,0\n\
                          transfer,1,2,20\n\
                          transfer,1,2,40\n\
                          transfer,1,2,30\n");

        assert_eq!(
            output,
            "account,balance\n\
             00000000000000000000000000000001,0\n\
             00000000000000000000000000000002,50\n"
        );
    }

    #[test]
    fn test_transfer_to_unknown_account_is_skipped() {
        let output = run("type,account,counterparty,amount\n\
                          create,a,,10\n\
                          transfer,a,b,5\n");

        assert_eq!(
            output,
            "account,balance\n0000000000000000000000000000000a,10\n"
        );
    }

    #[test]
    fn test_duplicate_create_keeps_first_balance() {
        let output = run("type,account,counterparty,amount\n\
                          create,1,,10\n\
                          create,1,,99\n");

        assert_eq!(
            output,
            "account,balance\n00000000000000000000000000000001,10\n"
        );
    }

    #[test]
    fn test_missing_file() {
        let mut output = Vec::new();
        let result = pipeline().process(Path::new("does/not/exist.csv"), &mut output);

        assert_eq!(
            result,
            Err(PaymentError::FileNotFound {
                path: "does/not/exist.csv".to_string()
            })
        );
        assert!(output.is_empty());
    }
}
