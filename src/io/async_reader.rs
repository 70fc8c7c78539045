//! Asynchronous CSV reader with batch interface
//!
//! Provides a streaming interface over operation records from a CSV file.
//!
//! # Design
//!
//! The OperationReader uses:
//! - csv-async for streaming CSV parsing
//! - futures streams for pulling records
//! - Chunked reading so memory stays constant regardless of file size
//!
//! # Architecture
//!
//! ```text
//! CSV Reader → OperationReader → chunks of Operations
//!                    ↓
//!             csv_format module
//!             (CsvRecord, convert_csv_record)
//! ```

use crate::core::config::DEFAULT_MAX_BATCH_SIZE;
use crate::io::csv_format::{convert_csv_record, CsvRecord, Operation};
use csv_async::AsyncReaderBuilder;
use futures::io::AsyncRead;
use futures::stream::StreamExt;
use tracing::warn;

/// Asynchronous CSV reader over operation rows
pub struct OperationReader<R: AsyncRead + Unpin> {
    csv_reader: csv_async::AsyncDeserializer<R>,
}

impl<R: AsyncRead + Unpin + Send + 'static> OperationReader<R> {
    /// Create a new OperationReader from an async reader
    ///
    /// Rows may have fewer columns than the header (`create` rows usually
    /// omit the counterparty), and every field is trimmed.
    pub fn new(reader: R) -> Self {
        let csv_reader = AsyncReaderBuilder::new()
            .flexible(true)
            .trim(csv_async::Trim::All)
            .create_deserializer(reader);

        Self { csv_reader }
    }

    /// Read up to `chunk_size` operations
    ///
    /// Invalid rows are logged and skipped. Returns an empty vector when the
    /// end of the input is reached.
    pub async fn read_chunk(&mut self, chunk_size: usize) -> Vec<Operation> {
        let mut chunk = Vec::with_capacity(chunk_size.min(DEFAULT_MAX_BATCH_SIZE));
        let mut records = self.csv_reader.deserialize::<CsvRecord>();

        while chunk.len() < chunk_size {
            match records.next().await {
                Some(Ok(csv_record)) => match convert_csv_record(csv_record) {
                    Ok(operation) => chunk.push(operation),
                    Err(e) => warn!(error = %e, "Skipping invalid record"),
                },
                Some(Err(e)) => warn!(error = %e, "Skipping unparseable CSV row"),
                None => break,
            }
        }

        chunk
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::{AccountId, TransferRequest};
    use futures::io::Cursor;

    #[tokio::test]
    async fn test_read_chunks() {
        let csv_content = "type,account,counterparty,amount\n\
            create,a,,100\n\
            create,b,,0\n\
            transfer,a,b,40\n";
        let mut reader = OperationReader::new(Cursor::new(csv_content.as_bytes()));

        let chunk = reader.read_chunk(2).await;
        assert_eq!(
            chunk,
            vec![
                Operation::Create {
                    account: AccountId::new(0xa),
                    amount: 100
                },
                Operation::Create {
                    account: AccountId::new(0xb),
                    amount: 0
                },
            ]
        );

        let chunk = reader.read_chunk(2).await;
        assert_eq!(
            chunk,
            vec![Operation::Transfer(TransferRequest::new(
                AccountId::new(0xa),
                AccountId::new(0xb),
                40
            ))]
        );

        assert!(reader.read_chunk(2).await.is_empty());
    }

    #[tokio::test]
    async fn test_short_rows_and_whitespace() {
        let csv_content = "type,account,counterparty,amount\n  create ,  c  \n";
        let mut reader = OperationReader::new(Cursor::new(csv_content.as_bytes()));

        let chunk = reader.read_chunk(10).await;
        assert_eq!(
            chunk,
            vec![Operation::Create {
                account: AccountId::new(0xc),
                amount: 0
            }]
        );
    }

    #[tokio::test]
    async fn test_invalid_rows_are_skipped() {
        let csv_content = "type,account,counterparty,amount\n\
            refund,a,,1\n\
            transfer,a,b,\n\
            create,not-hex,,5\n\
            create,d,,5\n";
        let mut reader = OperationReader::new(Cursor::new(csv_content.as_bytes()));

        let chunk = reader.read_chunk(10).await;
        assert_eq!(
            chunk,
            vec![Operation::Create {
                account: AccountId::new(0xd),
                amount: 5
            }]
        );
    }

    #[tokio::test]
    async fn test_huge_chunk_size_reads_what_is_there() {
        let csv_content = "type,account,counterparty,amount\ncreate,e,,1\n";
        let mut reader = OperationReader::new(Cursor::new(csv_content.as_bytes()));

        let chunk = reader.read_chunk(1 << 40).await;
        assert_eq!(
            chunk,
            vec![Operation::Create {
                account: AccountId::new(0xe),
                amount: 1
            }]
        );
    }

    #[tokio::test]
    async fn test_header_only() {
        let csv_content = "type,account,counterparty,amount\n";
        let mut reader = OperationReader::new(Cursor::new(csv_content.as_bytes()));
        assert!(reader.read_chunk(10).await.is_empty());
    }
}
