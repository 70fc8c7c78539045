//! Error types for the transfer batcher
//!
//! This module defines all error types that can occur while submitting
//! transfers and driving the ledger.
//!
//! # Error Categories
//!
//! - **Ledger transport errors** (`LedgerError`): the call to the ledger could not complete
//! - **Transfer errors** (`TransferError`): the terminal failure reason delivered to one caller
//! - **Application errors** (`PaymentError`): file I/O, CSV parsing, account setup
//!
//! Transfer and ledger errors are `Clone + PartialEq`: a single transport
//! failure is fanned out, unchanged, to every caller in the affected batch.

use crate::ledger::{CreateAccountResult, TransferResult};
use thiserror::Error;

/// A ledger call that failed as a whole
///
/// No per-item information is available when one of these is returned, so
/// no partial success can be assumed for the request that triggered it.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum LedgerError {
    /// The ledger could not be reached or dropped the connection mid-call
    #[error("ledger unavailable: {message}")]
    Unavailable {
        /// Transport-level description
        message: String,
    },

    /// The call did not complete within the configured timeout
    ///
    /// The ledger may or may not have applied the batch.
    #[error("ledger call timed out after {after_ms}ms")]
    Timeout {
        /// Configured timeout in milliseconds
        after_ms: u64,
    },

    /// The client has been closed
    #[error("ledger client is closed")]
    Closed,
}

/// Failure reason carried by a `TransferOutcome::Failure`
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum TransferError {
    /// The whole batch failed at the transport level
    ///
    /// Every caller in the batch receives the same message.
    #[error("ledger transport failure: {message}")]
    Transport {
        /// Rendered `LedgerError`
        message: String,
    },

    /// The ledger executed the batch but declined this transfer
    #[error("transfer rejected by ledger: {result}")]
    Rejected {
        /// Ledger result code for the rejected item
        result: TransferResult,
    },

    /// The batching engine is no longer accepting or answering requests
    #[error("transfer engine is closed")]
    EngineClosed,
}

impl From<LedgerError> for TransferError {
    fn from(error: LedgerError) -> Self {
        TransferError::Transport {
            message: error.to_string(),
        }
    }
}

/// Main application error type
///
/// Covers everything outside the batching path: reading the input file,
/// parsing rows, setting up accounts, looking up balances.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum PaymentError {
    /// File not found at the specified path
    ///
    /// This is a fatal error that prevents processing from starting.
    #[error("File not found: {path}")]
    FileNotFound {
        /// The path that was not found
        path: String,
    },

    /// I/O error occurred while reading or writing files
    #[error("I/O error: {message}")]
    IoError {
        /// Description of the I/O error
        message: String,
    },

    /// CSV parsing error occurred
    ///
    /// This is a recoverable error - the malformed record is skipped
    /// and processing continues with the next record.
    #[error("CSV parse error{}: {message}", line.map(|l| format!(" at line {}", l)).unwrap_or_default())]
    ParseError {
        /// Line number where the error occurred (if available)
        line: Option<u64>,
        /// Description of the parsing error
        message: String,
    },

    /// Account identifier is not valid hex or is too long
    #[error("Invalid account id '{value}'")]
    InvalidAccountId {
        /// The offending text
        value: String,
    },

    /// Unknown operation type in an input row
    #[error("Invalid operation '{operation}'")]
    InvalidOperation {
        /// The offending operation string
        operation: String,
    },

    /// A row is missing a field its operation requires
    #[error("{operation} for account {account} requires {field}")]
    MissingField {
        /// Operation of the row
        operation: String,
        /// Account column of the row
        account: String,
        /// Name of the missing field
        field: String,
    },

    /// Amount is not a valid unsigned 64-bit integer
    #[error("Invalid amount '{amount}' for account {account}")]
    InvalidAmount {
        /// The offending amount text
        amount: String,
        /// Account column of the row
        account: String,
    },

    /// The ledger has no account with this id
    #[error("Account {id} not found")]
    AccountNotFound {
        /// Rendered account id
        id: String,
    },

    /// The ledger refused to create an account
    #[error("Account {id} rejected by ledger: {result}")]
    AccountRejected {
        /// Rendered account id
        id: String,
        /// Ledger result code
        result: CreateAccountResult,
    },

    /// A ledger call failed wholesale
    #[error(transparent)]
    Ledger(#[from] LedgerError),

    /// A transfer submitted through the batching engine failed
    #[error(transparent)]
    Transfer(#[from] TransferError),

    /// The async runtime could not be built or a task failed
    #[error("Runtime error: {message}")]
    Runtime {
        /// Description of the failure
        message: String,
    },
}

// Conversion from io::Error to PaymentError
impl From<std::io::Error> for PaymentError {
    fn from(error: std::io::Error) -> Self {
        PaymentError::IoError {
            message: error.to_string(),
        }
    }
}

// Conversion from csv::Error to PaymentError
impl From<csv::Error> for PaymentError {
    fn from(error: csv::Error) -> Self {
        let line = error.position().map(|pos| pos.line());

        PaymentError::ParseError {
            line,
            message: error.to_string(),
        }
    }
}

// Helper functions for creating common errors

impl PaymentError {
    /// Create an InvalidAccountId error
    pub fn invalid_account_id(value: &str) -> Self {
        PaymentError::InvalidAccountId {
            value: value.to_string(),
        }
    }

    /// Create an InvalidOperation error
    pub fn invalid_operation(operation: &str) -> Self {
        PaymentError::InvalidOperation {
            operation: operation.to_string(),
        }
    }

    /// Create a MissingField error
    pub fn missing_field(operation: &str, account: &str, field: &str) -> Self {
        PaymentError::MissingField {
            operation: operation.to_string(),
            account: account.to_string(),
            field: field.to_string(),
        }
    }

    /// Create an InvalidAmount error
    pub fn invalid_amount(amount: &str, account: &str) -> Self {
        PaymentError::InvalidAmount {
            amount: amount.to_string(),
            account: account.to_string(),
        }
    }

    /// Create an AccountNotFound error
    pub fn account_not_found(id: impl ToString) -> Self {
        PaymentError::AccountNotFound { id: id.to_string() }
    }

    /// Create an AccountRejected error
    pub fn account_rejected(id: impl ToString, result: CreateAccountResult) -> Self {
        PaymentError::AccountRejected {
            id: id.to_string(),
            result,
        }
    }
}
