//! Types module
//!
//! Contains core data structures used throughout the application.
//! This module organizes types into logical submodules:
//! - `account`: Account identifier and balance view
//! - `transfer`: Transfer requests and their outcomes
//! - `error`: Error types for ledger calls, transfers and the application

pub mod account;
pub mod error;
pub mod transfer;

pub use account::{AccountBalance, AccountId};
pub use error::{LedgerError, PaymentError, TransferError};
pub use transfer::{TransferOutcome, TransferRequest};
