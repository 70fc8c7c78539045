//! Ledger wire types
//!
//! These mirror what a double-entry ledger engine accepts and returns: accounts
//! with posted totals and limit flags, transfers between two accounts, and
//! per-item result codes for the items of a batch that were rejected.

use crate::types::{AccountBalance, AccountId, TransferRequest};
use std::fmt;

/// Ledger partition all accounts and transfers of this service live in
pub const LEDGER: u32 = 700;

/// Account/transfer code used for every record this service writes
pub const DEFAULT_CODE: u16 = 718;

/// Reserved account that funds initial balances
///
/// The bank is created with `credits_must_not_exceed_debits`, so it can only
/// ever pay out.
pub const BANK_ID: AccountId = AccountId::new(0xffff_ffff_ffff_ffff_ffff_ffff_ffff_ff00);

/// Limit flags enforced by the ledger on every posting
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct AccountFlags {
    /// The account can't pay more than it has received
    pub debits_must_not_exceed_credits: bool,

    /// The account can't receive more than it has paid out
    pub credits_must_not_exceed_debits: bool,
}

impl AccountFlags {
    /// Flags for a customer account
    pub fn customer() -> Self {
        Self {
            debits_must_not_exceed_credits: true,
            credits_must_not_exceed_debits: false,
        }
    }

    /// Flags for the bank account
    pub fn bank() -> Self {
        Self {
            debits_must_not_exceed_credits: false,
            credits_must_not_exceed_debits: true,
        }
    }
}

/// A ledger account record
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerAccount {
    pub id: AccountId,
    pub ledger: u32,
    pub code: u16,
    pub flags: AccountFlags,
    pub debits_posted: u64,
    pub credits_posted: u64,
}

impl LedgerAccount {
    /// A fresh account on the default ledger with zero totals
    pub fn new(id: AccountId, flags: AccountFlags) -> Self {
        Self {
            id,
            ledger: LEDGER,
            code: DEFAULT_CODE,
            flags,
            debits_posted: 0,
            credits_posted: 0,
        }
    }

    pub fn balance(&self) -> AccountBalance {
        AccountBalance {
            id: self.id,
            debits_posted: self.debits_posted,
            credits_posted: self.credits_posted,
        }
    }
}

/// A transfer record as submitted to the ledger
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// Unique transfer id, never zero
    pub id: u128,
    pub debit_account_id: AccountId,
    pub credit_account_id: AccountId,
    pub amount: u64,
    pub ledger: u32,
    pub code: u16,
}

impl Transfer {
    /// Build the ledger payload for a request, with a fresh random id
    pub fn from_request(request: &TransferRequest) -> Self {
        Self {
            id: uuid::Uuid::new_v4().as_u128(),
            debit_account_id: request.source,
            credit_account_id: request.dest,
            amount: request.amount,
            ledger: LEDGER,
            code: DEFAULT_CODE,
        }
    }
}

/// Why the ledger declined a single transfer
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TransferResult {
    IdMustNotBeZero,
    AccountsMustBeDifferent,
    DebitAccountNotFound,
    CreditAccountNotFound,
    LedgerMustMatch,
    Exists,
    ExceedsCredits,
    ExceedsDebits,
    OverflowsDebitsPosted,
    OverflowsCreditsPosted,
}

impl TransferResult {
    pub fn as_str(&self) -> &'static str {
        match self {
            TransferResult::IdMustNotBeZero => "id_must_not_be_zero",
            TransferResult::AccountsMustBeDifferent => "accounts_must_be_different",
            TransferResult::DebitAccountNotFound => "debit_account_not_found",
            TransferResult::CreditAccountNotFound => "credit_account_not_found",
            TransferResult::LedgerMustMatch => "ledger_must_match",
            TransferResult::Exists => "exists",
            TransferResult::ExceedsCredits => "exceeds_credits",
            TransferResult::ExceedsDebits => "exceeds_debits",
            TransferResult::OverflowsDebitsPosted => "overflows_debits_posted",
            TransferResult::OverflowsCreditsPosted => "overflows_credits_posted",
        }
    }
}

impl fmt::Display for TransferResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why the ledger declined to create a single account
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CreateAccountResult {
    IdMustNotBeZero,
    FlagsAreMutuallyExclusive,
    Exists,
}

impl fmt::Display for CreateAccountResult {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            CreateAccountResult::IdMustNotBeZero => "id_must_not_be_zero",
            CreateAccountResult::FlagsAreMutuallyExclusive => "flags_are_mutually_exclusive",
            CreateAccountResult::Exists => "exists",
        })
    }
}

/// A rejected item of a transfer batch, identified by its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TransferRejection {
    pub index: u32,
    pub result: TransferResult,
}

/// A rejected item of an account batch, identified by its position
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountRejection {
    pub index: u32,
    pub result: CreateAccountResult,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_bank_id_matches_reserved_hex() {
        assert_eq!(
            BANK_ID,
            AccountId::from_hex("ffffffffffffffffffffffffffffff00").unwrap()
        );
    }

    #[test]
    fn test_transfer_from_request_maps_source_to_debit() {
        let request = TransferRequest::new(AccountId::new(1), AccountId::new(2), 40);
        let transfer = Transfer::from_request(&request);

        assert_eq!(transfer.debit_account_id, AccountId::new(1));
        assert_eq!(transfer.credit_account_id, AccountId::new(2));
        assert_eq!(transfer.amount, 40);
        assert_eq!(transfer.ledger, LEDGER);
        assert_eq!(transfer.code, DEFAULT_CODE);
        assert_ne!(transfer.id, 0);
    }

    #[test]
    fn test_transfer_ids_are_unique() {
        let request = TransferRequest::new(AccountId::new(1), AccountId::new(2), 1);
        assert_ne!(
            Transfer::from_request(&request).id,
            Transfer::from_request(&request).id
        );
    }
}
