//! CSV format handling for operation records and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to `Operation`s
//! - Balance output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{AccountBalance, AccountId, PaymentError, TransferRequest};
use serde::Deserialize;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, account, counterparty, amount.
/// `counterparty` is only meaningful for transfers.
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub op_type: String,
    pub account: String,
    pub counterparty: Option<String>,
    pub amount: Option<String>,
}

/// One parsed input row
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Operation {
    /// Create `account` and fund it with `amount` from the bank
    Create { account: AccountId, amount: u64 },

    /// Submit a transfer through the batching engine
    Transfer(TransferRequest),
}

/// Convert a CsvRecord to an Operation
///
/// This function:
/// - Parses the operation type (case-insensitive)
/// - Parses account ids from hex
/// - Parses the amount as an unsigned integer
/// - Requires `counterparty` and `amount` for transfers
///
/// A `create` row without an amount creates an empty account.
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<Operation, PaymentError> {
    let op_type = csv_record.op_type.to_lowercase();
    let account_text = csv_record.account.trim();
    let counterparty = non_empty(csv_record.counterparty);
    let amount = non_empty(csv_record.amount)
        .map(|text| {
            text.parse::<u64>()
                .map_err(|_| PaymentError::invalid_amount(&text, account_text))
        })
        .transpose()?;

    match op_type.as_str() {
        "create" => Ok(Operation::Create {
            account: AccountId::from_hex(account_text)?,
            amount: amount.unwrap_or(0),
        }),
        "transfer" => {
            let dest = counterparty
                .ok_or_else(|| PaymentError::missing_field("transfer", account_text, "counterparty"))?;
            let amount =
                amount.ok_or_else(|| PaymentError::missing_field("transfer", account_text, "amount"))?;

            Ok(Operation::Transfer(TransferRequest::new(
                AccountId::from_hex(account_text)?,
                AccountId::from_hex(&dest)?,
                amount,
            )))
        }
        _ => Err(PaymentError::invalid_operation(&csv_record.op_type)),
    }
}

fn non_empty(field: Option<String>) -> Option<String> {
    field
        .map(|text| text.trim().to_string())
        .filter(|text| !text.is_empty())
}

/// Write balances to CSV format
///
/// Writes balances with columns: account, balance. Accounts are sorted by
/// id for deterministic output and rendered as 32 lowercase hex digits.
pub fn write_balances_csv(
    balances: &[AccountBalance],
    output: &mut dyn Write,
) -> Result<(), PaymentError> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer.write_record(["account", "balance"])?;

    let mut sorted = balances.to_vec();
    sorted.sort_by_key(|balance| balance.id);

    for balance in sorted {
        writer.write_record(&[balance.id.to_string(), balance.net().to_string()])?;
    }

    writer.flush()?;

    Ok(())
}
