//! Account-related types for the transfer batcher
//!
//! This module defines the account identifier used on every transfer and the
//! balance view derived from the ledger's posted totals.

use super::error::PaymentError;
use std::fmt;
use std::str::FromStr;

/// Opaque 128-bit account identifier
///
/// Equality is by value. The textual form is hexadecimal: up to 32 digits,
/// optionally prefixed with `0x`. `Display` always renders the full
/// 32-digit, zero-padded, lowercase form.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AccountId(u128);

impl AccountId {
    /// Wrap a raw 128-bit value
    pub const fn new(raw: u128) -> Self {
        AccountId(raw)
    }

    /// Generate a fresh random identifier (UUID v4 bits)
    pub fn random() -> Self {
        AccountId(uuid::Uuid::new_v4().as_u128())
    }

    /// Parse an identifier from its hex text form
    ///
    /// # Errors
    ///
    /// Returns `PaymentError::InvalidAccountId` if the input is empty, longer
    /// than 32 hex digits, or contains a non-hex character.
    pub fn from_hex(text: &str) -> Result<Self, PaymentError> {
        let trimmed = text.trim();
        let digits = trimmed
            .strip_prefix("0x")
            .or_else(|| trimmed.strip_prefix("0X"))
            .unwrap_or(trimmed);

        if digits.is_empty() || digits.len() > 32 {
            return Err(PaymentError::invalid_account_id(text));
        }

        u128::from_str_radix(digits, 16)
            .map(AccountId)
            .map_err(|_| PaymentError::invalid_account_id(text))
    }

    /// The raw 128-bit value
    pub const fn as_u128(&self) -> u128 {
        self.0
    }

    /// Whether this is the reserved zero identifier
    pub const fn is_zero(&self) -> bool {
        self.0 == 0
    }
}

impl fmt::Display for AccountId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:032x}", self.0)
    }
}

impl FromStr for AccountId {
    type Err = PaymentError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        AccountId::from_hex(s)
    }
}

/// Balance view of a ledger account
///
/// Only posted amounts are tracked; the ledger has no pending transfers here.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AccountBalance {
    /// The account this balance belongs to
    pub id: AccountId,

    /// Sum of all posted debits (money that left the account)
    pub debits_posted: u64,

    /// Sum of all posted credits (money that entered the account)
    pub credits_posted: u64,
}

impl AccountBalance {
    /// Net balance: credits minus debits
    ///
    /// Signed because the bank account, which funds customer accounts, is
    /// permitted to run a debit balance.
    pub fn net(&self) -> i128 {
        i128::from(self.credits_posted) - i128::from(self.debits_posted)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::short("1", 1)]
    #[case::prefixed("0x1f", 0x1f)]
    #[case::upper_prefix("0XFF", 0xff)]
    #[case::mixed_case("AbCd", 0xabcd)]
    #[case::padded_whitespace("  2a  ", 0x2a)]
    #[case::full_width("ffffffffffffffffffffffffffffff00", 0xffffffffffffffffffffffffffffff00)]
    fn test_from_hex_valid(#[case] input: &str, #[case] expected: u128) {
        assert_eq!(AccountId::from_hex(input).unwrap().as_u128(), expected);
    }

    #[rstest]
    #[case::empty("")]
    #[case::prefix_only("0x")]
    #[case::not_hex("xyz")]
    #[case::too_long("1ffffffffffffffffffffffffffffffff")]
    #[case::negative("-1")]
    fn test_from_hex_invalid(#[case] input: &str) {
        let result = AccountId::from_hex(input);
        assert!(matches!(result, Err(PaymentError::InvalidAccountId { .. })));
    }

    #[test]
    fn test_display_is_zero_padded_lowercase() {
        let id = AccountId::new(0xAB);
        assert_eq!(id.to_string(), "000000000000000000000000000000ab");
        assert_eq!(AccountId::from_hex(&id.to_string()).unwrap(), id);
    }

    #[test]
    fn test_random_ids_differ() {
        assert_ne!(AccountId::random(), AccountId::random());
    }

    #[test]
    fn test_balance_net_can_go_negative() {
        let balance = AccountBalance {
            id: AccountId::new(1),
            debits_posted: 150,
            credits_posted: 100,
        };
        assert_eq!(balance.net(), -50);
    }
}
