//! Transaction models: raw form input and the stored record.

use crate::error::{LedgerError, Result};
use crate::money::Money;
use crate::record::RecordId;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Direction of a transaction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum TxType {
    /// Money coming in; adds to the balance.
    Income,

    /// Money going out; subtracts from the balance.
    Expense,
}

impl TxType {
    pub fn as_str(&self) -> &'static str {
        match self {
            TxType::Income => "income",
            TxType::Expense => "expense",
        }
    }
}

impl FromStr for TxType {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_lowercase().as_str() {
            "income" => Ok(TxType::Income),
            "expense" => Ok(TxType::Expense),
            other => Err(LedgerError::validation(format!(
                "unknown transaction type '{}', expected income or expense",
                other
            ))),
        }
    }
}

impl fmt::Display for TxType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A recorded income or expense entry.
///
/// # Invariants
///
/// - `amount` is strictly positive; the direction lives in `tx_type`
/// - `id` and `created_at` never change after creation
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub id: RecordId,

    #[serde(rename = "type")]
    pub tx_type: TxType,

    pub amount: Money,

    pub category: String,

    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub note: Option<String>,

    pub created_at: DateTime<Utc>,
}

impl Transaction {
    /// Amount with the sign it contributes to the balance.
    pub fn signed_amount(&self) -> Money {
        match self.tx_type {
            TxType::Income => self.amount,
            TxType::Expense => -self.amount,
        }
    }

    pub fn is_income(&self) -> bool {
        self.tx_type == TxType::Income
    }
}

/// Which transactions the history view shows.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum HistoryFilter {
    #[default]
    All,
    Only(TxType),
}

impl HistoryFilter {
    pub fn matches(&self, tx: &Transaction) -> bool {
        match self {
            HistoryFilter::All => true,
            HistoryFilter::Only(tx_type) => tx.tx_type == *tx_type,
        }
    }
}

impl FromStr for HistoryFilter {
    type Err = LedgerError;

    fn from_str(s: &str) -> Result<Self> {
        if s.trim().eq_ignore_ascii_case("all") {
            return Ok(HistoryFilter::All);
        }
        s.parse().map(HistoryFilter::Only)
    }
}

/// Raw transaction input as collected by a form.
///
/// Every field is the user's unparsed text; [`TransactionForm::parse`] turns
/// it into a [`NewTransaction`] or explains what is wrong.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TransactionForm {
    #[serde(rename = "type")]
    pub tx_type: String,
    pub amount: String,
    pub category: String,
    pub note: String,
}

impl TransactionForm {
    /// Validates the raw input.
    ///
    /// Fails if the type is unknown or the amount is missing, not a number,
    /// not greater than zero, or above [`Money::MAX_AMOUNT`].
    pub fn parse(&self) -> Result<NewTransaction> {
        let tx_type = self.tx_type.parse()?;
        let amount = parse_amount(&self.amount)?;

        Ok(NewTransaction {
            tx_type,
            amount,
            category: self.category.trim().to_string(),
            note: optional_text(&self.note),
        })
    }
}

/// A validated transaction that has not been assigned an id yet.
#[derive(Debug, Clone, PartialEq)]
pub struct NewTransaction {
    pub tx_type: TxType,
    pub amount: Money,
    pub category: String,
    pub note: Option<String>,
}

/// Parses a positive amount typed by the user.
pub(crate) fn parse_amount(raw: &str) -> Result<Money> {
    let trimmed = raw.trim();
    if trimmed.is_empty() {
        return Err(LedgerError::validation("amount is required"));
    }

    let amount = Money::from_str(trimmed)
        .map_err(|_| LedgerError::validation(format!("amount '{}' is not a number", trimmed)))?;
    ensure_valid_amount(amount)?;
    Ok(amount)
}

/// Accepts amounts in `(0, Money::MAX_AMOUNT]`.
pub(crate) fn ensure_valid_amount(amount: Money) -> Result<()> {
    if !amount.is_positive() {
        return Err(LedgerError::validation(format!(
            "amount must be greater than zero, got {}",
            amount
        )));
    }
    if amount > Money::MAX_AMOUNT {
        return Err(LedgerError::validation(format!(
            "amount must not exceed {}, got {}",
            Money::MAX_AMOUNT,
            amount
        )));
    }
    Ok(())
}

pub(crate) fn optional_text(raw: &str) -> Option<String> {
    let trimmed = raw.trim();
    (!trimmed.is_empty()).then(|| trimmed.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn form(tx_type: &str, amount: &str) -> TransactionForm {
        TransactionForm {
            tx_type: tx_type.to_string(),
            amount: amount.to_string(),
            category: "makan".to_string(),
            note: String::new(),
        }
    }

    #[test]
    fn test_parse_income() {
        let parsed = form("income", "50000").parse().unwrap();
        assert_eq!(parsed.tx_type, TxType::Income);
        assert_eq!(parsed.amount, Money::from_units(50_000));
        assert_eq!(parsed.category, "makan");
        assert_eq!(parsed.note, None);
    }

    #[test]
    fn test_parse_handles_whitespace_and_case() {
        let mut raw = form("  Expense ", "  12.5 ");
        raw.note = "  lunch  ".to_string();

        let parsed = raw.parse().unwrap();
        assert_eq!(parsed.tx_type, TxType::Expense);
        assert_eq!(parsed.amount.to_string(), "12.50");
        assert_eq!(parsed.note.as_deref(), Some("lunch"));
    }

    #[test]
    fn test_parse_rejects_unknown_type() {
        let err = form("transfer", "10").parse().unwrap_err();
        assert!(matches!(err, LedgerError::Validation(_)));
    }

    #[test]
    fn test_parse_rejects_bad_amounts() {
        for amount in [
            "",
            "   ",
            "abc",
            "0",
            "0.00",
            "-5",
            "1000000000000000.01",
            "79228162514264337593543950335",
        ] {
            let err = form("income", amount).parse().unwrap_err();
            assert!(
                matches!(err, LedgerError::Validation(_)),
                "amount {:?} should be rejected",
                amount
            );
        }
    }

    #[test]
    fn test_parse_accepts_max_amount() {
        let parsed = form("income", "1000000000000000").parse().unwrap();
        assert_eq!(parsed.amount, Money::MAX_AMOUNT);
    }

    #[test]
    fn test_signed_amount() {
        let tx = Transaction {
            id: RecordId::generate(),
            tx_type: TxType::Expense,
            amount: Money::from_units(20_000),
            category: "makan".to_string(),
            note: None,
            created_at: Utc::now(),
        };
        assert_eq!(tx.signed_amount(), Money::from_units(-20_000));
        assert!(!tx.is_income());
    }

    #[test]
    fn test_history_filter_parse() {
        assert_eq!("all".parse::<HistoryFilter>().unwrap(), HistoryFilter::All);
        assert_eq!(
            "income".parse::<HistoryFilter>().unwrap(),
            HistoryFilter::Only(TxType::Income)
        );
        assert!("debts".parse::<HistoryFilter>().is_err());
    }
}
