use chrono::NaiveDate;
use serde::{Deserialize, Serialize};

/// One converted ledger row, in input order.
///
/// `amount` is the bank's own decimal string, passed through verbatim with
/// the sign encoded as a leading `-` for debits; the converter does no
/// arithmetic on it. `payee` is the substring of `description` that the
/// winning category rule matched, absent when no rule matched.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Transaction {
    pub date: NaiveDate,
    pub amount: String,
    pub description: String,
    pub category: String,
    pub payee: Option<String>,
}
