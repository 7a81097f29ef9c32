use serde::{Deserialize, Serialize};
use std::fmt;

/// Structural variant of the bank export being converted.
///
/// Selected once (by the `--cc` flag), before any input is read. The two
/// variants differ in header row offsets and in the names of the date and
/// amount columns; everything mode-dependent hangs off this enum so the
/// row loop never probes for alternative field names at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum AccountKind {
    Deposit,
    CreditCard,
}

impl AccountKind {
    /// 1-based index of the header row carrying account kind and name.
    pub fn header_row(self) -> usize {
        match self {
            AccountKind::Deposit => 3,
            AccountKind::CreditCard => 4,
        }
    }

    /// 1-based index of the last preamble row; the column-header row
    /// follows immediately after it.
    pub fn header_stop(self) -> usize {
        match self {
            AccountKind::Deposit => 5,
            AccountKind::CreditCard => 6,
        }
    }

    pub fn date_field(self) -> &'static str {
        match self {
            AccountKind::Deposit => "Data di registrazione",
            AccountKind::CreditCard => "Data di transazione",
        }
    }

    pub fn debit_field(self) -> &'static str {
        match self {
            AccountKind::Deposit => "Addebito",
            AccountKind::CreditCard => "Addebito CHF",
        }
    }

    pub fn credit_field(self) -> &'static str {
        match self {
            AccountKind::Deposit => "Accredito",
            AccountKind::CreditCard => "Accredito CHF",
        }
    }

    /// Description column synonyms, tried in order. Both variants use
    /// one of the same two names.
    pub fn description_fields(self) -> [&'static str; 2] {
        ["Testo", "Descrizione"]
    }
}

/// Account type written to the QIF `!Account` block and `!Type:` line.
///
/// Detected from header content, independently of [`AccountKind`]: the
/// export declares itself a credit card in the account row, and that
/// declaration wins even if the mode flag disagrees.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum QifAccountType {
    Bank,
    CCard,
}

impl QifAccountType {
    /// Classifies the first field of the designated header row.
    pub fn detect(kind_field: &str) -> Self {
        if kind_field.to_lowercase().contains("carta di credito") {
            QifAccountType::CCard
        } else {
            QifAccountType::Bank
        }
    }
}

impl fmt::Display for QifAccountType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            QifAccountType::Bank => write!(f, "Bank"),
            QifAccountType::CCard => write!(f, "CCard"),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Account {
    pub name: String,
    pub account_type: QifAccountType,
}
