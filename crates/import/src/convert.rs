use std::io::{Read, Write};

use chrono::NaiveDate;
use thiserror::Error;

use csv2qif_core::{AccountKind, Transaction};

use crate::qif::QifWriter;
use crate::rules::CategoryRuleEngine;
use crate::statement::{StatementError, StatementParser};

#[derive(Error, Debug)]
pub enum ConvertError {
    #[error(transparent)]
    Statement(#[from] StatementError),
    #[error("failed to write output: {0}")]
    Io(#[from] std::io::Error),
}

/// One conversion run: parse the export, categorize each row, emit QIF.
///
/// Owns nothing shared: the rule engine snapshot and both streams belong
/// to the call, and the input is read exactly once, start to finish.
pub struct Converter {
    kind: AccountKind,
    start_date: NaiveDate,
    today: NaiveDate,
    rules: CategoryRuleEngine,
}

impl Converter {
    pub fn new(kind: AccountKind, start_date: NaiveDate, rules: CategoryRuleEngine) -> Self {
        Self {
            kind,
            start_date,
            today: chrono::Local::now().date_naive(),
            rules,
        }
    }

    /// Pins the date used for unparseable-date fallback. Tests use this;
    /// the default is the wall-clock date at construction.
    pub fn with_today(mut self, today: NaiveDate) -> Self {
        self.today = today;
        self
    }

    /// Runs the pipeline, returning the converted transactions in input
    /// order (the same records written to `output`).
    pub fn convert<R: Read, W: Write>(
        &self,
        input: R,
        output: W,
    ) -> Result<Vec<Transaction>, ConvertError> {
        let statement =
            StatementParser::new(self.kind, self.start_date, self.today).parse(input)?;

        let mut writer = QifWriter::new(output);
        writer.write_account(&statement.account)?;

        let mut transactions = Vec::with_capacity(statement.entries.len());
        for entry in statement.entries {
            let categorized = self.rules.categorize(&entry.description);
            let tx = Transaction {
                date: entry.date,
                amount: entry.amount,
                description: entry.description,
                category: categorized.category,
                payee: categorized.payee,
            };
            writer.write_transaction(&tx)?;
            transactions.push(tx);
        }

        tracing::info!("{} transactions converted", transactions.len());
        Ok(transactions)
    }
}
