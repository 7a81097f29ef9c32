use std::io::{self, Write};

use csv2qif_core::{Account, Transaction};

/// Emits the QIF dialect consumed by desktop finance applications: one
/// `!Account` block, a `!Type:` line, then one `^`-terminated record per
/// transaction.
///
/// Field values are written verbatim. The dialect has no escaping for the
/// `^` separator or embedded newlines; output stays byte-compatible with
/// the bank's own converter rather than hardening the format.
pub struct QifWriter<W: Write> {
    out: W,
}

impl<W: Write> QifWriter<W> {
    pub fn new(out: W) -> Self {
        Self { out }
    }

    pub fn write_account(&mut self, account: &Account) -> io::Result<()> {
        writeln!(self.out, "!Account")?;
        writeln!(self.out, "N{}", account.name)?;
        writeln!(self.out, "T{}", account.account_type)?;
        writeln!(self.out, "^")?;
        writeln!(self.out, "!Type:{}", account.account_type)
    }

    pub fn write_transaction(&mut self, tx: &Transaction) -> io::Result<()> {
        writeln!(self.out, "D{}", tx.date.format("%d-%m-%y"))?;
        writeln!(self.out, "T{}", tx.amount)?;
        writeln!(self.out, "L{}", tx.category)?;
        writeln!(self.out, "M{}", tx.description)?;
        if let Some(payee) = &tx.payee {
            writeln!(self.out, "P{}", payee.to_uppercase())?;
        }
        writeln!(self.out, "^")
    }

    pub fn into_inner(self) -> W {
        self.out
    }
}
