use std::io::Read;

use chrono::NaiveDate;
use csv::StringRecord;
use thiserror::Error;

use csv2qif_core::{Account, AccountKind, QifAccountType};

#[derive(Error, Debug)]
pub enum StatementError {
    #[error("malformed header: {0}")]
    MalformedHeader(String),
    #[error("missing required column: {0}")]
    MissingField(String),
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// A parsed export: the account from the header block plus the normalized
/// data rows, in input order.
#[derive(Debug, Clone)]
pub struct Statement {
    pub account: Account,
    pub entries: Vec<LedgerEntry>,
}

/// One normalized data row, not yet categorized.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LedgerEntry {
    pub date: NaiveDate,
    pub amount: String,
    pub description: String,
}

/// Result of parsing a row's date field.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RowDate {
    Parsed(NaiveDate),
    /// The field held something other than a `dd.mm.yyyy` date; the
    /// converter substitutes the processing date. Source-compatible
    /// quirk: a garbage date silently becomes "today".
    Fallback(NaiveDate),
}

/// Parses `field` as `dd.mm.yyyy`, falling back to `today` on failure.
/// The fallback is deliberately a tagged variant, not an error: only
/// parsed dates are subject to the start-date filter.
pub fn parse_date_or_today(field: &str, today: NaiveDate) -> RowDate {
    match NaiveDate::parse_from_str(field, "%d.%m.%Y") {
        Ok(date) => RowDate::Parsed(date),
        Err(_) => RowDate::Fallback(today),
    }
}

/// Trailer and summary rows, recognized by their date-field value. The
/// bare `Totale` is matched case-sensitively, as the source dialect does.
fn is_trailer(date_field: &str) -> bool {
    let lower = date_field.to_lowercase();
    lower == "totale della colonna" || lower == "registrazione provv." || date_field == "Totale"
}

/// Resolved column indices for one export variant, built once from the
/// column-header row.
struct Columns {
    date: usize,
    debit: usize,
    credit: usize,
    description: usize,
}

impl Columns {
    fn resolve(header: &StringRecord, kind: AccountKind) -> Result<Self, StatementError> {
        let find = |name: &str| header.iter().position(|field| field == name);
        let require = |name: &'static str| {
            find(name).ok_or_else(|| StatementError::MissingField(name.to_string()))
        };

        let [primary, fallback] = kind.description_fields();
        let description = find(primary).or_else(|| find(fallback)).ok_or_else(|| {
            StatementError::MissingField(format!("{primary}/{fallback}"))
        })?;

        Ok(Columns {
            date: require(kind.date_field())?,
            debit: require(kind.debit_field())?,
            credit: require(kind.credit_field())?,
            description,
        })
    }
}

/// Single-pass reader for one export file.
///
/// Consumes the preamble rows up to the variant's stop row, lifting the
/// account from the designated row, then treats the next row as the
/// column header and normalizes every data row after it.
pub struct StatementParser {
    kind: AccountKind,
    start_date: NaiveDate,
    today: NaiveDate,
}

impl StatementParser {
    pub fn new(kind: AccountKind, start_date: NaiveDate, today: NaiveDate) -> Self {
        Self {
            kind,
            start_date,
            today,
        }
    }

    pub fn parse<R: Read>(&self, input: R) -> Result<Statement, StatementError> {
        // The source dialect: comma-delimited, double quotes, backslash
        // escapes. No implicit header row; the preamble has to be walked
        // by position first.
        let reader = csv::ReaderBuilder::new()
            .has_headers(false)
            .flexible(true)
            .delimiter(b',')
            .quote(b'"')
            .double_quote(true)
            .escape(Some(b'\\'))
            .from_reader(input);
        let mut records = reader.into_records();

        let account = self.read_account(&mut records)?;
        tracing::info!("processing: {}", account.name);

        let header = records
            .next()
            .ok_or_else(|| StatementError::MalformedHeader("missing column header row".into()))??;
        let columns = Columns::resolve(&header, self.kind)?;

        let mut entries = Vec::new();
        // The credit-card export repeats the card identity as its first
        // data row; it is skipped without interpretation.
        let mut identity_row_pending = self.kind == AccountKind::CreditCard;

        for record in records {
            let record = record?;

            if identity_row_pending {
                identity_row_pending = false;
                continue;
            }

            let date_field = record.get(columns.date).unwrap_or_default();
            if is_trailer(date_field) {
                continue;
            }

            let date = match parse_date_or_today(date_field, self.today) {
                RowDate::Parsed(date) if date < self.start_date => continue,
                RowDate::Parsed(date) => date,
                RowDate::Fallback(date) => date,
            };

            let debit = record.get(columns.debit).unwrap_or_default();
            let amount = if !debit.is_empty() {
                format!("-{debit}")
            } else {
                record.get(columns.credit).unwrap_or_default().to_string()
            };

            let description = record
                .get(columns.description)
                .unwrap_or_default()
                .to_string();

            entries.push(LedgerEntry {
                date,
                amount,
                description,
            });
        }

        Ok(Statement { account, entries })
    }

    fn read_account<R: Read>(
        &self,
        records: &mut csv::StringRecordsIntoIter<R>,
    ) -> Result<Account, StatementError> {
        let mut account = None;

        for row_number in 1..=self.kind.header_stop() {
            let record = records.next().ok_or_else(|| {
                StatementError::MalformedHeader(format!(
                    "input ends at row {} of {}",
                    row_number - 1,
                    self.kind.header_stop()
                ))
            })??;

            if row_number == self.kind.header_row() {
                let kind_field = record.get(0).unwrap_or_default();
                let name = record.get(1).ok_or_else(|| {
                    StatementError::MalformedHeader(format!(
                        "account row {row_number} has fewer than 2 fields"
                    ))
                })?;
                account = Some(Account {
                    name: name.to_string(),
                    account_type: QifAccountType::detect(kind_field),
                });
            }
        }

        // The designated row precedes the stop row, so the loop above
        // either filled this in or already returned an error.
        account.ok_or_else(|| StatementError::MalformedHeader("account row not found".into()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const START: &str = "2026-01-01";

    fn date(s: &str) -> NaiveDate {
        NaiveDate::parse_from_str(s, "%Y-%m-%d").unwrap()
    }

    fn deposit_parser() -> StatementParser {
        StatementParser::new(AccountKind::Deposit, date(START), date("2026-08-07"))
    }

    fn cc_parser() -> StatementParser {
        StatementParser::new(AccountKind::CreditCard, date(START), date("2026-08-07"))
    }

    fn deposit_input(rows: &[&str]) -> String {
        let mut text = String::from(
            "Esportazione conti,www.credit-suisse.com\n\
             Cliente,12345\n\
             Conto privato,Conto privato CHF\n\
             Dal,01.01.2026\n\
             Al,31.12.2026\n\
             Data di registrazione,Testo,Addebito,Accredito,Valuta\n",
        );
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    fn cc_input(rows: &[&str]) -> String {
        let mut text = String::from(
            "Esportazione transazioni,www.credit-suisse.com\n\
             Cliente,12345\n\
             Periodo,07.2026\n\
             Carta di credito,AMEX Platinum\n\
             Dal,01.07.2026\n\
             Al,31.07.2026\n\
             Data di transazione,Descrizione,Addebito CHF,Accredito CHF\n\
             1234 5678 9012 3456,TITOLARE CARTA,,\n",
        );
        for row in rows {
            text.push_str(row);
            text.push('\n');
        }
        text
    }

    #[test]
    fn deposit_account_comes_from_row_3() {
        let statement = deposit_parser()
            .parse(deposit_input(&["02.06.2026,COOP Zurich,12.35,"]).as_bytes())
            .unwrap();
        assert_eq!(statement.account.name, "Conto privato CHF");
        assert_eq!(statement.account.account_type, QifAccountType::Bank);
        assert_eq!(statement.entries.len(), 1);
    }

    #[test]
    fn credit_card_account_comes_from_row_4_and_identity_row_is_skipped() {
        let statement = cc_parser()
            .parse(cc_input(&["02.07.2026,COOP PRONTO,8.50,"]).as_bytes())
            .unwrap();
        assert_eq!(statement.account.name, "AMEX Platinum");
        assert_eq!(statement.account.account_type, QifAccountType::CCard);
        // The identity row right after the column header never becomes an entry.
        assert_eq!(statement.entries.len(), 1);
        assert_eq!(statement.entries[0].description, "COOP PRONTO");
    }

    #[test]
    fn truncated_preamble_is_malformed() {
        let err = deposit_parser()
            .parse("riga 1,\nriga 2,\nConto privato,Nome\n".as_bytes())
            .unwrap_err();
        assert!(matches!(err, StatementError::MalformedHeader(_)));
    }

    #[test]
    fn single_field_account_row_is_malformed() {
        let input = "riga 1,\nriga 2,\nsolo-un-campo\nriga 4,\nriga 5,\n";
        let err = deposit_parser().parse(input.as_bytes()).unwrap_err();
        assert!(matches!(err, StatementError::MalformedHeader(_)));
    }

    #[test]
    fn trailer_rows_are_skipped_regardless_of_case() {
        let statement = deposit_parser()
            .parse(
                deposit_input(&[
                    "02.06.2026,COOP Zurich,12.35,",
                    "TOTALE DELLA COLONNA,,105.00,",
                    "Registrazione Provv.,pending,5.00,",
                    "Totale,,110.00,",
                ])
                .as_bytes(),
            )
            .unwrap();
        assert_eq!(statement.entries.len(), 1);
    }

    #[test]
    fn uppercase_totale_is_not_a_trailer() {
        // Only the exact spelling "Totale" marks a trailer; any other
        // casing falls through to date parsing and becomes a fallback row.
        let statement = deposit_parser()
            .parse(deposit_input(&["TOTALE,,110.00,"]).as_bytes())
            .unwrap();
        assert_eq!(statement.entries.len(), 1);
        assert_eq!(statement.entries[0].date, date("2026-08-07"));
    }

    #[test]
    fn rows_before_start_date_are_dropped() {
        let statement = deposit_parser()
            .parse(
                deposit_input(&[
                    "31.12.2025,too old,10.00,",
                    "01.01.2026,on the boundary,20.00,",
                ])
                .as_bytes(),
            )
            .unwrap();
        assert_eq!(statement.entries.len(), 1);
        assert_eq!(statement.entries[0].description, "on the boundary");
    }

    #[test]
    fn unparseable_date_falls_back_to_today() {
        // Compatibility quirk preserved from the source dialect: garbage
        // in the date field silently becomes the processing date. Watch
        // this if the upstream export format ever changes.
        let statement = deposit_parser()
            .parse(deposit_input(&["Valuta 02.06,COOP Zurich,12.35,"]).as_bytes())
            .unwrap();
        assert_eq!(statement.entries.len(), 1);
        assert_eq!(statement.entries[0].date, date("2026-08-07"));
    }

    #[test]
    fn fallback_dates_bypass_the_start_filter() {
        // Start date far in the future: parsed rows are dropped, but a
        // fallback row survives because only parsed dates are filtered.
        let parser = StatementParser::new(AccountKind::Deposit, date("2027-01-01"), date("2026-08-07"));
        let statement = parser
            .parse(
                deposit_input(&[
                    "02.06.2026,parsed and dropped,10.00,",
                    "not a date,kept via fallback,5.00,",
                ])
                .as_bytes(),
            )
            .unwrap();
        assert_eq!(statement.entries.len(), 1);
        assert_eq!(statement.entries[0].description, "kept via fallback");
    }

    #[test]
    fn non_empty_debit_becomes_negative_amount() {
        let statement = deposit_parser()
            .parse(deposit_input(&["02.06.2026,COOP Zurich,12.35,"]).as_bytes())
            .unwrap();
        assert_eq!(statement.entries[0].amount, "-12.35");
    }

    #[test]
    fn empty_debit_passes_credit_through_unsigned() {
        let statement = deposit_parser()
            .parse(deposit_input(&["25.06.2026,Stipendio,,6500.00"]).as_bytes())
            .unwrap();
        assert_eq!(statement.entries[0].amount, "6500.00");
    }

    #[test]
    fn description_falls_back_from_testo_to_descrizione() {
        // Credit-card fixtures use "Descrizione"; the deposit fixture
        // uses "Testo". Both resolve through the same synonym pair.
        let statement = cc_parser()
            .parse(cc_input(&["02.07.2026,MIGROS MR ZUERICH,23.10,"]).as_bytes())
            .unwrap();
        assert_eq!(statement.entries[0].description, "MIGROS MR ZUERICH");
    }

    #[test]
    fn missing_description_column_is_missing_field() {
        let input = "\
            riga 1,\n\
            riga 2,\n\
            Conto privato,Nome\n\
            riga 4,\n\
            riga 5,\n\
            Data di registrazione,Addebito,Accredito\n\
            02.06.2026,12.35,\n";
        let err = deposit_parser().parse(input.as_bytes()).unwrap_err();
        assert!(matches!(err, StatementError::MissingField(ref f) if f == "Testo/Descrizione"));
    }

    #[test]
    fn deposit_mode_on_credit_card_columns_is_missing_field() {
        // Wrong mode flag for the file: the deposit date column does not
        // exist in a credit-card export.
        let input = "\
            riga 1,\n\
            riga 2,\n\
            Conto privato,Nome\n\
            riga 4,\n\
            riga 5,\n\
            Data di transazione,Descrizione,Addebito CHF,Accredito CHF\n";
        let err = deposit_parser().parse(input.as_bytes()).unwrap_err();
        assert!(
            matches!(err, StatementError::MissingField(ref f) if f == "Data di registrazione")
        );
    }

    #[test]
    fn quoted_fields_with_commas_and_escapes() {
        let statement = deposit_parser()
            .parse(
                deposit_input(&[r#"02.06.2026,"Pagamento, estero \"EUR\"",45.00,"#]).as_bytes(),
            )
            .unwrap();
        assert_eq!(
            statement.entries[0].description,
            r#"Pagamento, estero "EUR""#
        );
    }

    #[test]
    fn entries_keep_input_order() {
        let statement = deposit_parser()
            .parse(
                deposit_input(&[
                    "02.06.2026,first,1.00,",
                    "01.06.2026,second,2.00,",
                    "03.06.2026,third,,3.00",
                ])
                .as_bytes(),
            )
            .unwrap();
        let order: Vec<&str> = statement
            .entries
            .iter()
            .map(|e| e.description.as_str())
            .collect();
        assert_eq!(order, ["first", "second", "third"]);
    }

    #[test]
    fn parse_date_or_today_tags_both_branches() {
        let today = date("2026-08-07");
        assert_eq!(
            parse_date_or_today("24.12.2025", today),
            RowDate::Parsed(date("2025-12-24"))
        );
        assert_eq!(
            parse_date_or_today("24-12-2025", today),
            RowDate::Fallback(today)
        );
        assert_eq!(parse_date_or_today("", today), RowDate::Fallback(today));
    }
}
