pub mod config;
pub mod convert;
pub mod encoding;
pub mod qif;
pub mod rules;
pub mod statement;

pub use config::{load_rules, ConfigError};
pub use convert::{ConvertError, Converter};
pub use encoding::decode;
pub use qif::QifWriter;
pub use rules::{Categorization, CategoryRule, CategoryRuleEngine, RuleError, FALLBACK_CATEGORY};
pub use statement::{
    parse_date_or_today, LedgerEntry, RowDate, Statement, StatementError, StatementParser,
};
