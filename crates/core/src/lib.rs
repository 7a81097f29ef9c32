pub mod account;
pub mod period;
pub mod transaction;

pub use account::{Account, AccountKind, QifAccountType};
pub use period::month_start;
pub use transaction::Transaction;
