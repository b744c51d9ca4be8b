pub mod decision;
pub mod transaction;

pub use transaction::{Transaction, TransactionStatus, Transfer};
