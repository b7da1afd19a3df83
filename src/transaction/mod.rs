//! The transaction ledger.
//!
//! This module contains everything related to ledger transactions:
//! - The `Transaction` model and the queries for reading it back
//! - `LedgerEntry` and `post_transaction`, the only write path
//! - Filtered listing queries joined with member and account data

mod core;
mod entry;
mod query;

pub use core::{Transaction, count_transactions, get_account_transactions, get_transaction};
pub use entry::{LedgerEntry, post_transaction};
pub use query::{
    TransactionDetail, TransactionFilter, TransactionTotals, get_transactions, transaction_totals,
};

pub(crate) use core::create_transaction_table;
