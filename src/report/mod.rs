//! Reports over the ledger.
//!
//! This module contains the society's paper trail:
//! - Member statements with replayed running balances
//! - The daily cashbook
//! - Per-account-type summaries
//! - CSV export of filtered transaction listings

mod cashbook;
mod export;
mod statement;
mod summary;

pub use cashbook::{CashbookRow, cashbook};
pub use export::{transactions_to_csv, write_transactions_csv};
pub use statement::{ClosingBalance, MemberStatement, StatementLine, member_statement};
pub use summary::{AccountTypeSummary, account_type_summaries};
