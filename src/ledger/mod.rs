//! The pure bookkeeping arithmetic at the heart of the application.
//!
//! This module contains no database access:
//! - The `AccountType` and `Direction` domain types and the sign convention
//!   tying them together
//! - Balance folds and the write-time `balance_after` snapshot
//! - Portfolio aggregation (assets, liabilities, net worth)
//! - The weekly trend series for the dashboard chart

mod balance;
mod portfolio;
mod trend;
mod types;

pub use balance::{Posting, account_balance, balance_after, signed_amount};
pub use portfolio::{AccountBalance, PortfolioSummary, portfolio_summary};
pub use trend::{DatedPosting, TrendPoint, WeeklyTrend, monday_of};
pub use types::{AccountType, Direction};
