//! Filtered queries over the transaction ledger.
//!
//! This module provides a joined transaction view for listings and reports,
//! containing the member and account columns a row is displayed with.

use rusqlite::{Connection, params_from_iter};
use time::Date;

use crate::{
    Error,
    database_id::TransactionId,
    ledger::{AccountType, Direction},
};

/// A transaction row joined with its member and account.
///
/// This is separate from the main [Transaction](crate::transaction::Transaction)
/// domain model because listings and reports show who moved the money and
/// through which account, not just the raw ledger row.
#[derive(Debug, Clone, PartialEq)]
pub struct TransactionDetail {
    /// The ID of the underlying transaction row.
    pub id: TransactionId,
    /// The date the money moved.
    pub date: Date,
    /// The full name of the member the entry is for.
    pub member_name: String,
    /// The membership number of the member the entry is for.
    pub member_no: String,
    /// The account number the entry was posted to.
    pub account_no: String,
    /// The kind of account the entry was posted to.
    pub account_type: AccountType,
    /// The amount of money that moved.
    pub amount: f64,
    /// Whether the money moved in or out.
    pub direction: Direction,
    /// Free-text description of what the entry is for.
    pub narration: Option<String>,
    /// The receipt reference of the entry.
    pub reference_no: String,
    /// The account balance immediately after the entry.
    pub balance_after: f64,
}

/// Criteria for narrowing a transaction listing.
///
/// An empty filter matches every transaction.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TransactionFilter {
    /// Case-insensitive text to match against narration, receipt reference,
    /// member name or membership number.
    pub search: Option<String>,
    /// Only include entries posted to this kind of account.
    pub account_type: Option<AccountType>,
    /// Only include entries moving money in this direction.
    pub direction: Option<Direction>,
    /// Only include entries dated on or after this date.
    pub date_from: Option<Date>,
    /// Only include entries dated on or before this date.
    pub date_to: Option<Date>,
    /// Only include entries of at least this amount.
    pub min_amount: Option<f64>,
    /// Only include entries of at most this amount.
    pub max_amount: Option<f64>,
    /// Cap the number of rows returned.
    pub limit: Option<u32>,
}

impl TransactionFilter {
    /// Create a filter that matches every transaction.
    pub fn new() -> Self {
        Self::default()
    }

    /// Match entries whose narration, receipt reference, member name or
    /// membership number contains `search` (case-insensitive).
    pub fn search(mut self, search: &str) -> Self {
        self.search = Some(search.to_owned());
        self
    }

    /// Only include entries posted to accounts of `account_type`.
    pub fn account_type(mut self, account_type: AccountType) -> Self {
        self.account_type = Some(account_type);
        self
    }

    /// Only include entries moving money in `direction`.
    pub fn direction(mut self, direction: Direction) -> Self {
        self.direction = Some(direction);
        self
    }

    /// Only include entries dated within `date_from..=date_to`.
    pub fn date_range(mut self, date_from: Date, date_to: Date) -> Self {
        self.date_from = Some(date_from);
        self.date_to = Some(date_to);
        self
    }

    /// Only include entries whose amount falls within `min..=max`.
    pub fn amount_range(mut self, min: f64, max: f64) -> Self {
        self.min_amount = Some(min);
        self.max_amount = Some(max);
        self
    }

    /// Return at most `limit` rows.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }
}

/// Get the transactions matching `filter`, newest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_transactions(
    filter: &TransactionFilter,
    connection: &Connection,
) -> Result<Vec<TransactionDetail>, Error> {
    let mut query = "SELECT
            t.id,
            t.date,
            m.first_name || ' ' || m.last_name AS member_name,
            m.member_no,
            a.account_no,
            a.account_type,
            t.amount,
            t.direction,
            t.narration,
            t.reference_no,
            t.balance_after
        FROM txn t
        INNER JOIN member m ON m.id = t.member_id
        INNER JOIN account a ON a.id = t.account_id"
        .to_owned();

    let mut clauses = Vec::new();
    let mut params: Vec<String> = Vec::new();

    if let Some(search) = filter.search.as_ref().filter(|s| !s.trim().is_empty()) {
        clauses.push(
            "(LOWER(COALESCE(t.narration, '')) LIKE ?
              OR LOWER(t.reference_no) LIKE ?
              OR LOWER(m.first_name || ' ' || m.last_name) LIKE ?
              OR LOWER(m.member_no) LIKE ?)"
                .to_owned(),
        );
        let pattern = format!("%{}%", search.trim().to_lowercase());
        params.extend([pattern.clone(), pattern.clone(), pattern.clone(), pattern]);
    }

    if let Some(account_type) = filter.account_type {
        clauses.push("a.account_type = ?".to_owned());
        params.push(account_type.as_str().to_owned());
    }

    if let Some(direction) = filter.direction {
        clauses.push("t.direction = ?".to_owned());
        params.push(direction.as_str().to_owned());
    }

    if let Some(date_from) = filter.date_from {
        clauses.push("t.date >= ?".to_owned());
        params.push(date_from.to_string());
    }

    if let Some(date_to) = filter.date_to {
        clauses.push("t.date <= ?".to_owned());
        params.push(date_to.to_string());
    }

    if let Some(min_amount) = filter.min_amount {
        clauses.push("t.amount >= ?".to_owned());
        params.push(min_amount.to_string());
    }

    if let Some(max_amount) = filter.max_amount {
        clauses.push("t.amount <= ?".to_owned());
        params.push(max_amount.to_string());
    }

    if !clauses.is_empty() {
        query.push_str(" WHERE ");
        query.push_str(&clauses.join(" AND "));
    }

    // Sort by date, and then ID to keep the order stable for same-day entries
    query.push_str(" ORDER BY t.date DESC, t.id DESC");

    if let Some(limit) = filter.limit {
        query.push_str(&format!(" LIMIT {limit}"));
    }

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), |row| {
            Ok(TransactionDetail {
                id: row.get(0)?,
                date: row.get(1)?,
                member_name: row.get(2)?,
                member_no: row.get(3)?,
                account_no: row.get(4)?,
                account_type: row.get(5)?,
                amount: row.get(6)?,
                direction: row.get(7)?,
                narration: row.get(8)?,
                reference_no: row.get(9)?,
                balance_after: row.get(10)?,
            })
        })?
        .collect::<Result<Vec<TransactionDetail>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Gross money moved in and out across a set of transaction rows.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct TransactionTotals {
    /// The sum of all credit amounts.
    pub credits: f64,
    /// The sum of all debit amounts.
    pub debits: f64,
}

/// Sum the credit and debit amounts of `transactions`.
pub fn transaction_totals(transactions: &[TransactionDetail]) -> TransactionTotals {
    transactions
        .iter()
        .fold(TransactionTotals::default(), |mut totals, transaction| {
            match transaction.direction {
                Direction::Credit => totals.credits += transaction.amount,
                Direction::Debit => totals.debits += transaction.amount,
            }
            totals
        })
}
