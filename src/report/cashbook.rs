//! The daily cashbook.

use rusqlite::Connection;
use time::Date;

use crate::{Error, ledger::Direction};

/// One day's money movement.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CashbookRow {
    /// The day the money moved.
    pub date: Date,
    /// Money received (credits).
    pub receipts: f64,
    /// Money paid out (debits).
    pub payments: f64,
    /// Receipts less payments.
    pub net: f64,
}

/// Total the receipts and payments for each day in `date_from..=date_to`.
///
/// Days with no movement are omitted.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn cashbook(
    date_from: Date,
    date_to: Date,
    connection: &Connection,
) -> Result<Vec<CashbookRow>, Error> {
    let query = format!(
        "SELECT
            date,
            COALESCE(SUM(CASE WHEN direction = '{credit}' THEN amount END), 0),
            COALESCE(SUM(CASE WHEN direction = '{debit}' THEN amount END), 0)
        FROM txn
        WHERE date BETWEEN :date_from AND :date_to
        GROUP BY date
        ORDER BY date",
        credit = Direction::Credit.as_str(),
        debit = Direction::Debit.as_str(),
    );

    connection
        .prepare(&query)?
        .query_map(&[(":date_from", &date_from), (":date_to", &date_to)], |row| {
            let receipts: f64 = row.get(1)?;
            let payments: f64 = row.get(2)?;

            Ok(CashbookRow {
                date: row.get(0)?,
                receipts,
                payments,
                net: receipts - payments,
            })
        })?
        .collect::<Result<Vec<CashbookRow>, rusqlite::Error>>()
        .map_err(|error| error.into())
}
