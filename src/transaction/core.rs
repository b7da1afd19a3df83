//! Defines the core data model and database queries for ledger transactions.

use rusqlite::{Connection, Row};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    database_id::{AccountId, MemberId, TransactionId},
    ledger::Direction,
};

/// An immutable ledger entry.
///
/// Transactions are append-only: the ledger has no update or delete path, so
/// every balance can be re-derived from history at any time. New entries are
/// created with [post_transaction](crate::transaction::post_transaction).
#[derive(Debug, Clone, PartialEq)]
pub struct Transaction {
    /// The ID of the transaction.
    pub id: TransactionId,
    /// The ID of the account the entry was posted against.
    pub account_id: AccountId,
    /// The ID of the member the entry is attributed to, always the owner of
    /// the account.
    pub member_id: MemberId,
    /// The date the money moved.
    pub date: Date,
    /// The amount of money that moved. Always positive.
    pub amount: f64,
    /// Whether the money moved in or out.
    pub direction: Direction,
    /// Free-text description of what the entry was for.
    pub narration: Option<String>,
    /// The unique receipt reference, e.g. `TXN-1716210000000-0001`.
    pub reference_no: String,
    /// The account balance immediately after this entry was applied.
    pub balance_after: f64,
    /// When the entry was recorded, as opposed to `date`, when the money
    /// moved.
    pub created_at: OffsetDateTime,
}

pub(crate) fn create_transaction_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    // "txn" rather than "transaction" so the table name never needs quoting.
    connection.execute(
        "CREATE TABLE IF NOT EXISTS txn (
                id INTEGER PRIMARY KEY AUTOINCREMENT,
                account_id INTEGER NOT NULL,
                member_id INTEGER NOT NULL,
                date TEXT NOT NULL,
                amount REAL NOT NULL,
                direction TEXT NOT NULL,
                narration TEXT,
                reference_no TEXT UNIQUE NOT NULL,
                balance_after REAL NOT NULL,
                created_at TEXT NOT NULL,
                FOREIGN KEY(account_id) REFERENCES account(id) ON UPDATE CASCADE ON DELETE CASCADE,
                FOREIGN KEY(member_id) REFERENCES member(id) ON UPDATE CASCADE ON DELETE CASCADE
                )",
        (),
    )?;

    // Ensure the sequence starts at 1
    connection.execute(
        "INSERT OR IGNORE INTO sqlite_sequence (name, seq) VALUES ('txn', 0)",
        (),
    )?;

    // Statement replay and the date-windowed dashboard queries.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_txn_account_date ON txn(account_id, date);",
        (),
    )?;
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_txn_date ON txn(date);",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_transaction_row(row: &Row) -> Result<Transaction, rusqlite::Error> {
    let id = row.get(0)?;
    let account_id = row.get(1)?;
    let member_id = row.get(2)?;
    let date = row.get(3)?;
    let amount = row.get(4)?;
    let direction = row.get(5)?;
    let narration = row.get(6)?;
    let reference_no = row.get(7)?;
    let balance_after = row.get(8)?;
    let created_at = row.get(9)?;

    Ok(Transaction {
        id,
        account_id,
        member_id,
        date,
        amount,
        direction,
        narration,
        reference_no,
        balance_after,
        created_at,
    })
}

/// Retrieve a transaction from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a transaction,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_transaction(id: TransactionId, connection: &Connection) -> Result<Transaction, Error> {
    let transaction = connection
        .prepare(
            "SELECT id, account_id, member_id, date, amount, direction, narration, reference_no, balance_after, created_at
             FROM txn WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_transaction_row)?;

    Ok(transaction)
}

/// Retrieve all entries posted against an account, in the order they apply.
///
/// Ordered by date and then insertion order, which is the order the
/// `balance_after` snapshots were computed in.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_account_transactions(
    account_id: AccountId,
    connection: &Connection,
) -> Result<Vec<Transaction>, Error> {
    connection
        .prepare(
            "SELECT id, account_id, member_id, date, amount, direction, narration, reference_no, balance_after, created_at
             FROM txn WHERE account_id = :account_id ORDER BY date, id",
        )?
        .query_map(&[(":account_id", &account_id)], map_transaction_row)?
        .map(|maybe_transaction| maybe_transaction.map_err(|error| error.into()))
        .collect()
}

/// Get the total number of transactions in the database.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is some SQL error.
pub fn count_transactions(connection: &Connection) -> Result<u32, Error> {
    connection
        .query_row("SELECT COUNT(id) FROM txn;", [], |row| row.get(0))
        .map_err(|error| error.into())
}

#[cfg(test)]
mod create_table_tests {
    use rusqlite::Connection;

    use super::create_transaction_table;

    #[test]
    fn sql_is_valid() {
        let connection =
            Connection::open_in_memory().expect("Could not initialise in-memory SQLite database");

        assert_eq!(Ok(()), create_transaction_table(&connection));
    }

    #[test]
    fn ids_start_at_one() {
        let connection = Connection::open_in_memory().unwrap();
        create_transaction_table(&connection).unwrap();

        let seq: i64 = connection
            .query_row(
                "SELECT seq FROM sqlite_sequence WHERE name = 'txn'",
                [],
                |row| row.get(0),
            )
            .unwrap();

        assert_eq!(0, seq);
    }
}
