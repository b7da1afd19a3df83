//! Database schema initialisation.

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};

use crate::{
    Error, account::create_account_table, member::create_member_table,
    transaction::create_transaction_table,
};

/// Create the application tables if they do not exist.
///
/// The tables are created inside one exclusive transaction so that two
/// processes racing on a fresh database file cannot leave a half-created
/// schema behind.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn initialize(connection: &Connection) -> Result<(), Error> {
    let transaction = SqlTransaction::new_unchecked(connection, TransactionBehavior::Exclusive)?;

    create_member_table(&transaction)?;
    create_account_table(&transaction)?;
    create_transaction_table(&transaction)?;

    transaction.commit()?;

    Ok(())
}

#[cfg(test)]
mod initialize_tests {
    use rusqlite::Connection;

    use super::initialize;

    #[test]
    fn creates_the_schema() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("Could not initialise database");

        let table_count: i64 = conn
            .query_row(
                "SELECT COUNT(*) FROM sqlite_master
                 WHERE type = 'table' AND name IN ('member', 'account', 'txn')",
                [],
                |row| row.get(0),
            )
            .unwrap();
        assert_eq!(3, table_count);
    }

    #[test]
    fn can_be_called_twice() {
        let conn = Connection::open_in_memory().unwrap();

        initialize(&conn).expect("Could not initialise database");

        assert_eq!(Ok(()), initialize(&conn));
    }
}
