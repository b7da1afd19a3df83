//! Defines the core data model and database queries for ledger accounts.

use rusqlite::{Connection, Row};
use time::Date;

use crate::{
    Error,
    database_id::{AccountId, MemberId},
    ledger::AccountType,
};

/// One strand of a member's money, e.g. their savings or an outstanding loan.
///
/// Accounts are opened lazily by the posting path via
/// [get_or_create_active_account]; at most one active account exists per
/// member and account type.
#[derive(Debug, Clone, PartialEq)]
pub struct Account {
    /// The ID of the account.
    pub id: AccountId,
    /// The ID of the member who owns the account.
    pub member_id: MemberId,
    /// The human-readable account number, prefixed by type, e.g. `SAV-003`.
    pub account_no: String,
    /// The kind of account.
    pub account_type: AccountType,
    /// The balance maintained by the posting path.
    ///
    /// This is a cache; [derived_balance](crate::account::derived_balance)
    /// recomputes the same figure from the transaction history.
    pub balance: f64,
    /// Whether the account is open for posting.
    pub is_active: bool,
    /// The date the account was opened.
    pub opened_date: Date,
    /// The date the account was closed, if it has been.
    pub closed_date: Option<Date>,
}

pub(crate) fn create_account_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS account (
            id INTEGER PRIMARY KEY,
            member_id INTEGER NOT NULL,
            account_no TEXT UNIQUE NOT NULL,
            account_type TEXT NOT NULL,
            balance REAL NOT NULL,
            is_active INTEGER NOT NULL,
            opened_date TEXT NOT NULL,
            closed_date TEXT,
            FOREIGN KEY(member_id) REFERENCES member(id) ON UPDATE CASCADE ON DELETE CASCADE
        )",
        (),
    )?;

    // Covers the lookup-or-create path used on every posting.
    connection.execute(
        "CREATE INDEX IF NOT EXISTS idx_account_member_type ON account(member_id, account_type)",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_account_row(row: &Row) -> Result<Account, rusqlite::Error> {
    let id = row.get(0)?;
    let member_id = row.get(1)?;
    let account_no = row.get(2)?;
    let account_type = row.get(3)?;
    let balance = row.get(4)?;
    let is_active = row.get(5)?;
    let opened_date = row.get(6)?;
    let closed_date = row.get(7)?;

    Ok(Account {
        id,
        member_id,
        account_no,
        account_type,
        balance,
        is_active,
        opened_date,
        closed_date,
    })
}

/// Retrieve the member's active account of the given type.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the member has no active account of that type,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn find_active_account(
    member_id: MemberId,
    account_type: AccountType,
    connection: &Connection,
) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "SELECT id, member_id, account_no, account_type, balance, is_active, opened_date, closed_date
             FROM account
             WHERE member_id = ?1 AND account_type = ?2 AND is_active = 1",
        )?
        .query_one((member_id, account_type), map_account_row)?;

    Ok(account)
}

/// Retrieve the member's active account of the given type, opening a fresh
/// one with a zero balance if none exists.
///
/// This lookup-or-create is the only way accounts come into existence, which
/// is what keeps the one-active-account-per-member-and-type invariant.
///
/// # Errors
/// This function will return a:
/// - [Error::DuplicateAccountNo] if another writer took the next account
///   number first,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_or_create_active_account(
    member_id: MemberId,
    account_type: AccountType,
    today: Date,
    connection: &Connection,
) -> Result<Account, Error> {
    match find_active_account(member_id, account_type, connection) {
        Ok(account) => Ok(account),
        Err(Error::NotFound) => open_account(member_id, account_type, today, connection),
        Err(error) => Err(error),
    }
}

fn open_account(
    member_id: MemberId,
    account_type: AccountType,
    today: Date,
    connection: &Connection,
) -> Result<Account, Error> {
    let account_no = next_account_no(account_type, connection)?;

    let account = connection
        .prepare(
            "INSERT INTO account
                (member_id, account_no, account_type, balance, is_active, opened_date, closed_date)
             VALUES (?1, ?2, ?3, 0, 1, ?4, NULL)
             RETURNING id, member_id, account_no, account_type, balance, is_active, opened_date, closed_date",
        )?
        .query_row((member_id, &account_no, account_type, today), map_account_row)
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateAccountNo(account_no.clone()),
            error => error.into(),
        })?;

    Ok(account)
}

/// The account number the next account of this type will receive.
///
/// Numbers count per account type, so the first savings account is `SAV-001`
/// no matter how many share accounts exist. Counting rows is safe because
/// accounts are closed, never deleted.
fn next_account_no(account_type: AccountType, connection: &Connection) -> Result<String, Error> {
    let next: i64 = connection.query_row(
        "SELECT COUNT(*) + 1 FROM account WHERE account_type = :account_type",
        &[(":account_type", &account_type)],
        |row| row.get(0),
    )?;

    Ok(format!("{}-{next:03}", account_type.account_no_prefix()))
}

/// Retrieve an account from the database by its `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an account,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_account(id: AccountId, connection: &Connection) -> Result<Account, Error> {
    let account = connection
        .prepare(
            "SELECT id, member_id, account_no, account_type, balance, is_active, opened_date, closed_date
             FROM account WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_account_row)?;

    Ok(account)
}

/// Retrieve all of a member's accounts, open and closed, oldest first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_member_accounts(
    member_id: MemberId,
    connection: &Connection,
) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, member_id, account_no, account_type, balance, is_active, opened_date, closed_date
             FROM account WHERE member_id = :member_id ORDER BY opened_date, id",
        )?
        .query_map(&[(":member_id", &member_id)], map_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Retrieve every account in the ledger, ordered by account number.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_accounts(connection: &Connection) -> Result<Vec<Account>, Error> {
    connection
        .prepare(
            "SELECT id, member_id, account_no, account_type, balance, is_active, opened_date, closed_date
             FROM account ORDER BY account_no",
        )?
        .query_map([], map_account_row)?
        .map(|maybe_account| maybe_account.map_err(|error| error.into()))
        .collect()
}

/// Get the total cached balance across all active accounts of one type.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn total_balance_by_type(
    account_type: AccountType,
    connection: &Connection,
) -> Result<f64, Error> {
    let mut stmt = connection.prepare(
        "SELECT COALESCE(SUM(balance), 0) FROM account
         WHERE account_type = :account_type AND is_active = 1",
    )?;

    let total: f64 = stmt.query_row(&[(":account_type", &account_type)], |row| row.get(0))?;

    Ok(total)
}

/// Close an account, keeping its history.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to an account that is still
///   active,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn close_account(
    id: AccountId,
    closed_date: Date,
    connection: &Connection,
) -> Result<(), Error> {
    let rows_updated = connection.execute(
        "UPDATE account SET is_active = 0, closed_date = ?1 WHERE id = ?2 AND is_active = 1",
        (closed_date, id),
    )?;

    if rows_updated == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}



#[cfg(test)]
mod total_balance_by_type_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::{close_account, get_or_create_active_account, total_balance_by_type};
    use crate::{
        initialize_db,
        ledger::AccountType,
        member::{Member, create_member},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        conn
    }

    #[test]
    fn returns_zero_for_no_accounts() {
        let conn = get_test_connection();

        let got = total_balance_by_type(AccountType::Savings, &conn).unwrap();

        assert_eq!(0.0, got);
    }

    #[test]
    fn sums_only_active_accounts_of_the_requested_type() {
        let conn = get_test_connection();
        let today = date!(2024 - 05 - 02);
        let member = create_member(
            Member::build("Grace", "Auma", "0700555666"),
            today,
            &conn,
        )
        .unwrap();

        let savings =
            get_or_create_active_account(member.id, AccountType::Savings, today, &conn).unwrap();
        let shares =
            get_or_create_active_account(member.id, AccountType::Shares, today, &conn).unwrap();
        conn.execute(
            "UPDATE account SET balance = 150000 WHERE id = ?1",
            (savings.id,),
        )
        .unwrap();
        conn.execute(
            "UPDATE account SET balance = 90000 WHERE id = ?1",
            (shares.id,),
        )
        .unwrap();

        // A closed savings account must not count towards the total.
        let closed =
            get_or_create_active_account(member.id, AccountType::Mm, today, &conn).unwrap();
        conn.execute(
            "UPDATE account SET balance = 70000, account_type = 'savings' WHERE id = ?1",
            (closed.id,),
        )
        .unwrap();
        close_account(closed.id, today, &conn).unwrap();

        let got = total_balance_by_type(AccountType::Savings, &conn).unwrap();

        assert_eq!(150000.0, got);
    }
}

#[cfg(test)]
mod close_account_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::{close_account, get_account, get_or_create_active_account};
    use crate::{
        Error, initialize_db,
        ledger::AccountType,
        member::{Member, create_member},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        conn
    }

    #[test]
    fn close_marks_the_account_inactive() {
        let conn = get_test_connection();
        let today = date!(2024 - 05 - 02);
        let member = create_member(Member::build("Mary", "Nalwanga", "0700999000"), today, &conn)
            .unwrap();
        let account =
            get_or_create_active_account(member.id, AccountType::Savings, today, &conn).unwrap();

        let closed_on = date!(2024 - 08 - 31);
        close_account(account.id, closed_on, &conn).unwrap();

        let got = get_account(account.id, &conn).unwrap();
        assert!(!got.is_active);
        assert_eq!(Some(closed_on), got.closed_date);
    }

    #[test]
    fn closing_twice_fails_with_not_found() {
        let conn = get_test_connection();
        let today = date!(2024 - 05 - 02);
        let member = create_member(Member::build("Mary", "Nalwanga", "0700999000"), today, &conn)
            .unwrap();
        let account =
            get_or_create_active_account(member.id, AccountType::Savings, today, &conn).unwrap();

        close_account(account.id, today, &conn).unwrap();
        let got = close_account(account.id, today, &conn);

        assert_eq!(Err(Error::NotFound), got);
    }
}
