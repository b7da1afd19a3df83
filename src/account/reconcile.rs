//! Checking cached account balances against the ledger.
//!
//! Every posting updates the account's cached balance in the same SQL
//! transaction as the ledger row, so the two should never disagree. This
//! module recomputes balances from the ledger so an audit can prove it.

use rusqlite::Connection;

use crate::{
    Error,
    account::core::{Account, get_accounts},
    database_id::AccountId,
    ledger::{AccountType, Posting, account_balance},
    transaction::get_account_transactions,
};

/// How far a cached balance may drift from the replayed ledger before it is
/// reported. Covers float rounding, not real discrepancies.
const BALANCE_TOLERANCE: f64 = 0.005;

/// A cached account balance that disagrees with the ledger.
#[derive(Debug, Clone, PartialEq)]
pub struct BalanceMismatch {
    /// The ID of the account.
    pub account_id: AccountId,
    /// The account number, e.g. "SAV-001".
    pub account_no: String,
    /// The kind of account.
    pub account_type: AccountType,
    /// The balance stored on the account row.
    pub cached: f64,
    /// The balance recomputed by replaying the account's ledger.
    pub derived: f64,
}

/// Recompute an account's balance by replaying its ledger from the start.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn derived_balance(account: &Account, connection: &Connection) -> Result<f64, Error> {
    let postings = get_account_transactions(account.id, connection)?
        .into_iter()
        .map(|transaction| Posting::new(transaction.amount, transaction.direction))
        .collect::<Vec<_>>();

    Ok(account_balance(account.account_type, &postings))
}

/// Find every account whose cached balance disagrees with its ledger.
///
/// A healthy database returns an empty list.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn find_balance_mismatches(connection: &Connection) -> Result<Vec<BalanceMismatch>, Error> {
    let mut mismatches = Vec::new();

    for account in get_accounts(connection)? {
        let derived = derived_balance(&account, connection)?;

        if (account.balance - derived).abs() > BALANCE_TOLERANCE {
            mismatches.push(BalanceMismatch {
                account_id: account.id,
                account_no: account.account_no,
                account_type: account.account_type,
                cached: account.balance,
                derived,
            });
        }
    }

    Ok(mismatches)
}

#[cfg(test)]
mod derived_balance_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::derived_balance;
    use crate::{
        account::find_active_account,
        initialize_db,
        ledger::{AccountType, Direction},
        member::{Member, create_member},
        transaction::{LedgerEntry, post_transaction},
    };

    #[test]
    fn replaying_the_ledger_matches_the_cached_balance() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        let member = create_member(
            Member::build("Sarah", "Nakamya", "0700111222"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();
        let today = date!(2024 - 06 - 30);
        for (account_type, amount, direction) in [
            (AccountType::Savings, 500_000.0, Direction::Credit),
            (AccountType::Savings, 150_000.0, Direction::Debit),
            (AccountType::Loan, 1_000_000.0, Direction::Debit),
            (AccountType::Loan, 250_000.0, Direction::Credit),
        ] {
            post_transaction(
                LedgerEntry::new(member.id, account_type, amount, direction, today),
                today,
                &conn,
            )
            .unwrap();
        }

        let savings = find_active_account(member.id, AccountType::Savings, &conn).unwrap();
        let loan = find_active_account(member.id, AccountType::Loan, &conn).unwrap();

        assert_eq!(350_000.0, derived_balance(&savings, &conn).unwrap());
        assert_eq!(savings.balance, derived_balance(&savings, &conn).unwrap());
        assert_eq!(750_000.0, derived_balance(&loan, &conn).unwrap());
        assert_eq!(loan.balance, derived_balance(&loan, &conn).unwrap());
    }
}
