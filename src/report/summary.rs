//! Per-account-type summaries.

use rusqlite::Connection;

use crate::{Error, ledger::AccountType};

/// The holdings of one kind of account across the society.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountTypeSummary {
    /// The kind of account.
    pub account_type: AccountType,
    /// How many active accounts of this kind exist.
    pub accounts: u32,
    /// How many members hold at least one.
    pub members: u32,
    /// The balance across all of them.
    pub total_balance: f64,
}

/// Summarise active accounts for every account type.
///
/// Always returns six rows in [AccountType::ALL] order; types nobody holds
/// come back zeroed.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn account_type_summaries(connection: &Connection) -> Result<Vec<AccountTypeSummary>, Error> {
    let rows = connection
        .prepare(
            "SELECT account_type, COUNT(*), COUNT(DISTINCT member_id), COALESCE(SUM(balance), 0)
            FROM account
            WHERE is_active = 1
            GROUP BY account_type",
        )?
        .query_map([], |row| {
            Ok(AccountTypeSummary {
                account_type: row.get(0)?,
                accounts: row.get(1)?,
                members: row.get(2)?,
                total_balance: row.get(3)?,
            })
        })?
        .collect::<Result<Vec<AccountTypeSummary>, rusqlite::Error>>()?;

    Ok(AccountType::ALL
        .into_iter()
        .map(|account_type| {
            rows.iter()
                .find(|summary| summary.account_type == account_type)
                .copied()
                .unwrap_or(AccountTypeSummary {
                    account_type,
                    accounts: 0,
                    members: 0,
                    total_balance: 0.0,
                })
        })
        .collect())
}

#[cfg(test)]
mod account_type_summaries_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::account_type_summaries;
    use crate::{
        initialize_db,
        ledger::{AccountType, Direction},
        member::{Member, create_member},
        transaction::{LedgerEntry, post_transaction},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        conn
    }

    #[test]
    fn an_empty_society_summarises_to_six_zero_rows() {
        let conn = get_test_connection();

        let got = account_type_summaries(&conn).unwrap();

        assert_eq!(6, got.len());
        assert_eq!(
            AccountType::ALL.to_vec(),
            got.iter().map(|summary| summary.account_type).collect::<Vec<_>>()
        );
        for summary in got {
            assert_eq!(0, summary.accounts);
            assert_eq!(0, summary.members);
            assert_eq!(0.0, summary.total_balance);
        }
    }

    #[test]
    fn summaries_count_accounts_and_distinct_members() {
        let conn = get_test_connection();
        let today = date!(2024 - 06 - 30);
        let sarah = create_member(
            Member::build("Sarah", "Nakamya", "0700111222"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();
        let john = create_member(
            Member::build("John", "Okello", "0700333444"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();

        for (member_id, account_type, amount) in [
            (sarah.id, AccountType::Savings, 500_000.0),
            (john.id, AccountType::Savings, 200_000.0),
            (sarah.id, AccountType::Shares, 100_000.0),
        ] {
            post_transaction(
                LedgerEntry::new(member_id, account_type, amount, Direction::Credit, today),
                today,
                &conn,
            )
            .unwrap();
        }

        let got = account_type_summaries(&conn).unwrap();

        let savings = got
            .iter()
            .find(|summary| summary.account_type == AccountType::Savings)
            .unwrap();
        assert_eq!(2, savings.accounts);
        assert_eq!(2, savings.members);
        assert_eq!(700_000.0, savings.total_balance);

        let shares = got
            .iter()
            .find(|summary| summary.account_type == AccountType::Shares)
            .unwrap();
        assert_eq!(1, shares.accounts);
        assert_eq!(1, shares.members);
        assert_eq!(100_000.0, shares.total_balance);

        let fixed = got
            .iter()
            .find(|summary| summary.account_type == AccountType::FixedDeposit)
            .unwrap();
        assert_eq!(0, fixed.accounts);
    }
}
