//! Headline figures for the dashboard.

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error,
    account::total_balance_by_type,
    ledger::{AccountType, Direction, monday_of},
    loan::loan_summary,
    member::registry_stats,
};

/// The figures shown on the dashboard's stat cards.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DashboardStats {
    /// How many members are on the books, regardless of standing.
    pub total_members: u32,
    /// How many members are in active standing.
    pub active_members: u32,
    /// How many members joined in the current calendar month.
    pub new_members_this_month: u32,
    /// The balance across all active savings accounts.
    pub total_savings: f64,
    /// The balance across all active share accounts.
    pub total_shares: f64,
    /// The amount owed across all active loan accounts.
    pub total_loans: f64,
    /// Active deposit balances minus the outstanding loan book. Negative
    /// when lending has outpaced deposits.
    pub cash_in_bank: f64,
    /// Money collected (credits) in the current Monday-to-Sunday week.
    pub weekly_collections: f64,
    /// Percent change of this week's collections against last week's.
    /// Zero when last week collected nothing.
    pub weekly_collections_change: f64,
    /// How many active loan accounts still owe money.
    pub active_loans_count: u32,
}

/// Compute the dashboard figures as of `today`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_dashboard_stats(today: Date, connection: &Connection) -> Result<DashboardStats, Error> {
    let registry = registry_stats(today, connection)?;
    let loans = loan_summary(today, connection)?;

    let week_start = monday_of(today);
    let this_week = credit_sum_in_range(week_start, week_start + Duration::days(6), connection)?;
    let previous_week = credit_sum_in_range(
        week_start - Duration::weeks(1),
        week_start - Duration::days(1),
        connection,
    )?;

    Ok(DashboardStats {
        total_members: registry.total_members,
        active_members: registry.active_members,
        new_members_this_month: registry.new_members_this_month,
        total_savings: total_balance_by_type(AccountType::Savings, connection)?,
        total_shares: total_balance_by_type(AccountType::Shares, connection)?,
        total_loans: loans.total_outstanding,
        cash_in_bank: cash_in_bank(connection)?,
        weekly_collections: this_week,
        weekly_collections_change: percent_change(this_week, previous_week),
        active_loans_count: loans.active_loans,
    })
}

/// The society's cash position: active deposit balances minus the
/// outstanding loan book.
///
/// Deposits are every active balance except loan and money-market accounts;
/// money-market balances sit with the fund. The position goes negative when
/// lending has outpaced deposits.
pub(super) fn cash_in_bank(connection: &Connection) -> Result<f64, Error> {
    let query = format!(
        "SELECT COALESCE(SUM(balance), 0) FROM account
        WHERE is_active = 1 AND account_type NOT IN ('{loan}', '{mm}')",
        loan = AccountType::Loan.as_str(),
        mm = AccountType::Mm.as_str(),
    );

    let deposits: f64 = connection.prepare(&query)?.query_row([], |row| row.get(0))?;
    let outstanding_loans = total_balance_by_type(AccountType::Loan, connection)?;

    Ok(deposits - outstanding_loans)
}

/// Sum the credits dated within `start..=end`.
fn credit_sum_in_range(start: Date, end: Date, connection: &Connection) -> Result<f64, Error> {
    let query = format!(
        "SELECT COALESCE(SUM(amount), 0) FROM txn
        WHERE direction = '{credit}' AND date BETWEEN :start AND :end",
        credit = Direction::Credit.as_str(),
    );

    let total = connection
        .prepare(&query)?
        .query_one(&[(":start", &start), (":end", &end)], |row| row.get(0))?;

    Ok(total)
}

/// Percent change from `previous` to `current`, zero when there is no
/// previous figure to compare against.
fn percent_change(current: f64, previous: f64) -> f64 {
    if previous > 0.0 {
        ((current - previous) / previous) * 100.0
    } else {
        0.0
    }
}

#[cfg(test)]
mod get_dashboard_stats_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::{DashboardStats, get_dashboard_stats};
    use crate::{
        database_id::MemberId,
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

    fn post(
        member_id: MemberId,
        account_type: AccountType,
        amount: f64,
        direction: Direction,
        date: time::Date,
        conn: &Connection,
    ) {
        post_transaction(
            LedgerEntry::new(member_id, account_type, amount, direction, date),
            date!(2024 - 03 - 13),
            conn,
        )
        .unwrap();
    }

    #[test]
    fn an_empty_database_has_all_zero_stats() {
        let conn = get_test_connection();

        let got = get_dashboard_stats(date!(2024 - 03 - 13), &conn).unwrap();

        assert_eq!(DashboardStats::default(), got);
    }

    #[test]
    fn stats_cover_members_balances_and_weekly_collections() {
        let conn = get_test_connection();
        // Wednesday; the week runs 2024-03-11 to 2024-03-17.
        let today = date!(2024 - 03 - 13);
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

        // Last week's collections.
        post(
            sarah.id,
            AccountType::Savings,
            500_000.0,
            Direction::Credit,
            date!(2024 - 03 - 05),
            &conn,
        );
        // This week's collections.
        post(
            sarah.id,
            AccountType::Savings,
            200_000.0,
            Direction::Credit,
            date!(2024 - 03 - 12),
            &conn,
        );
        post(
            sarah.id,
            AccountType::Shares,
            100_000.0,
            Direction::Credit,
            date!(2024 - 03 - 11),
            &conn,
        );
        post(john.id, AccountType::Mm, 50_000.0, Direction::Credit, today, &conn);
        // A disbursement is not a collection.
        post(
            john.id,
            AccountType::Loan,
            1_000_000.0,
            Direction::Debit,
            date!(2024 - 03 - 12),
            &conn,
        );

        let got = get_dashboard_stats(today, &conn).unwrap();

        assert_eq!(
            DashboardStats {
                total_members: 2,
                active_members: 2,
                new_members_this_month: 0,
                total_savings: 700_000.0,
                total_shares: 100_000.0,
                total_loans: 1_000_000.0,
                // 800k of deposits against a 1M loan book.
                cash_in_bank: -200_000.0,
                weekly_collections: 350_000.0,
                weekly_collections_change: -30.0,
                active_loans_count: 1
            },
            got
        );
    }

    #[test]
    fn outstanding_loans_reduce_cash_in_bank() {
        let conn = get_test_connection();
        let today = date!(2024 - 03 - 13);
        let grace = create_member(
            Member::build("Grace", "Auma", "0700555666"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();

        post(
            grace.id,
            AccountType::Savings,
            800_000.0,
            Direction::Credit,
            date!(2024 - 03 - 01),
            &conn,
        );
        post(
            grace.id,
            AccountType::Loan,
            1_000_000.0,
            Direction::Debit,
            date!(2024 - 03 - 12),
            &conn,
        );

        let got = get_dashboard_stats(today, &conn).unwrap();

        assert_eq!(-200_000.0, got.cash_in_bank);
    }
}
