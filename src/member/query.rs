//! Queries over the member registry.
//!
//! Listing and search views join each member with their active account
//! balances so the registry can show headline figures without loading full
//! statements.

use rusqlite::{Connection, params_from_iter};
use time::Date;

use crate::{
    Error,
    database_id::MemberId,
    ledger::{AccountBalance, AccountType, PortfolioSummary, portfolio_summary},
    member::core::{MemberStatus, get_member},
};

/// A member row joined with their headline account balances.
///
/// This is separate from the main [Member](crate::member::Member) domain model
/// because the registry listing shows balances alongside contact details.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberOverview {
    /// The ID of the member.
    pub id: MemberId,
    /// The membership number, e.g. "M001".
    pub member_no: String,
    /// The member's full name.
    pub full_name: String,
    /// The member's phone number.
    pub phone: String,
    /// The member's standing in the society.
    pub status: MemberStatus,
    /// The date the member joined.
    pub joined_date: Date,
    /// The balance across the member's active savings accounts.
    pub savings_balance: f64,
    /// The balance across the member's active share accounts.
    pub shares_balance: f64,
    /// The amount the member owes across active loan accounts.
    pub loan_balance: f64,
}

/// Get every member with their headline balances, ordered by membership
/// number.
///
/// `search` narrows the listing to members whose name, membership number or
/// phone number contains the text (case-insensitive). `None` or blank text
/// returns everyone.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_member_overviews(
    search: Option<&str>,
    connection: &Connection,
) -> Result<Vec<MemberOverview>, Error> {
    let mut query = format!(
        "SELECT
            m.id,
            m.member_no,
            m.first_name || ' ' || m.last_name AS full_name,
            m.phone,
            m.status,
            m.joined_date,
            COALESCE(SUM(CASE WHEN a.account_type = '{savings}' THEN a.balance END), 0),
            COALESCE(SUM(CASE WHEN a.account_type = '{shares}' THEN a.balance END), 0),
            COALESCE(SUM(CASE WHEN a.account_type = '{loan}' THEN a.balance END), 0)
        FROM member m
        LEFT JOIN account a ON a.member_id = m.id AND a.is_active = 1",
        savings = AccountType::Savings.as_str(),
        shares = AccountType::Shares.as_str(),
        loan = AccountType::Loan.as_str(),
    );

    let mut params: Vec<String> = Vec::new();

    if let Some(search) = search.filter(|s| !s.trim().is_empty()) {
        query.push_str(
            " WHERE (LOWER(m.first_name || ' ' || m.last_name) LIKE ?
                OR LOWER(m.member_no) LIKE ?
                OR m.phone LIKE ?)",
        );
        let pattern = format!("%{}%", search.trim().to_lowercase());
        params.extend([pattern.clone(), pattern.clone(), pattern]);
    }

    query.push_str(" GROUP BY m.id ORDER BY m.member_no");

    connection
        .prepare(&query)?
        .query_map(params_from_iter(params), |row| {
            Ok(MemberOverview {
                id: row.get(0)?,
                member_no: row.get(1)?,
                full_name: row.get(2)?,
                phone: row.get(3)?,
                status: row.get(4)?,
                joined_date: row.get(5)?,
                savings_balance: row.get(6)?,
                shares_balance: row.get(7)?,
                loan_balance: row.get(8)?,
            })
        })?
        .collect::<Result<Vec<MemberOverview>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

/// Headline counts for the member registry.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RegistryStats {
    /// How many members are on the books, regardless of standing.
    pub total_members: u32,
    /// How many members are in active standing.
    pub active_members: u32,
    /// How many members joined in the current calendar month.
    pub new_members_this_month: u32,
}

/// Count the members on the books, the active ones and those who joined in
/// the calendar month containing `today`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn registry_stats(today: Date, connection: &Connection) -> Result<RegistryStats, Error> {
    let month_start = Date::from_calendar_date(today.year(), today.month(), 1)
        .expect("invalid month start date");

    let query = format!(
        "SELECT
            COUNT(*),
            COUNT(CASE WHEN status = '{active}' THEN 1 END),
            COUNT(CASE WHEN joined_date >= :month_start THEN 1 END)
        FROM member",
        active = MemberStatus::Active.as_str(),
    );

    let stats = connection.prepare(&query)?.query_one(
        &[(":month_start", &month_start)],
        |row| {
            Ok(RegistryStats {
                total_members: row.get(0)?,
                active_members: row.get(1)?,
                new_members_this_month: row.get(2)?,
            })
        },
    )?;

    Ok(stats)
}

/// Summarise a member's position across their active accounts.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the member does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn member_portfolio(
    member_id: MemberId,
    connection: &Connection,
) -> Result<PortfolioSummary, Error> {
    let member = get_member(member_id, connection)?;

    let balances = crate::account::get_member_accounts(member.id, connection)?
        .into_iter()
        .filter(|account| account.is_active)
        .map(|account| AccountBalance {
            account_type: account.account_type,
            balance: account.balance,
        })
        .collect::<Vec<_>>();

    Ok(portfolio_summary(&balances))
}


#[cfg(test)]
mod registry_stats_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::{RegistryStats, registry_stats};
    use crate::{
        initialize_db,
        member::{Member, MemberStatus, create_member, update_member},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        conn
    }

    #[test]
    fn stats_of_an_empty_registry_are_zero() {
        let conn = get_test_connection();

        let got = registry_stats(date!(2024 - 06 - 15), &conn).unwrap();

        assert_eq!(RegistryStats::default(), got);
    }

    #[test]
    fn stats_count_standing_and_joins_this_month() {
        let conn = get_test_connection();
        create_member(
            Member::build("Sarah", "Nakamya", "0700111222").joined_date(date!(2024 - 05 - 31)),
            date!(2024 - 06 - 15),
            &conn,
        )
        .unwrap();
        create_member(
            Member::build("John", "Okello", "0700333444").joined_date(date!(2024 - 06 - 01)),
            date!(2024 - 06 - 15),
            &conn,
        )
        .unwrap();
        let mut suspended = create_member(
            Member::build("Grace", "Auma", "0700555666").joined_date(date!(2024 - 06 - 10)),
            date!(2024 - 06 - 15),
            &conn,
        )
        .unwrap();
        suspended.status = MemberStatus::Suspended;
        update_member(&suspended, &conn).unwrap();

        let got = registry_stats(date!(2024 - 06 - 15), &conn).unwrap();

        assert_eq!(
            RegistryStats {
                total_members: 3,
                active_members: 2,
                new_members_this_month: 2
            },
            got
        );
    }
}
