//! The six-week collection trend chart data.

use rusqlite::Connection;
use time::{Date, Duration};

use crate::{
    Error,
    account::total_balance_by_type,
    dashboard::stats::cash_in_bank,
    ledger::{AccountType, DatedPosting, WeeklyTrend, monday_of},
};

/// How many weekly buckets the dashboard chart shows.
const TREND_WEEKS: usize = 6;

/// Build the weekly trend series ending in the week containing `today`.
///
/// Fetches the postings dated within the six-week window plus the current
/// loan and cash totals, then hands them to the pure
/// [WeeklyTrend](crate::ledger::WeeklyTrend) series.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn weekly_trend(today: Date, connection: &Connection) -> Result<WeeklyTrend, Error> {
    let window_start = monday_of(today) - Duration::weeks(TREND_WEEKS as i64 - 1);

    let postings = connection
        .prepare("SELECT date, amount, direction FROM txn WHERE date >= :start ORDER BY date")?
        .query_map(&[(":start", &window_start)], |row| {
            Ok(DatedPosting {
                date: row.get(0)?,
                amount: row.get(1)?,
                direction: row.get(2)?,
            })
        })?
        .collect::<Result<Vec<DatedPosting>, rusqlite::Error>>()?;

    let outstanding_loans = total_balance_by_type(AccountType::Loan, connection)?;
    let cash_position = cash_in_bank(connection)?;

    Ok(WeeklyTrend::new(
        today,
        postings,
        outstanding_loans,
        cash_position,
        TREND_WEEKS,
    ))
}

#[cfg(test)]
mod weekly_trend_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::weekly_trend;
    use crate::{
        initialize_db,
        ledger::{AccountType, Direction},
        member::{Member, create_member},
        transaction::{LedgerEntry, post_transaction},
    };

    #[test]
    fn postings_land_in_their_weekly_buckets() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        // Wednesday; the six-week window starts Monday 2024-02-05.
        let today = date!(2024 - 03 - 13);
        let member = create_member(
            Member::build("Sarah", "Nakamya", "0700111222"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();

        post_transaction(
            LedgerEntry::new(
                member.id,
                AccountType::Savings,
                100_000.0,
                Direction::Credit,
                date!(2024 - 02 - 06),
            ),
            today,
            &conn,
        )
        .unwrap();
        post_transaction(
            LedgerEntry::new(
                member.id,
                AccountType::Savings,
                50_000.0,
                Direction::Credit,
                date!(2024 - 03 - 12),
            ),
            today,
            &conn,
        )
        .unwrap();
        post_transaction(
            LedgerEntry::new(
                member.id,
                AccountType::Loan,
                400_000.0,
                Direction::Debit,
                date!(2024 - 03 - 12),
            ),
            today,
            &conn,
        )
        .unwrap();

        let trend = weekly_trend(today, &conn).unwrap();
        let points = trend.points().collect::<Vec<_>>();

        assert_eq!(6, points.len());
        assert_eq!(
            vec!["W1", "W2", "W3", "W4", "W5", "W6"],
            points.iter().map(|p| p.label.as_str()).collect::<Vec<_>>()
        );
        assert_eq!(date!(2024 - 02 - 05), points[0].week_start);

        assert_eq!(100_000.0, points[0].collections);
        for point in &points[1..5] {
            assert_eq!(0.0, point.collections, "{} should be empty", point.label);
        }
        // The disbursement is a debit, so only the deposit counts.
        assert_eq!(50_000.0, points[5].collections);

        for point in &points {
            assert_eq!(400_000.0, point.outstanding_loans);
            // 150k of deposits against the 400k loan book.
            assert_eq!(-250_000.0, point.cash_position);
        }
    }
}
