//! Loan disbursement and repayment.
//!
//! Loans ride the same posting path as every other account. A debit raises
//! what the member owes, a credit pays it down, and the loan book is read
//! straight off the account and transaction tables.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    account::total_balance_by_type,
    database_id::{AccountId, MemberId},
    ledger::{AccountType, Direction},
    transaction::{LedgerEntry, Transaction, post_transaction},
};

/// Pay out a loan principal to a member.
///
/// Posts a debit to the member's loan account, opening one if needed.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the principal is zero, negative or not finite,
/// - or [Error::FutureDate] if the disbursement is dated after `today`,
/// - or [Error::NotFound] if the member does not exist,
/// - or [Error::InactiveMember] if the member is inactive or suspended,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn disburse_loan(
    member_id: MemberId,
    principal: f64,
    date: Date,
    narration: &str,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    post_transaction(
        LedgerEntry::new(member_id, AccountType::Loan, principal, Direction::Debit, date)
            .narration(narration),
        today,
        connection,
    )
}

/// Record a member's repayment against their loan.
///
/// Posts a credit to the member's loan account.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is zero, negative or not finite,
/// - or [Error::FutureDate] if the repayment is dated after `today`,
/// - or [Error::NotFound] if the member does not exist,
/// - or [Error::InactiveMember] if the member is inactive or suspended,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn record_repayment(
    member_id: MemberId,
    amount: f64,
    date: Date,
    narration: &str,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    post_transaction(
        LedgerEntry::new(member_id, AccountType::Loan, amount, Direction::Credit, date)
            .narration(narration),
        today,
        connection,
    )
}

/// Headline figures for the loan book.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct LoanSummary {
    /// The sum of all active loan balances.
    pub total_outstanding: f64,
    /// How many active loan accounts still owe money.
    pub active_loans: u32,
    /// Principal paid out in the current calendar month.
    pub disbursed_this_month: f64,
    /// Repayments received in the current calendar month.
    pub repaid_this_month: f64,
}

/// Summarise the loan book as of `today`.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn loan_summary(today: Date, connection: &Connection) -> Result<LoanSummary, Error> {
    let month_start = Date::from_calendar_date(today.year(), today.month(), 1)
        .expect("invalid month start date");

    let total_outstanding = total_balance_by_type(AccountType::Loan, connection)?;

    let count_query = format!(
        "SELECT COUNT(*) FROM account
        WHERE account_type = '{loan}' AND is_active = 1 AND balance > 0",
        loan = AccountType::Loan.as_str(),
    );
    let active_loans = connection
        .prepare(&count_query)?
        .query_row([], |row| row.get(0))?;

    let month_query = format!(
        "SELECT
            COALESCE(SUM(CASE WHEN t.direction = '{debit}' THEN t.amount END), 0),
            COALESCE(SUM(CASE WHEN t.direction = '{credit}' THEN t.amount END), 0)
        FROM txn t
        INNER JOIN account a ON a.id = t.account_id
        WHERE a.account_type = '{loan}' AND t.date BETWEEN :month_start AND :today",
        debit = Direction::Debit.as_str(),
        credit = Direction::Credit.as_str(),
        loan = AccountType::Loan.as_str(),
    );
    let (disbursed_this_month, repaid_this_month) = connection.prepare(&month_query)?.query_one(
        &[(":month_start", &month_start), (":today", &today)],
        |row| Ok((row.get(0)?, row.get(1)?)),
    )?;

    Ok(LoanSummary {
        total_outstanding,
        active_loans,
        disbursed_this_month,
        repaid_this_month,
    })
}

/// A loan account joined with its member and lifetime movement.
#[derive(Debug, Clone, PartialEq)]
pub struct LoanOverview {
    /// The ID of the loan account.
    pub account_id: AccountId,
    /// The loan account number, e.g. "LON-001".
    pub account_no: String,
    /// The full name of the borrowing member.
    pub member_name: String,
    /// The membership number of the borrowing member.
    pub member_no: String,
    /// What the member still owes.
    pub outstanding: f64,
    /// All principal ever paid out on this account.
    pub total_disbursed: f64,
    /// All repayments ever received on this account.
    pub total_repaid: f64,
    /// The date of the most recent repayment, if any.
    pub last_repayment_date: Option<Date>,
}

/// Get every active loan account with its member, largest outstanding
/// balance first.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_loan_overviews(connection: &Connection) -> Result<Vec<LoanOverview>, Error> {
    let query = format!(
        "SELECT
            a.id,
            a.account_no,
            m.first_name || ' ' || m.last_name,
            m.member_no,
            a.balance,
            COALESCE(SUM(CASE WHEN t.direction = '{debit}' THEN t.amount END), 0),
            COALESCE(SUM(CASE WHEN t.direction = '{credit}' THEN t.amount END), 0),
            MAX(CASE WHEN t.direction = '{credit}' THEN t.date END)
        FROM account a
        INNER JOIN member m ON m.id = a.member_id
        LEFT JOIN txn t ON t.account_id = a.id
        WHERE a.account_type = '{loan}' AND a.is_active = 1
        GROUP BY a.id
        ORDER BY a.balance DESC",
        debit = Direction::Debit.as_str(),
        credit = Direction::Credit.as_str(),
        loan = AccountType::Loan.as_str(),
    );

    connection
        .prepare(&query)?
        .query_map([], |row| {
            Ok(LoanOverview {
                account_id: row.get(0)?,
                account_no: row.get(1)?,
                member_name: row.get(2)?,
                member_no: row.get(3)?,
                outstanding: row.get(4)?,
                total_disbursed: row.get(5)?,
                total_repaid: row.get(6)?,
                last_repayment_date: row.get(7)?,
            })
        })?
        .collect::<Result<Vec<LoanOverview>, rusqlite::Error>>()
        .map_err(|error| error.into())
}

#[cfg(test)]
mod loan_flow_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::{disburse_loan, record_repayment};
    use crate::{
        account::find_active_account,
        initialize_db,
        ledger::AccountType,
        member::{Member, create_member},
    };

    #[test]
    fn disburse_then_repay_tracks_what_is_owed() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        let member = create_member(
            Member::build("Peter", "Mugisha", "0700111222"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();
        let today = date!(2024 - 06 - 15);

        let disbursement = disburse_loan(
            member.id,
            2_000_000.0,
            date!(2024 - 06 - 01),
            "School fees loan",
            today,
            &conn,
        )
        .unwrap();
        assert_eq!(2_000_000.0, disbursement.balance_after);

        let repayment = record_repayment(
            member.id,
            500_000.0,
            date!(2024 - 06 - 10),
            "June instalment",
            today,
            &conn,
        )
        .unwrap();
        assert_eq!(1_500_000.0, repayment.balance_after);

        let account = find_active_account(member.id, AccountType::Loan, &conn).unwrap();
        assert_eq!(1_500_000.0, account.balance);
    }
}

#[cfg(test)]
mod loan_summary_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::{LoanSummary, disburse_loan, loan_summary, record_repayment};
    use crate::{
        initialize_db,
        member::{Member, create_member},
    };

    fn get_test_connection() -> Connection {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        conn
    }

    #[test]
    fn an_empty_loan_book_summarises_to_zero() {
        let conn = get_test_connection();

        let got = loan_summary(date!(2024 - 06 - 15), &conn).unwrap();

        assert_eq!(LoanSummary::default(), got);
    }

    #[test]
    fn the_summary_only_counts_this_month_for_movement() {
        let conn = get_test_connection();
        let today = date!(2024 - 06 - 15);
        let may_borrower = create_member(
            Member::build("Peter", "Mugisha", "0700111222"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();
        let june_borrower = create_member(
            Member::build("Mary", "Nalwanga", "0700333444"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();

        disburse_loan(
            may_borrower.id,
            1_000_000.0,
            date!(2024 - 05 - 20),
            "May loan",
            today,
            &conn,
        )
        .unwrap();
        disburse_loan(
            june_borrower.id,
            600_000.0,
            date!(2024 - 06 - 05),
            "June loan",
            today,
            &conn,
        )
        .unwrap();
        record_repayment(
            may_borrower.id,
            250_000.0,
            date!(2024 - 06 - 10),
            "Instalment",
            today,
            &conn,
        )
        .unwrap();

        let got = loan_summary(today, &conn).unwrap();

        assert_eq!(
            LoanSummary {
                total_outstanding: 1_350_000.0,
                active_loans: 2,
                disbursed_this_month: 600_000.0,
                repaid_this_month: 250_000.0
            },
            got
        );
    }

    #[test]
    fn a_fully_repaid_loan_is_not_an_active_loan() {
        let conn = get_test_connection();
        let today = date!(2024 - 06 - 15);
        let member = create_member(
            Member::build("David", "Ssemakula", "0700555666"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();
        disburse_loan(member.id, 100_000.0, date!(2024 - 06 - 01), "Loan", today, &conn).unwrap();
        record_repayment(member.id, 100_000.0, date!(2024 - 06 - 10), "Full", today, &conn)
            .unwrap();

        let got = loan_summary(today, &conn).unwrap();

        assert_eq!(0, got.active_loans);
        assert_eq!(0.0, got.total_outstanding);
    }
}
