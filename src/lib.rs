//! Sacco Ledger is a bookkeeping engine for a Savings and Credit Cooperative
//! Organization (SACCO): a member registry, a multi-account ledger (shares,
//! savings, fixed deposits, loans, merry-go-round, development fund),
//! transaction posting with double-checked balances, and reporting.
//!
//! This library provides the storage layer over SQLite and the pure balance
//! arithmetic that the storage layer and reports are built on.

#![warn(missing_docs)]

use time::Date;

use crate::database_id::MemberId;

pub mod account;
pub mod currency;
pub mod dashboard;
pub mod database_id;
mod db;
pub mod ledger;
pub mod loan;
pub mod member;
pub mod report;
pub mod timezone;
pub mod transaction;

pub use db::initialize as initialize_db;

/// The errors that may occur in the application.
#[derive(Debug, thiserror::Error, PartialEq)]
pub enum Error {
    /// An empty string was used for a member's first or last name.
    #[error("Member name cannot be empty")]
    EmptyMemberName,

    /// An empty string was used for a member's phone number.
    #[error("Phone number cannot be empty")]
    EmptyPhoneNumber,

    /// A string from the database or user input did not name a known account
    /// type.
    #[error("\"{0}\" is not a valid account type")]
    InvalidAccountType(String),

    /// A string from the database or user input did not name a known
    /// transaction direction.
    #[error("\"{0}\" is not a valid transaction direction")]
    InvalidDirection(String),

    /// A string from the database or user input did not name a known member
    /// status.
    #[error("\"{0}\" is not a valid member status")]
    InvalidMemberStatus(String),

    /// A zero, negative or non-finite amount was used to post a transaction.
    ///
    /// Amounts are always stored positive; the transaction direction decides
    /// whether the balance goes up or down.
    #[error("transaction amounts must be a positive number, got {0}")]
    InvalidAmount(f64),

    /// A date in the future was used to post a transaction.
    ///
    /// Transactions record events that have already happened, therefore future
    /// dates are not allowed.
    #[error("{0} is a date in the future, which is not allowed")]
    FutureDate(Date),

    /// A transaction was posted against a member that is not active.
    ///
    /// Inactive and suspended members keep their history but may not take on
    /// new ledger activity until reactivated.
    #[error("member {0} is not active and cannot transact")]
    InactiveMember(MemberId),

    /// The specified member number already exists in the database.
    #[error("the member number \"{0}\" already exists in the database")]
    DuplicateMemberNo(String),

    /// The specified account number already exists in the database.
    #[error("the account number \"{0}\" already exists in the database")]
    DuplicateAccountNo(String),

    /// The specified transaction reference already exists in the database.
    ///
    /// Reference numbers uniquely identify ledger entries. Rejecting
    /// duplicates stops the same receipt from being captured twice, which is
    /// likely to happen when a clerk re-submits a posting form.
    #[error("the transaction reference already exists in the database")]
    DuplicateReference,

    /// The requested resource was not found.
    ///
    /// Internally, this error may occur when a query returns no rows or an
    /// update matches no rows.
    #[error("the requested resource could not be found")]
    NotFound,

    /// An unhandled/unexpected SQL error.
    #[error("an unexpected SQL error occurred: {0}")]
    SqlError(rusqlite::Error),

    /// An error occurred while getting the local timezone from a canonical
    /// timezone string.
    #[error("invalid timezone {0}")]
    InvalidTimezone(String),

    /// An error occurred while writing rows to a CSV file.
    #[error("could not write the CSV file: {0}")]
    CsvError(String),
}

impl From<rusqlite::Error> for Error {
    fn from(value: rusqlite::Error) -> Self {
        match value {
            // Code 2067 occurs when a UNIQUE constraint failed.
            rusqlite::Error::SqliteFailure(sql_error, Some(ref desc))
                if sql_error.extended_code == 2067 && desc.ends_with("txn.reference_no") =>
            {
                Error::DuplicateReference
            }
            rusqlite::Error::QueryReturnedNoRows => Error::NotFound,
            error => {
                tracing::error!("an unhandled SQL error occurred: {}", error);
                Error::SqlError(error)
            }
        }
    }
}
