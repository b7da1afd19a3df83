//! Posting new entries into the ledger.
//!
//! This is the only write path for transactions. It validates the request,
//! resolves the target account, computes the balance snapshot and then lands
//! the entry and the account's cached balance in a single SQL transaction so
//! the two can never drift apart.

use std::sync::atomic::{AtomicU32, Ordering};

use rusqlite::{Connection, Transaction as SqlTransaction, TransactionBehavior};
use time::{Date, OffsetDateTime};

use crate::{
    Error,
    account::get_or_create_active_account,
    database_id::MemberId,
    ledger::{AccountType, Direction, balance_after},
    member::{MemberStatus, get_member},
    transaction::core::{Transaction, map_transaction_row},
};

/// A request to post one ledger entry for a member.
///
/// The entry names the member and the kind of account; the posting path finds
/// or opens the concrete account itself.
#[derive(Debug, Clone, PartialEq)]
pub struct LedgerEntry {
    /// The member the entry is for.
    pub member_id: MemberId,
    /// The kind of account to post against.
    pub account_type: AccountType,
    /// The amount of money moving. Must be positive.
    pub amount: f64,
    /// Whether the money moves in or out.
    pub direction: Direction,
    /// The date the money moved. Must not be in the future.
    pub date: Date,
    /// Free-text description of what the entry is for.
    pub narration: Option<String>,
    /// A caller-supplied receipt reference. Generated if not set.
    pub reference_no: Option<String>,
}

impl LedgerEntry {
    /// Create a ledger entry request with no narration and a generated
    /// reference.
    pub fn new(
        member_id: MemberId,
        account_type: AccountType,
        amount: f64,
        direction: Direction,
        date: Date,
    ) -> Self {
        Self {
            member_id,
            account_type,
            amount,
            direction,
            date,
            narration: None,
            reference_no: None,
        }
    }

    /// Set the narration for the entry.
    pub fn narration(mut self, narration: &str) -> Self {
        self.narration = Some(narration.to_owned());
        self
    }

    /// Set an explicit receipt reference for the entry.
    pub fn reference_no(mut self, reference_no: &str) -> Self {
        self.reference_no = Some(reference_no.to_owned());
        self
    }
}

/// Post a ledger entry.
///
/// Finds or opens the member's active account of the requested type, computes
/// the balance the account will hold after the entry, then inserts the
/// transaction row and updates the account's cached balance atomically.
/// If either write fails, neither is kept.
///
/// # Errors
/// This function will return a:
/// - [Error::InvalidAmount] if the amount is zero, negative or not finite,
/// - or [Error::FutureDate] if the entry is dated after `today`,
/// - or [Error::NotFound] if the member does not exist,
/// - or [Error::InactiveMember] if the member is inactive or suspended,
/// - or [Error::DuplicateReference] if the supplied receipt reference is
///   already taken,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn post_transaction(
    entry: LedgerEntry,
    today: Date,
    connection: &Connection,
) -> Result<Transaction, Error> {
    if !entry.amount.is_finite() || entry.amount <= 0.0 {
        return Err(Error::InvalidAmount(entry.amount));
    }

    if entry.date > today {
        return Err(Error::FutureDate(entry.date));
    }

    let member = get_member(entry.member_id, connection)?;

    if member.status != MemberStatus::Active {
        return Err(Error::InactiveMember(member.id));
    }

    let account =
        get_or_create_active_account(entry.member_id, entry.account_type, today, connection)?;

    let new_balance = balance_after(
        account.account_type,
        account.balance,
        entry.amount,
        entry.direction,
    );

    let created_at = OffsetDateTime::now_utc();
    let reference_no = match entry.reference_no {
        Some(reference_no) => reference_no,
        None => generate_reference_no(created_at),
    };

    // The entry and the cached balance must land together.
    let sql_transaction =
        SqlTransaction::new_unchecked(connection, TransactionBehavior::Immediate)?;

    let transaction = sql_transaction
        .prepare(
            "INSERT INTO txn
                (account_id, member_id, date, amount, direction, narration, reference_no, balance_after, created_at)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, account_id, member_id, date, amount, direction, narration, reference_no, balance_after, created_at",
        )?
        .query_row(
            (
                account.id,
                member.id,
                entry.date,
                entry.amount,
                entry.direction,
                &entry.narration,
                &reference_no,
                new_balance,
                created_at,
            ),
            map_transaction_row,
        )?;

    sql_transaction.execute(
        "UPDATE account SET balance = ?1 WHERE id = ?2",
        (new_balance, account.id),
    )?;

    sql_transaction.commit()?;

    Ok(transaction)
}

/// Generate a receipt reference from the wall clock and a process-wide
/// counter.
///
/// The counter keeps entries recorded in the same millisecond apart; a clash
/// across process restarts surfaces as [Error::DuplicateReference] and the
/// caller can retry.
fn generate_reference_no(created_at: OffsetDateTime) -> String {
    static COUNTER: AtomicU32 = AtomicU32::new(0);

    let millis = created_at.unix_timestamp_nanos() / 1_000_000;
    let count = COUNTER.fetch_add(1, Ordering::Relaxed) % 10_000;

    format!("TXN-{millis}-{count:04}")
}
