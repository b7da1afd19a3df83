//! Balance arithmetic shared by every part of the ledger.
//!
//! The sign convention is applied here and nowhere else: for a loan account a
//! debit increases the outstanding balance (disbursement) and a credit
//! decreases it (repayment); for every other account type a credit increases
//! the balance (deposit) and a debit decreases it (withdrawal).

use crate::ledger::types::{AccountType, Direction};

/// A single ledger movement as consumed by the balance fold.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Posting {
    /// The amount of money that moved. Always positive.
    pub amount: f64,
    /// Whether the money moved in or out.
    pub direction: Direction,
}

impl Posting {
    /// Create a posting.
    pub fn new(amount: f64, direction: Direction) -> Self {
        Self { amount, direction }
    }
}

/// The signed effect of a single posting on an account's balance.
///
/// This is the one place the accounting rule lives; balance folds, write-time
/// balance snapshots and export formatting all go through it.
pub fn signed_amount(account_type: AccountType, direction: Direction, amount: f64) -> f64 {
    match (account_type, direction) {
        (AccountType::Loan, Direction::Debit) => amount,
        (AccountType::Loan, Direction::Credit) => -amount,
        (_, Direction::Credit) => amount,
        (_, Direction::Debit) => -amount,
    }
}

/// Derives an account's balance by folding over its postings.
///
/// The result is a signed total: for a loan it is the amount owed (positive
/// means outstanding), for every other account type the amount held. The fold
/// starts at zero, so an empty posting list yields a zero balance. Posting
/// order does not affect the result.
///
/// Amounts are expected to be positive; validating them is the job of the
/// write path, not this fold.
pub fn account_balance(account_type: AccountType, postings: &[Posting]) -> f64 {
    postings.iter().fold(0.0, |balance, posting| {
        balance + signed_amount(account_type, posting.direction, posting.amount)
    })
}

/// Applies one posting on top of a known current balance.
///
/// Used at write time to compute the `balance_after` snapshot stored with
/// each transaction. Produces the same result as re-running
/// [account_balance] over the full history plus the new posting, provided the
/// supplied balance is not stale.
pub fn balance_after(
    account_type: AccountType,
    current_balance: f64,
    amount: f64,
    direction: Direction,
) -> f64 {
    current_balance + signed_amount(account_type, direction, amount)
}
