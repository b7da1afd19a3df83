//! Member statements.

use rusqlite::Connection;
use time::Date;

use crate::{
    Error,
    account::get_member_accounts,
    database_id::MemberId,
    ledger::{AccountType, Direction, signed_amount},
    member::{Member, get_member},
    transaction::get_account_transactions,
};

/// One movement on a member's statement.
#[derive(Debug, Clone, PartialEq)]
pub struct StatementLine {
    /// The date the money moved.
    pub date: Date,
    /// The account number the entry was posted to.
    pub account_no: String,
    /// The kind of account the entry was posted to.
    pub account_type: AccountType,
    /// Free-text description of what the entry is for.
    pub narration: Option<String>,
    /// The receipt reference of the entry.
    pub reference_no: String,
    /// The amount of money that moved.
    pub amount: f64,
    /// Whether the money moved in or out.
    pub direction: Direction,
    /// The account's balance after this entry, replayed from the ledger.
    pub running_balance: f64,
}

/// Where one of the member's accounts ends up after the full replay.
#[derive(Debug, Clone, PartialEq)]
pub struct ClosingBalance {
    /// The account number, e.g. "SAV-001".
    pub account_no: String,
    /// The kind of account.
    pub account_type: AccountType,
    /// The replayed balance.
    pub balance: f64,
}

/// A member's full transaction history with replayed running balances.
#[derive(Debug, Clone, PartialEq)]
pub struct MemberStatement {
    /// The member the statement is for.
    pub member: Member,
    /// Every movement across the member's accounts, oldest first.
    pub lines: Vec<StatementLine>,
    /// The replayed closing balance of each account.
    pub closing_balances: Vec<ClosingBalance>,
}

/// Build a member's statement by replaying their ledger from the start.
///
/// Running balances are recomputed line by line rather than read from the
/// stored snapshots, so the statement stays correct even against a stale or
/// tampered cached balance.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if the member does not exist,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn member_statement(
    member_id: MemberId,
    connection: &Connection,
) -> Result<MemberStatement, Error> {
    let member = get_member(member_id, connection)?;

    let mut keyed_lines = Vec::new();
    let mut closing_balances = Vec::new();

    for account in get_member_accounts(member.id, connection)? {
        let mut running_balance = 0.0;

        for transaction in get_account_transactions(account.id, connection)? {
            running_balance += signed_amount(
                account.account_type,
                transaction.direction,
                transaction.amount,
            );

            keyed_lines.push((
                transaction.id,
                StatementLine {
                    date: transaction.date,
                    account_no: account.account_no.clone(),
                    account_type: account.account_type,
                    narration: transaction.narration,
                    reference_no: transaction.reference_no,
                    amount: transaction.amount,
                    direction: transaction.direction,
                    running_balance,
                },
            ));
        }

        closing_balances.push(ClosingBalance {
            account_no: account.account_no,
            account_type: account.account_type,
            balance: running_balance,
        });
    }

    // Interleave the accounts chronologically, keeping same-day entries in
    // posting order.
    keyed_lines.sort_by(|a, b| a.1.date.cmp(&b.1.date).then(a.0.cmp(&b.0)));

    Ok(MemberStatement {
        member,
        lines: keyed_lines.into_iter().map(|(_, line)| line).collect(),
        closing_balances,
    })
}
