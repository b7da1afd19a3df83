//! Member accounts.
//!
//! This module contains everything related to accounts:
//! - The `Account` model and the lookup-or-create path used when posting
//! - Database functions for opening, closing and listing accounts
//! - Reconciliation of cached balances against the ledger

mod core;
mod reconcile;

pub use core::{
    Account, close_account, find_active_account, get_account, get_accounts, get_member_accounts,
    get_or_create_active_account, total_balance_by_type,
};
pub use reconcile::{BalanceMismatch, derived_balance, find_balance_mismatches};

pub(crate) use core::create_account_table;
