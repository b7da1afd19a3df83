//! Portfolio level aggregation of account balances.

use crate::ledger::types::AccountType;

/// An account annotated with its derived balance, the input to
/// [portfolio_summary].
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AccountBalance {
    /// The kind of account the balance belongs to.
    pub account_type: AccountType,
    /// The balance as computed by
    /// [account_balance](crate::ledger::account_balance).
    pub balance: f64,
}

/// Assets, liabilities and net worth across a set of accounts.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct PortfolioSummary {
    /// The sum of balances held in asset-type accounts.
    pub total_assets: f64,
    /// The sum of outstanding loan balances, as a positive figure.
    pub total_liabilities: f64,
    /// `total_assets - total_liabilities`.
    pub net_worth: f64,
}

/// Aggregates account balances into a portfolio summary.
///
/// Loan balances contribute their absolute value to the liabilities total,
/// every other account type contributes its balance to the assets total.
/// Pure and order independent across accounts.
pub fn portfolio_summary(accounts: &[AccountBalance]) -> PortfolioSummary {
    let mut total_assets = 0.0;
    let mut total_liabilities = 0.0;

    for account in accounts {
        if account.account_type == AccountType::Loan {
            total_liabilities += account.balance.abs();
        } else {
            total_assets += account.balance;
        }
    }

    PortfolioSummary {
        total_assets,
        total_liabilities,
        net_worth: total_assets - total_liabilities,
    }
}
