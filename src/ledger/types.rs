//! Core ledger domain types.

use std::{fmt::Display, str::FromStr};

use rusqlite::types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef};
use serde::{Deserialize, Serialize};

use crate::Error;

/// The kind of account a ledger entry is posted against.
///
/// The account type decides which direction increases the balance: a loan is
/// liability-like (debit increases the amount owed), every other type is
/// asset-like (credit increases the amount held).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AccountType {
    /// Member share capital.
    Shares,
    /// Ordinary savings.
    Savings,
    /// Fixed deposit savings locked for a term.
    FixedDeposit,
    /// A loan owed to the cooperative.
    Loan,
    /// Merry-go-round (rotating savings) contributions.
    Mm,
    /// Development fund contributions.
    DevelopmentFund,
}

impl AccountType {
    /// Every account type, in display order.
    pub const ALL: [AccountType; 6] = [
        AccountType::Shares,
        AccountType::Savings,
        AccountType::FixedDeposit,
        AccountType::Loan,
        AccountType::Mm,
        AccountType::DevelopmentFund,
    ];

    /// The string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            AccountType::Shares => "shares",
            AccountType::Savings => "savings",
            AccountType::FixedDeposit => "fixed_deposit",
            AccountType::Loan => "loan",
            AccountType::Mm => "mm",
            AccountType::DevelopmentFund => "development_fund",
        }
    }

    /// The prefix used when assigning account numbers, e.g. `SAV-003`.
    pub fn account_no_prefix(&self) -> &'static str {
        match self {
            AccountType::Shares => "SHA",
            AccountType::Savings => "SAV",
            AccountType::FixedDeposit => "FXD",
            AccountType::Loan => "LON",
            AccountType::Mm => "MM",
            AccountType::DevelopmentFund => "DEV",
        }
    }

    /// A human-readable label for reports.
    pub fn label(&self) -> &'static str {
        match self {
            AccountType::Shares => "Shares",
            AccountType::Savings => "Savings",
            AccountType::FixedDeposit => "Fixed Deposit",
            AccountType::Loan => "Loan",
            AccountType::Mm => "Merry-go-round",
            AccountType::DevelopmentFund => "Development Fund",
        }
    }
}

impl FromStr for AccountType {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "shares" => Ok(AccountType::Shares),
            "savings" => Ok(AccountType::Savings),
            "fixed_deposit" => Ok(AccountType::FixedDeposit),
            "loan" => Ok(AccountType::Loan),
            "mm" => Ok(AccountType::Mm),
            "development_fund" => Ok(AccountType::DevelopmentFund),
            _ => Err(Error::InvalidAccountType(s.to_string())),
        }
    }
}

impl Display for AccountType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for AccountType {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for AccountType {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// The polarity of a ledger entry: `credit` is money in, `debit` is money out.
///
/// Whether a direction raises or lowers a balance depends on the
/// [AccountType]; see [signed_amount](crate::ledger::signed_amount).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Direction {
    /// Money out of the account (withdrawal, disbursement).
    Debit,
    /// Money into the account (deposit, repayment).
    Credit,
}

impl Direction {
    /// The string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            Direction::Debit => "debit",
            Direction::Credit => "credit",
        }
    }
}

impl FromStr for Direction {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "debit" => Ok(Direction::Debit),
            "credit" => Ok(Direction::Credit),
            _ => Err(Error::InvalidDirection(s.to_string())),
        }
    }
}

impl Display for Direction {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for Direction {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for Direction {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}


#[cfg(test)]
mod direction_tests {
    use super::Direction;
    use crate::Error;

    #[test]
    fn parses_database_strings() {
        assert_eq!(Ok(Direction::Debit), "debit".parse());
        assert_eq!(Ok(Direction::Credit), "credit".parse());
    }

    #[test]
    fn rejects_unknown_string() {
        let got = "transfer".parse::<Direction>();

        assert_eq!(Err(Error::InvalidDirection("transfer".to_string())), got);
    }
}
