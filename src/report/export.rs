//! CSV export of transaction listings.

use std::io::Write;

use serde::Serialize;

use crate::{Error, ledger::signed_amount, transaction::TransactionDetail};

/// One exported row. The `Amount` column carries the signed amount, so the
/// column sums to the account balance over any one account's rows.
#[derive(Debug, Serialize)]
struct ExportRow<'a> {
    #[serde(rename = "Date")]
    date: String,
    #[serde(rename = "Account")]
    account: &'a str,
    #[serde(rename = "Type")]
    account_type: &'a str,
    #[serde(rename = "Narration")]
    narration: &'a str,
    #[serde(rename = "Amount")]
    amount: f64,
    #[serde(rename = "Balance After")]
    balance_after: f64,
}

/// Write `transactions` as CSV rows with a
/// `Date,Account,Type,Narration,Amount,Balance After` header.
///
/// The direction of each entry is encoded in the sign of the `Amount` column:
/// positive grows the account's balance, negative shrinks it, per the same
/// convention the balance engine uses. An empty listing produces empty
/// output.
///
/// # Errors
/// This function will return a [Error::CsvError] if a row cannot be written.
pub fn write_transactions_csv<W: Write>(
    transactions: &[TransactionDetail],
    writer: W,
) -> Result<(), Error> {
    let mut csv_writer = csv::WriterBuilder::new().from_writer(writer);

    for transaction in transactions {
        csv_writer
            .serialize(ExportRow {
                date: transaction.date.to_string(),
                account: &transaction.account_no,
                account_type: transaction.account_type.label(),
                narration: transaction.narration.as_deref().unwrap_or(""),
                amount: signed_amount(
                    transaction.account_type,
                    transaction.direction,
                    transaction.amount,
                ),
                balance_after: transaction.balance_after,
            })
            .map_err(|error| Error::CsvError(error.to_string()))?;
    }

    csv_writer
        .flush()
        .map_err(|error| Error::CsvError(error.to_string()))?;

    Ok(())
}

/// Render `transactions` as a CSV string.
///
/// # Errors
/// This function will return a [Error::CsvError] if a row cannot be written.
pub fn transactions_to_csv(transactions: &[TransactionDetail]) -> Result<String, Error> {
    let mut buffer = Vec::new();
    write_transactions_csv(transactions, &mut buffer)?;

    String::from_utf8(buffer).map_err(|error| Error::CsvError(error.to_string()))
}


#[cfg(test)]
mod signed_amount_consistency_tests {
    use rusqlite::Connection;
    use time::macros::date;

    use super::transactions_to_csv;
    use crate::{
        initialize_db,
        ledger::{AccountType, Direction, Posting, account_balance},
        member::{Member, create_member},
        transaction::{LedgerEntry, TransactionFilter, get_transactions, post_transaction},
    };

    fn exported_amount_sum(csv_text: &str) -> f64 {
        let mut reader = csv::ReaderBuilder::new().from_reader(csv_text.as_bytes());
        reader
            .records()
            .map(|record| record.unwrap()[4].parse::<f64>().unwrap())
            .sum()
    }

    #[test]
    fn the_amount_column_sums_to_the_account_balance() {
        let conn = Connection::open_in_memory().unwrap();
        initialize_db(&conn).unwrap();
        let member = create_member(
            Member::build("Sarah", "Nakamya", "0700111222"),
            date!(2024 - 01 - 01),
            &conn,
        )
        .unwrap();
        let today = date!(2024 - 06 - 30);
        for (account_type, amount, direction) in [
            (AccountType::Savings, 500_000.0, Direction::Credit),
            (AccountType::Savings, 150_000.0, Direction::Debit),
            (AccountType::Loan, 1_000_000.0, Direction::Debit),
            (AccountType::Loan, 250_000.0, Direction::Credit),
        ] {
            post_transaction(
                LedgerEntry::new(member.id, account_type, amount, direction, today),
                today,
                &conn,
            )
            .unwrap();
        }

        for (account_type, want_balance) in
            [(AccountType::Savings, 350_000.0), (AccountType::Loan, 750_000.0)]
        {
            let rows = get_transactions(
                &TransactionFilter::new().account_type(account_type),
                &conn,
            )
            .unwrap();
            let postings = rows
                .iter()
                .map(|row| Posting::new(row.amount, row.direction))
                .collect::<Vec<_>>();
            let csv_text = transactions_to_csv(&rows).unwrap();

            let amount_sum = exported_amount_sum(&csv_text);
            assert_eq!(want_balance, amount_sum);
            assert_eq!(account_balance(account_type, &postings), amount_sum);
        }
    }
}
