use std::error::Error;
use std::fs::{self, OpenOptions};
use std::path::Path;
use std::process::exit;
use std::sync::Arc;

use clap::Parser;
use rusqlite::Connection;
use time::{Date, Duration};
use tracing_subscriber::{Layer, filter, layer::SubscriberExt, util::SubscriberInitExt};

use sacco_ledger::{
    account::find_balance_mismatches,
    currency::format_ugx,
    initialize_db,
    ledger::{AccountType, Direction},
    loan::{disburse_loan, record_repayment},
    member::{Member, MemberStatus, create_member, get_member_overviews, update_member},
    timezone::{DEFAULT_TIMEZONE, local_today},
    transaction::{LedgerEntry, post_transaction},
};

/// A utility for creating and seeding a demo SACCO ledger database.
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
struct Args {
    /// File path to save the SQLite database to.
    #[arg(long, short)]
    output_path: String,

    /// Overwrite the database file if it already exists.
    #[arg(long)]
    force: bool,

    /// How many of the demo members to seed (at most six).
    #[arg(long, default_value_t = 6)]
    members: usize,
}

struct SeedMember {
    first_name: &'static str,
    last_name: &'static str,
    phone: &'static str,
    email: &'static str,
    joined: Date,
    active: bool,
}

const SEED_MEMBERS: [SeedMember; 6] = [
    SeedMember {
        first_name: "Sarah",
        last_name: "Nakamya",
        phone: "+256 700 123456",
        email: "sarah@email.com",
        joined: time::macros::date!(2022 - 03 - 15),
        active: true,
    },
    SeedMember {
        first_name: "John",
        last_name: "Okello",
        phone: "+256 701 234567",
        email: "john@email.com",
        joined: time::macros::date!(2021 - 08 - 20),
        active: true,
    },
    SeedMember {
        first_name: "Grace",
        last_name: "Auma",
        phone: "+256 702 345678",
        email: "grace@email.com",
        joined: time::macros::date!(2023 - 01 - 10),
        active: true,
    },
    SeedMember {
        first_name: "Peter",
        last_name: "Mugisha",
        phone: "+256 703 456789",
        email: "peter@email.com",
        joined: time::macros::date!(2020 - 11 - 05),
        active: false,
    },
    SeedMember {
        first_name: "Mary",
        last_name: "Nalwanga",
        phone: "+256 704 567890",
        email: "mary@email.com",
        joined: time::macros::date!(2022 - 06 - 28),
        active: true,
    },
    SeedMember {
        first_name: "David",
        last_name: "Ssemakula",
        phone: "+256 705 678901",
        email: "david@email.com",
        joined: time::macros::date!(2021 - 04 - 12),
        active: true,
    },
];

struct SeedPosting {
    member: usize,
    account_type: AccountType,
    amount: f64,
    direction: Direction,
    days_ago: i64,
    narration: &'static str,
}

/// Deposits, withdrawals and contributions, dated relative to today so the
/// dashboard's weekly trend has something to show.
const SEED_POSTINGS: [SeedPosting; 15] = [
    SeedPosting {
        member: 0,
        account_type: AccountType::Shares,
        amount: 2_500_000.0,
        direction: Direction::Credit,
        days_ago: 70,
        narration: "Share capital contribution",
    },
    SeedPosting {
        member: 0,
        account_type: AccountType::Savings,
        amount: 1_000_000.0,
        direction: Direction::Credit,
        days_ago: 42,
        narration: "Monthly savings deposit",
    },
    SeedPosting {
        member: 0,
        account_type: AccountType::Savings,
        amount: 650_000.0,
        direction: Direction::Credit,
        days_ago: 14,
        narration: "Monthly savings deposit",
    },
    SeedPosting {
        member: 0,
        account_type: AccountType::Savings,
        amount: 150_000.0,
        direction: Direction::Debit,
        days_ago: 7,
        narration: "Cash withdrawal",
    },
    SeedPosting {
        member: 1,
        account_type: AccountType::Shares,
        amount: 5_000_000.0,
        direction: Direction::Credit,
        days_ago: 80,
        narration: "Share capital contribution",
    },
    SeedPosting {
        member: 1,
        account_type: AccountType::Savings,
        amount: 3_200_000.0,
        direction: Direction::Credit,
        days_ago: 35,
        narration: "Monthly savings deposit",
    },
    SeedPosting {
        member: 2,
        account_type: AccountType::Shares,
        amount: 1_000_000.0,
        direction: Direction::Credit,
        days_ago: 55,
        narration: "Share capital contribution",
    },
    SeedPosting {
        member: 2,
        account_type: AccountType::Savings,
        amount: 500_000.0,
        direction: Direction::Credit,
        days_ago: 28,
        narration: "Monthly savings deposit",
    },
    SeedPosting {
        member: 2,
        account_type: AccountType::Savings,
        amount: 300_000.0,
        direction: Direction::Credit,
        days_ago: 3,
        narration: "Monthly savings deposit",
    },
    SeedPosting {
        member: 3,
        account_type: AccountType::Shares,
        amount: 3_500_000.0,
        direction: Direction::Credit,
        days_ago: 90,
        narration: "Share capital contribution",
    },
    SeedPosting {
        member: 3,
        account_type: AccountType::Savings,
        amount: 2_100_000.0,
        direction: Direction::Credit,
        days_ago: 50,
        narration: "Monthly savings deposit",
    },
    SeedPosting {
        member: 4,
        account_type: AccountType::Shares,
        amount: 1_800_000.0,
        direction: Direction::Credit,
        days_ago: 65,
        narration: "Share capital contribution",
    },
    SeedPosting {
        member: 4,
        account_type: AccountType::Savings,
        amount: 950_000.0,
        direction: Direction::Credit,
        days_ago: 18,
        narration: "Monthly savings deposit",
    },
    SeedPosting {
        member: 4,
        account_type: AccountType::Mm,
        amount: 300_000.0,
        direction: Direction::Credit,
        days_ago: 5,
        narration: "MM cycle contribution",
    },
    SeedPosting {
        member: 5,
        account_type: AccountType::Shares,
        amount: 4_200_000.0,
        direction: Direction::Credit,
        days_ago: 75,
        narration: "Share capital contribution",
    },
];

/// Create and populate a demo database.
fn main() -> Result<(), Box<dyn Error>> {
    setup_logging();

    let args = Args::parse();

    let output_path = Path::new(&args.output_path);

    match output_path.extension() {
        None => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        Some(extension) if extension.is_empty() => {
            eprintln!("Output path must include a file extension (e.g., 'my_database.db').");
            exit(1);
        }
        _ => {}
    }

    if output_path.is_file() {
        if !args.force {
            eprintln!("File already exists at {output_path:#?}! Pass --force to overwrite it.");
            exit(1);
        }

        fs::remove_file(output_path)?;
    }

    println!("Creating database at {output_path:#?}");
    let conn = Connection::open(output_path)?;

    initialize_db(&conn)?;

    let today = local_today(DEFAULT_TIMEZONE)?;
    let member_count = args.members.min(SEED_MEMBERS.len());

    println!("Registering {member_count} members...");
    let mut members = Vec::new();

    for seed in SEED_MEMBERS.iter().take(member_count) {
        let member = create_member(
            Member::build(seed.first_name, seed.last_name, seed.phone)
                .email(seed.email)
                .joined_date(seed.joined),
            today,
            &conn,
        )?;
        members.push(member);
    }

    println!("Posting transactions...");

    for posting in SEED_POSTINGS.iter().filter(|p| p.member < member_count) {
        let entry = LedgerEntry::new(
            members[posting.member].id,
            posting.account_type,
            posting.amount,
            posting.direction,
            today - Duration::days(posting.days_ago),
        )
        .narration(posting.narration);

        post_transaction(entry, today, &conn)?;
    }

    if member_count > 5 {
        let david = &members[5];
        post_transaction(
            LedgerEntry::new(
                david.id,
                AccountType::Savings,
                2_800_000.0,
                Direction::Credit,
                today - Duration::days(25),
            )
            .narration("Monthly savings deposit"),
            today,
            &conn,
        )?;
        post_transaction(
            LedgerEntry::new(
                david.id,
                AccountType::DevelopmentFund,
                50_000.0,
                Direction::Credit,
                today - Duration::days(2),
            )
            .narration("Development fund contribution"),
            today,
            &conn,
        )?;
    }

    println!("Disbursing loans...");

    let loans: [(usize, f64, i64); 4] = [
        (1, 10_000_000.0, 60),
        (2, 2_500_000.0, 45),
        (4, 5_000_000.0, 30),
        (5, 4_000_000.0, 40),
    ];
    for (index, principal, days_ago) in loans {
        if index < member_count {
            disburse_loan(
                members[index].id,
                principal,
                today - Duration::days(days_ago),
                "Loan disbursement",
                today,
                &conn,
            )?;
        }
    }

    let repayments: [(usize, f64, i64); 3] = [
        (1, 2_000_000.0, 21),
        (2, 500_000.0, 10),
        (5, 1_000_000.0, 12),
    ];
    for (index, amount, days_ago) in repayments {
        if index < member_count {
            record_repayment(
                members[index].id,
                amount,
                today - Duration::days(days_ago),
                "Loan repayment",
                today,
                &conn,
            )?;
        }
    }

    for (index, seed) in SEED_MEMBERS.iter().take(member_count).enumerate() {
        if !seed.active {
            let mut member = members[index].clone();
            member.status = MemberStatus::Inactive;
            update_member(&member, &conn)?;
        }
    }

    println!();
    println!(
        "{:<6} {:<18} {:>16} {:>16} {:>16}",
        "No.", "Member", "Savings", "Shares", "Loan"
    );
    for overview in get_member_overviews(None, &conn)? {
        println!(
            "{:<6} {:<18} {:>16} {:>16} {:>16}",
            overview.member_no,
            overview.full_name,
            format_ugx(overview.savings_balance),
            format_ugx(overview.shares_balance),
            format_ugx(overview.loan_balance),
        );
    }
    println!();

    let mismatches = find_balance_mismatches(&conn)?;

    if !mismatches.is_empty() {
        eprintln!("{} account(s) failed reconciliation: {mismatches:?}", mismatches.len());
        exit(1);
    }

    println!("All cached balances reconcile with the ledger.");
    println!("Success!");

    Ok(())
}

fn setup_logging() {
    let stdout_log = tracing_subscriber::fmt::layer().pretty();

    let log_file = OpenOptions::new()
        .create(true)
        .append(true)
        .open("debug.log")
        .expect("Could not create log file");

    let debug_log = tracing_subscriber::fmt::layer()
        .pretty()
        .with_writer(Arc::new(log_file));

    tracing_subscriber::registry()
        .with(
            stdout_log
                .with_filter(filter::LevelFilter::INFO)
                .and_then(debug_log)
                .with_filter(filter::LevelFilter::DEBUG),
        )
        .init();
}
