//! Defines the core data model and database queries for members.

use std::{fmt::Display, str::FromStr};

use rusqlite::{
    Connection, Row,
    types::{FromSql, FromSqlError, FromSqlResult, ToSql, ToSqlOutput, ValueRef},
};
use time::Date;

use crate::{Error, database_id::MemberId};

// ============================================================================
// MODELS
// ============================================================================

/// The membership lifecycle state.
///
/// Members are never hard-deleted; leaving the cooperative or being
/// disciplined is recorded as a status change so the ledger history stays
/// attributable.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MemberStatus {
    /// In good standing, may transact.
    Active,
    /// Left the cooperative, history retained.
    Inactive,
    /// Temporarily barred from transacting.
    Suspended,
}

impl MemberStatus {
    /// The string form stored in the database.
    pub fn as_str(&self) -> &'static str {
        match self {
            MemberStatus::Active => "active",
            MemberStatus::Inactive => "inactive",
            MemberStatus::Suspended => "suspended",
        }
    }
}

impl FromStr for MemberStatus {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "active" => Ok(MemberStatus::Active),
            "inactive" => Ok(MemberStatus::Inactive),
            "suspended" => Ok(MemberStatus::Suspended),
            _ => Err(Error::InvalidMemberStatus(s.to_string())),
        }
    }
}

impl Display for MemberStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl ToSql for MemberStatus {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(self.as_str().into())
    }
}

impl FromSql for MemberStatus {
    fn column_result(value: ValueRef<'_>) -> FromSqlResult<Self> {
        value
            .as_str()?
            .parse()
            .map_err(|error| FromSqlError::Other(Box::new(error)))
    }
}

/// A registered member of the cooperative.
///
/// To create a new `Member`, use [Member::build].
#[derive(Debug, Clone, PartialEq)]
pub struct Member {
    /// The ID of the member.
    pub id: MemberId,
    /// The human-readable member number, e.g. `M007`. Assigned on creation
    /// and never changed.
    pub member_no: String,
    /// The member's first name.
    pub first_name: String,
    /// The member's last name.
    pub last_name: String,
    /// A contact phone number.
    pub phone: String,
    /// An optional contact email address.
    pub email: Option<String>,
    /// An optional national ID number.
    pub national_id: Option<String>,
    /// An optional physical address.
    pub address: Option<String>,
    /// The membership lifecycle state.
    pub status: MemberStatus,
    /// The date the member joined the cooperative.
    pub joined_date: Date,
}

impl Member {
    /// Create a new member.
    ///
    /// Shortcut for [MemberBuilder] for discoverability.
    pub fn build(first_name: &str, last_name: &str, phone: &str) -> MemberBuilder {
        MemberBuilder {
            first_name: first_name.to_owned(),
            last_name: last_name.to_owned(),
            phone: phone.to_owned(),
            email: None,
            national_id: None,
            address: None,
            joined_date: None,
        }
    }

    /// The member's full name as shown in lists and statements.
    pub fn full_name(&self) -> String {
        format!("{} {}", self.first_name, self.last_name)
    }
}

/// A builder for creating [Member] records.
///
/// Required fields are taken by [Member::build]; contact details and the
/// joined date can be filled in before calling
/// [create_member].
#[derive(Debug, Clone, PartialEq)]
pub struct MemberBuilder {
    /// The member's first name.
    pub first_name: String,
    /// The member's last name.
    pub last_name: String,
    /// A contact phone number.
    pub phone: String,
    /// An optional contact email address.
    pub email: Option<String>,
    /// An optional national ID number.
    pub national_id: Option<String>,
    /// An optional physical address.
    pub address: Option<String>,
    /// The date the member joined. Defaults to today if not set.
    pub joined_date: Option<Date>,
}

impl MemberBuilder {
    /// Set the email address for the member.
    pub fn email(mut self, email: &str) -> Self {
        self.email = Some(email.to_owned());
        self
    }

    /// Set the national ID number for the member.
    pub fn national_id(mut self, national_id: &str) -> Self {
        self.national_id = Some(national_id.to_owned());
        self
    }

    /// Set the physical address for the member.
    pub fn address(mut self, address: &str) -> Self {
        self.address = Some(address.to_owned());
        self
    }

    /// Set the date the member joined the cooperative.
    pub fn joined_date(mut self, joined_date: Date) -> Self {
        self.joined_date = Some(joined_date);
        self
    }
}

// ============================================================================
// DATABASE FUNCTIONS
// ============================================================================

pub(crate) fn create_member_table(connection: &Connection) -> Result<(), rusqlite::Error> {
    connection.execute(
        "CREATE TABLE IF NOT EXISTS member (
            id INTEGER PRIMARY KEY,
            member_no TEXT UNIQUE NOT NULL,
            first_name TEXT NOT NULL,
            last_name TEXT NOT NULL,
            phone TEXT NOT NULL,
            email TEXT,
            national_id TEXT,
            address TEXT,
            status TEXT NOT NULL,
            joined_date TEXT NOT NULL
        )",
        (),
    )?;

    Ok(())
}

pub(crate) fn map_member_row(row: &Row) -> Result<Member, rusqlite::Error> {
    let id = row.get(0)?;
    let member_no = row.get(1)?;
    let first_name = row.get(2)?;
    let last_name = row.get(3)?;
    let phone = row.get(4)?;
    let email = row.get(5)?;
    let national_id = row.get(6)?;
    let address = row.get(7)?;
    let status = row.get(8)?;
    let joined_date = row.get(9)?;

    Ok(Member {
        id,
        member_no,
        first_name,
        last_name,
        phone,
        email,
        national_id,
        address,
        status,
        joined_date,
    })
}

/// Register a new member.
///
/// The member number is assigned by this function, `M001` for the first
/// member and counting up from there. New members start out active. The
/// joined date defaults to `today` when the builder does not set one.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyMemberName] if either name is empty after trimming,
/// - or [Error::EmptyPhoneNumber] if the phone number is empty after trimming,
/// - or [Error::FutureDate] if the joined date is after `today`,
/// - or [Error::DuplicateMemberNo] if another writer took the next member
///   number first,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn create_member(
    builder: MemberBuilder,
    today: Date,
    connection: &Connection,
) -> Result<Member, Error> {
    let first_name = builder.first_name.trim();
    let last_name = builder.last_name.trim();

    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::EmptyMemberName);
    }

    let phone = builder.phone.trim();

    if phone.is_empty() {
        return Err(Error::EmptyPhoneNumber);
    }

    let joined_date = builder.joined_date.unwrap_or(today);

    if joined_date > today {
        return Err(Error::FutureDate(joined_date));
    }

    let member_no = next_member_no(connection)?;

    let member = connection
        .prepare(
            "INSERT INTO member
                (member_no, first_name, last_name, phone, email, national_id, address, status, joined_date)
             VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
             RETURNING id, member_no, first_name, last_name, phone, email, national_id, address, status, joined_date",
        )?
        .query_row(
            (
                &member_no,
                first_name,
                last_name,
                phone,
                &builder.email,
                &builder.national_id,
                &builder.address,
                MemberStatus::Active,
                joined_date,
            ),
            map_member_row,
        )
        .map_err(|error| match error {
            rusqlite::Error::SqliteFailure(
                rusqlite::ffi::Error {
                    code: _,
                    extended_code: rusqlite::ffi::SQLITE_CONSTRAINT_UNIQUE,
                },
                _,
            ) => Error::DuplicateMemberNo(member_no.clone()),
            error => error.into(),
        })?;

    Ok(member)
}

/// The member number the next registration will receive.
///
/// Member numbers follow the row IDs, which is safe because members are never
/// hard-deleted.
fn next_member_no(connection: &Connection) -> Result<String, Error> {
    let next_id: i64 =
        connection.query_row("SELECT COALESCE(MAX(id), 0) + 1 FROM member", [], |row| {
            row.get(0)
        })?;

    Ok(format!("M{next_id:03}"))
}

/// Retrieve a member from the database by their `id`.
///
/// # Errors
/// This function will return a:
/// - [Error::NotFound] if `id` does not refer to a registered member,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn get_member(id: MemberId, connection: &Connection) -> Result<Member, Error> {
    let member = connection
        .prepare(
            "SELECT id, member_no, first_name, last_name, phone, email, national_id, address, status, joined_date
             FROM member WHERE id = :id",
        )?
        .query_one(&[(":id", &id)], map_member_row)?;

    Ok(member)
}

/// Retrieve all members, ordered by member number.
///
/// # Errors
/// This function will return a [Error::SqlError] if there is an SQL error.
pub fn get_members(connection: &Connection) -> Result<Vec<Member>, Error> {
    connection
        .prepare(
            "SELECT id, member_no, first_name, last_name, phone, email, national_id, address, status, joined_date
             FROM member ORDER BY member_no",
        )?
        .query_map([], map_member_row)?
        .map(|maybe_member| maybe_member.map_err(|error| error.into()))
        .collect()
}

/// Update a member's names, contact details and status.
///
/// The member number and joined date are facts of registration and cannot be
/// changed.
///
/// # Errors
/// This function will return a:
/// - [Error::EmptyMemberName] if either name is empty after trimming,
/// - or [Error::EmptyPhoneNumber] if the phone number is empty after trimming,
/// - or [Error::NotFound] if the member does not exist in the database,
/// - or [Error::SqlError] if there is some other SQL error.
pub fn update_member(member: &Member, connection: &Connection) -> Result<(), Error> {
    let first_name = member.first_name.trim();
    let last_name = member.last_name.trim();

    if first_name.is_empty() || last_name.is_empty() {
        return Err(Error::EmptyMemberName);
    }

    let phone = member.phone.trim();

    if phone.is_empty() {
        return Err(Error::EmptyPhoneNumber);
    }

    let rows_updated = connection.execute(
        "UPDATE member
         SET first_name = ?1, last_name = ?2, phone = ?3, email = ?4, national_id = ?5,
             address = ?6, status = ?7
         WHERE id = ?8",
        (
            first_name,
            last_name,
            phone,
            &member.email,
            &member.national_id,
            &member.address,
            member.status,
            member.id,
        ),
    )?;

    if rows_updated == 0 {
        return Err(Error::NotFound);
    }

    Ok(())
}

// ============================================================================
// TESTS
// ============================================================================
