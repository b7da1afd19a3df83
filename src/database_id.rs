//! Database ID type definitions.

/// Alias for the integer type used for member row IDs.
pub type MemberId = i64;

/// Alias for the integer type used for account row IDs.
pub type AccountId = i64;

/// Alias for the integer type used for transaction row IDs.
pub type TransactionId = i64;
