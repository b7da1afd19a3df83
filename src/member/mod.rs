//! The member registry.
//!
//! This module contains everything related to members:
//! - The `Member` model and `MemberBuilder` for registering members
//! - Database functions for storing and updating members
//! - Listing, search and portfolio queries over the registry

mod core;
mod query;

pub use core::{
    Member, MemberBuilder, MemberStatus, create_member, get_member, get_members, update_member,
};
pub use query::{
    MemberOverview, RegistryStats, get_member_overviews, member_portfolio, registry_stats,
};

pub(crate) use core::create_member_table;
