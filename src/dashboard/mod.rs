//! Dashboard module
//!
//! Provides the headline figures and the six-week collection trend shown on
//! the society's overview screen.

mod stats;
mod trend;

pub use stats::{DashboardStats, get_dashboard_stats};
pub use trend::weekly_trend;
