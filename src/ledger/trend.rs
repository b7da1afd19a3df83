//! Weekly trend aggregation for the dashboard chart.
//!
//! Buckets run on calendar weeks starting on Monday, oldest first, with the
//! newest bucket being the week containing "today". Collections are summed
//! from the postings that fall inside each bucket; the loan and cash figures
//! are the current totals repeated in every bucket, so the chart shows the
//! present position against historical collections rather than a
//! point-in-time replay.

use time::{Date, Duration};

use crate::ledger::types::Direction;

/// A dated ledger movement as consumed by the trend aggregation.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DatedPosting {
    /// The date the movement was posted.
    pub date: Date,
    /// The amount of money that moved. Always positive.
    pub amount: f64,
    /// Whether the money moved in or out.
    pub direction: Direction,
}

/// One week's bucket in the trend series.
#[derive(Debug, Clone, PartialEq)]
pub struct TrendPoint {
    /// The bucket label, `W1` for the oldest week through `W{n}` for the
    /// current week.
    pub label: String,
    /// The Monday the bucket's week starts on.
    pub week_start: Date,
    /// The sum of credit amounts posted inside the week.
    pub collections: f64,
    /// The current total outstanding loan balance.
    pub outstanding_loans: f64,
    /// The current cash position.
    pub cash_position: f64,
}

/// A fixed-length series of weekly trend buckets.
///
/// The series is evaluated lazily: [points](WeeklyTrend::points) returns an
/// iterator that computes each bucket on demand and can be called again to
/// restart from the first week.
#[derive(Debug, Clone)]
pub struct WeeklyTrend {
    first_monday: Date,
    week_count: usize,
    postings: Vec<DatedPosting>,
    outstanding_loans: f64,
    cash_position: f64,
}

impl WeeklyTrend {
    /// Create a trend series covering the `week_count` calendar weeks ending
    /// with the week that contains `today`.
    ///
    /// `postings` only need to cover that window; anything dated outside it
    /// is ignored. `outstanding_loans` and `cash_position` are the current
    /// totals to repeat in every bucket.
    pub fn new(
        today: Date,
        postings: Vec<DatedPosting>,
        outstanding_loans: f64,
        cash_position: f64,
        week_count: usize,
    ) -> Self {
        let first_monday = monday_of(today) - Duration::weeks(week_count as i64 - 1);

        Self {
            first_monday,
            week_count,
            postings,
            outstanding_loans,
            cash_position,
        }
    }

    /// The buckets, oldest week first.
    pub fn points(&self) -> impl Iterator<Item = TrendPoint> + '_ {
        (0..self.week_count).map(|index| {
            let week_start = self.first_monday + Duration::weeks(index as i64);
            let week_end = week_start + Duration::weeks(1);

            let collections = self
                .postings
                .iter()
                .filter(|posting| {
                    posting.direction == Direction::Credit
                        && posting.date >= week_start
                        && posting.date < week_end
                })
                .map(|posting| posting.amount)
                .sum();

            TrendPoint {
                label: format!("W{}", index + 1),
                week_start,
                collections,
                outstanding_loans: self.outstanding_loans,
                cash_position: self.cash_position,
            }
        })
    }

    /// The number of weekly buckets the series yields.
    pub fn week_count(&self) -> usize {
        self.week_count
    }
}

/// The Monday of the week containing `date`.
pub fn monday_of(date: Date) -> Date {
    date - Duration::days(date.weekday().number_days_from_monday() as i64)
}
