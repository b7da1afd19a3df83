//! Local time handling for the cooperative's working day.
//!
//! Posting dates and "this month"/"this week" windows are anchored to the
//! cooperative's canonical timezone, not the server's.

use time::{Date, OffsetDateTime, UtcOffset};
use time_tz::{Offset, TimeZone};

use crate::Error;

/// The timezone used when none is configured.
pub const DEFAULT_TIMEZONE: &str = "Africa/Kampala";

/// Look up the current UTC offset for a canonical timezone name, e.g.
/// `Africa/Kampala`.
pub fn get_local_offset(canonical_timezone: &str) -> Option<UtcOffset> {
    time_tz::timezones::get_by_name(canonical_timezone)
        .map(|tz| tz.get_offset_utc(&OffsetDateTime::now_utc()).to_utc())
}

/// Today's date in the given canonical timezone.
///
/// # Errors
/// Returns [Error::InvalidTimezone] when the timezone name is not a known
/// canonical timezone.
pub fn local_today(canonical_timezone: &str) -> Result<Date, Error> {
    let offset = get_local_offset(canonical_timezone)
        .ok_or_else(|| Error::InvalidTimezone(canonical_timezone.to_string()))?;

    Ok(OffsetDateTime::now_utc().to_offset(offset).date())
}

#[cfg(test)]
mod local_today_tests {
    use super::{DEFAULT_TIMEZONE, local_today};
    use crate::Error;

    #[test]
    fn resolves_the_default_timezone() {
        let got = local_today(DEFAULT_TIMEZONE);

        assert!(got.is_ok());
    }

    #[test]
    fn rejects_an_unknown_timezone() {
        let got = local_today("Not/AZone");

        assert_eq!(Err(Error::InvalidTimezone("Not/AZone".to_string())), got);
    }
}
