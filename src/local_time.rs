//! Converting sensor timestamps (UTC) to the display's local time.

use core::fmt::Write as _;

use heapless::String;
use time::{Date, Duration, Month, PrimitiveDateTime, Time};

/// Capacity of a formatted local time, `"YYYY-MM-DD HH:MM"`.
pub const LOCAL_TIME_LEN: usize = 16;

/// A local time as shown on the ticker, `"YYYY-MM-DD HH:MM"`.
pub type LocalTime = String<LOCAL_TIME_LEN>;

/// Indochina Time, UTC+7.
pub const UTC_PLUS_7: i16 = 7 * 60;

/// Shift a `"YYYY-MM-DD HH:MM:SS"` UTC timestamp by `offset_minutes` and format it to the minute.
///
/// Day, month, and year boundaries roll over. Returns `None` if the timestamp does not parse
/// or names an impossible date.
///
/// ```rust
/// use air_ticker::local_time::{UTC_PLUS_7, to_local};
///
/// let local = to_local("2024-12-31 20:05:09", UTC_PLUS_7).unwrap();
/// assert_eq!(local.as_str(), "2025-01-01 03:05");
/// ```
#[must_use]
pub fn to_local(timestamp: &str, offset_minutes: i16) -> Option<LocalTime> {
    let utc = parse_timestamp(timestamp)?;
    let local = utc.checked_add(Duration::minutes(i64::from(offset_minutes)))?;

    let mut text = LocalTime::new();
    write!(
        text,
        "{:04}-{:02}-{:02} {:02}:{:02}",
        local.year(),
        u8::from(local.month()),
        local.day(),
        local.hour(),
        local.minute()
    )
    .ok()?;
    Some(text)
}

fn parse_timestamp(timestamp: &str) -> Option<PrimitiveDateTime> {
    let (date, time) = timestamp.trim().split_once(' ')?;

    let mut date_parts = date.splitn(3, '-');
    let year = date_parts.next()?.parse().ok()?;
    let month = Month::try_from(date_parts.next()?.parse::<u8>().ok()?).ok()?;
    let day = date_parts.next()?.parse().ok()?;

    let mut time_parts = time.splitn(3, ':');
    let hour = time_parts.next()?.parse().ok()?;
    let minute = time_parts.next()?.parse().ok()?;
    let second = time_parts.next().map_or(Some(0), |second| second.parse().ok())?;

    Some(PrimitiveDateTime::new(
        Date::from_calendar_date(year, month, day).ok()?,
        Time::from_hms(hour, minute, second).ok()?,
    ))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn local(timestamp: &str) -> Option<LocalTime> {
        to_local(timestamp, UTC_PLUS_7)
    }

    #[test]
    fn same_day_shift() {
        assert_eq!(local("2025-02-16 03:11:56").as_deref(), Some("2025-02-16 10:11"));
    }

    #[test]
    fn rolls_over_day_month_and_year() {
        assert_eq!(local("2025-02-16 20:00:00").as_deref(), Some("2025-02-17 03:00"));
        assert_eq!(local("2025-01-31 17:00:00").as_deref(), Some("2025-02-01 00:00"));
        assert_eq!(local("2024-02-28 23:30:00").as_deref(), Some("2024-02-29 06:30"));
        assert_eq!(local("2024-12-31 23:59:59").as_deref(), Some("2025-01-01 06:59"));
    }

    #[test]
    fn negative_offsets_roll_back() {
        assert_eq!(
            to_local("2025-03-01 01:00:00", -120).as_deref(),
            Some("2025-02-28 23:00")
        );
    }

    #[test]
    fn rejects_malformed_timestamps() {
        assert_eq!(local("").as_deref(), None);
        assert_eq!(local("2025-02-16").as_deref(), None);
        assert_eq!(local("2025-13-01 00:00:00").as_deref(), None);
        assert_eq!(local("2025-02-30 00:00:00").as_deref(), None);
        assert_eq!(local("2025-02-16 24:00:00").as_deref(), None);
    }
}
