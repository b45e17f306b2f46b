//! Windows FILETIME conversion.
//!
//! Instruments write timestamps as the number of 100 ns ticks since
//! 1601-01-01 UTC.

use chrono::{DateTime, Utc};

/// FILETIME value of the Unix epoch (1970-01-01 UTC)
pub const UNIX_EPOCH_FILETIME: u64 = 116_444_736_000_000_000;

/// FILETIME ticks per second
pub const TICKS_PER_SECOND: u64 = 10_000_000;

/// Convert a FILETIME to a UTC datetime.
///
/// Returns `None` when the value lies outside the range chrono can represent.
pub fn to_datetime(filetime: u64) -> Option<DateTime<Utc>> {
    let since_epoch = i128::from(filetime) - i128::from(UNIX_EPOCH_FILETIME);
    let ticks = i128::from(TICKS_PER_SECOND);
    let secs = i64::try_from(since_epoch.div_euclid(ticks)).ok()?;
    let nanos = u32::try_from(since_epoch.rem_euclid(ticks) * 100).ok()?;
    DateTime::from_timestamp(secs, nanos)
}

/// Convert a UTC datetime to a FILETIME, truncating to 100 ns.
///
/// Returns `None` for datetimes before 1601-01-01.
pub fn from_datetime(datetime: &DateTime<Utc>) -> Option<u64> {
    let ticks = i128::from(datetime.timestamp()) * i128::from(TICKS_PER_SECOND)
        + i128::from(datetime.timestamp_subsec_nanos() / 100)
        + i128::from(UNIX_EPOCH_FILETIME);
    u64::try_from(ticks).ok()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn test_unix_epoch() {
        let epoch = to_datetime(UNIX_EPOCH_FILETIME).unwrap();
        assert_eq!(epoch.timestamp(), 0);
    }

    #[test]
    fn test_filetime_roundtrip() {
        let time = Utc.with_ymd_and_hms(2023, 6, 14, 9, 30, 12).unwrap();
        let filetime = from_datetime(&time).unwrap();
        assert_eq!(to_datetime(filetime).unwrap(), time);
    }

    #[test]
    fn test_before_unix_epoch() {
        let time = Utc.with_ymd_and_hms(1900, 1, 1, 0, 0, 0).unwrap();
        let filetime = from_datetime(&time).unwrap();
        assert!(filetime < UNIX_EPOCH_FILETIME);
        assert_eq!(to_datetime(filetime).unwrap(), time);
    }

    #[test]
    fn test_before_filetime_origin() {
        let time = Utc.with_ymd_and_hms(1500, 1, 1, 0, 0, 0).unwrap();
        assert_eq!(from_datetime(&time), None);
    }
}
