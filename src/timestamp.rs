//! Conversion between ctime(3) text and classic Mac OS timestamps
//!
//! Mac OS counts seconds from midnight, January 1, 1904, in local time.
//! hmount reports volume dates as ctime strings such as
//! `Mon Jan  1 12:00:00 1996`, which carry no zone either, so both sides are
//! treated as naive local times.

use chrono::{Duration, NaiveDate, NaiveDateTime};

const CTIME_FORMAT: &str = "%a %b %e %H:%M:%S %Y";

/// Midnight, January 1, 1904
pub fn mac_epoch() -> NaiveDateTime {
    NaiveDate::from_ymd_opt(1904, 1, 1)
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .unwrap_or_default()
}

/// Parse a ctime string
pub fn parse_ctime(text: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(text.trim(), CTIME_FORMAT).ok()
}

/// Convert a ctime string into seconds since the Mac epoch
pub fn ctime_to_mac_timestamp(text: &str) -> Option<i64> {
    parse_ctime(text).map(|dt| (dt - mac_epoch()).num_seconds())
}

/// Convert seconds since the Mac epoch back into a date and time
pub fn mac_timestamp_to_datetime(timestamp: i64) -> Option<NaiveDateTime> {
    mac_epoch().checked_add_signed(Duration::try_seconds(timestamp)?)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_epoch_is_zero() {
        assert_eq!(ctime_to_mac_timestamp("Fri Jan  1 00:00:00 1904"), Some(0));
    }

    #[test]
    fn test_known_timestamp() {
        // 2001-01-01 is 97 years after 1904, 25 of them leap years
        let days = 97 * 365 + 25;
        assert_eq!(
            ctime_to_mac_timestamp("Mon Jan  1 00:00:00 2001"),
            Some(days * 86400)
        );
        assert_eq!(
            ctime_to_mac_timestamp("Mon Jan  1 12:30:15 2001"),
            Some(days * 86400 + 12 * 3600 + 30 * 60 + 15)
        );
    }

    #[test]
    fn test_two_digit_day() {
        let dt = parse_ctime("Thu Mar 14 09:05:00 1996").unwrap();
        assert_eq!(dt.format("%Y-%m-%d %H:%M").to_string(), "1996-03-14 09:05");
    }

    #[test]
    fn test_round_trip() {
        let ts = ctime_to_mac_timestamp("Thu Mar 14 09:05:00 1996").unwrap();
        let dt = mac_timestamp_to_datetime(ts).unwrap();
        assert_eq!(Some(dt), parse_ctime("Thu Mar 14 09:05:00 1996"));
    }

    #[test]
    fn test_garbage() {
        assert_eq!(ctime_to_mac_timestamp("yesterday"), None);
    }
}
