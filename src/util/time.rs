use chrono::{DateTime, NaiveDate, Utc};

pub struct DateTimeUtils;

impl DateTimeUtils {
    /// Parses an ISO-8601 / RFC 3339 instant, normalized to UTC.
    pub fn parse_instant(value: &str) -> Option<DateTime<Utc>> {
        DateTime::parse_from_rfc3339(value)
            .map(|dt| dt.with_timezone(&Utc))
            .ok()
    }

    /// Strict YYYY-MM-DD. chrono accepts unpadded fields, so the shape
    /// is checked before parsing.
    pub fn parse_day(value: &str) -> Option<NaiveDate> {
        if value.len() != 10 {
            return None;
        }

        NaiveDate::parse_from_str(value, "%Y-%m-%d").ok()
    }

    /// Half-open UTC instant window covering one calendar day:
    /// [00:00:00 of `day`, 00:00:00 of the next day).
    pub fn day_bounds(day: NaiveDate) -> (DateTime<Utc>, DateTime<Utc>) {
        let start = day.and_hms_opt(0, 0, 0).unwrap().and_utc();
        let end = (day + chrono::Duration::days(1))
            .and_hms_opt(0, 0, 0)
            .unwrap()
            .and_utc();

        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;

    #[test]
    fn parses_rfc3339_with_offset_to_utc() {
        let dt = DateTimeUtils::parse_instant("2024-05-01T10:30:00-05:00").unwrap();
        assert_eq!(dt, Utc.with_ymd_and_hms(2024, 5, 1, 15, 30, 0).unwrap());
    }

    #[test]
    fn parses_subsecond_precision() {
        let dt = DateTimeUtils::parse_instant("2024-05-01T10:30:00.250Z").unwrap();
        assert_eq!(dt.timestamp_subsec_millis(), 250);
    }

    #[test]
    fn rejects_non_instant_strings() {
        assert!(DateTimeUtils::parse_instant("2024-05-01").is_none());
        assert!(DateTimeUtils::parse_instant("yesterday").is_none());
    }

    #[test]
    fn parses_strict_calendar_day() {
        assert_eq!(
            DateTimeUtils::parse_day("2024-05-01"),
            NaiveDate::from_ymd_opt(2024, 5, 1)
        );
        assert!(DateTimeUtils::parse_day("2024-5-1").is_none());
        assert!(DateTimeUtils::parse_day("01-05-2024").is_none());
    }

    #[test]
    fn day_bounds_cover_exactly_one_day() {
        let day = NaiveDate::from_ymd_opt(2024, 12, 31).unwrap();
        let (start, end) = DateTimeUtils::day_bounds(day);

        assert_eq!(start, Utc.with_ymd_and_hms(2024, 12, 31, 0, 0, 0).unwrap());
        assert_eq!(end, Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap());
    }
}
