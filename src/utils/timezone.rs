use chrono::{DateTime, NaiveTime, TimeZone};
use chrono_tz::Tz;

/// Error types for timezone operations
#[derive(Debug, PartialEq, Eq)]
pub enum TimezoneError {
    InvalidTimezone(String),
    InvalidTime(String),
}

impl std::fmt::Display for TimezoneError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TimezoneError::InvalidTimezone(tz) => write!(f, "Invalid timezone: {}", tz),
            TimezoneError::InvalidTime(msg) => write!(f, "Invalid time format: {}", msg),
        }
    }
}

impl std::error::Error for TimezoneError {}

/// Parse an IANA timezone name
pub fn parse_timezone(tz_str: &str) -> Result<Tz, TimezoneError> {
    tz_str
        .trim()
        .parse()
        .map_err(|_| TimezoneError::InvalidTimezone(tz_str.to_string()))
}

/// Parse a prayer time as returned by the timings API.
///
/// Accepts `HH:MM` followed by optional annotations such as ` (+03)`.
pub fn parse_time_string(time_str: &str) -> Result<NaiveTime, TimezoneError> {
    let clock = time_str.split_whitespace().next().unwrap_or_default();
    NaiveTime::parse_from_str(clock, "%H:%M")
        .map_err(|_| TimezoneError::InvalidTime(format!("Expected HH:MM format, got '{}'", time_str)))
}

/// Format a time the way prayer timings are compared (`HH:MM`)
pub fn format_clock<T: TimeZone>(time: &DateTime<T>) -> String
where
    T::Offset: std::fmt::Display,
{
    time.format("%H:%M").to_string()
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    #[test]
    fn test_parse_time_string() {
        assert_eq!(
            parse_time_string("05:12"),
            Ok(NaiveTime::from_hms_opt(5, 12, 0).unwrap())
        );
        assert_eq!(
            parse_time_string("18:03 (+03)"),
            Ok(NaiveTime::from_hms_opt(18, 3, 0).unwrap())
        );
        assert!(parse_time_string("invalid").is_err());
        assert!(parse_time_string("").is_err());
    }

    #[test]
    fn test_parse_timezone() {
        assert!(parse_timezone("UTC").is_ok());
        assert!(parse_timezone(" Asia/Riyadh ").is_ok());
        assert!(parse_timezone("Invalid/Timezone").is_err());
    }

    #[test]
    fn test_format_clock_uses_zone() {
        let utc = Utc.with_ymd_and_hms(2026, 3, 1, 2, 12, 45).unwrap();
        let riyadh = utc.with_timezone(&chrono_tz::Asia::Riyadh);
        assert_eq!(format_clock(&utc), "02:12");
        assert_eq!(format_clock(&riyadh), "05:12");
    }
}
