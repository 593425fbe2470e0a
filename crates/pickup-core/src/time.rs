use chrono::{DateTime, FixedOffset, Local, NaiveDate, Offset, Utc};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum TimeParseError {
    #[error("date cannot be empty")]
    Empty,
    #[error("invalid date format: expected YYYY-MM-DD")]
    InvalidDateFormat,
    #[error("invalid utc offset: {0} minutes")]
    InvalidOffset(i32),
}

pub fn now_utc() -> i64 {
    Utc::now().timestamp()
}

pub fn local_offset() -> FixedOffset {
    Local::now().offset().fix()
}

pub fn offset_from_minutes(minutes: i32) -> Result<FixedOffset, TimeParseError> {
    minutes
        .checked_mul(60)
        .and_then(FixedOffset::east_opt)
        .ok_or(TimeParseError::InvalidOffset(minutes))
}

pub fn parse_date(input: &str) -> Result<NaiveDate, TimeParseError> {
    let trimmed = input.trim();
    if trimmed.is_empty() {
        return Err(TimeParseError::Empty);
    }
    NaiveDate::parse_from_str(trimmed, "%Y-%m-%d").map_err(|_| TimeParseError::InvalidDateFormat)
}

/// Calendar date of `now_utc` as seen in `offset`.
pub fn today_in(now_utc: i64, offset: FixedOffset) -> NaiveDate {
    DateTime::<Utc>::from_timestamp(now_utc, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
        .date_naive()
}

pub fn format_timestamp_datetime(ts: i64, offset: FixedOffset) -> String {
    DateTime::<Utc>::from_timestamp(ts, 0)
        .unwrap_or_default()
        .with_timezone(&offset)
        .format("%Y-%m-%d %H:%M")
        .to_string()
}

#[cfg(test)]
mod tests {
    use super::{format_timestamp_datetime, offset_from_minutes, parse_date, today_in, TimeParseError};
    use chrono::{NaiveDate, TimeZone, Utc};

    #[test]
    fn parse_date_accepts_iso() {
        assert_eq!(
            parse_date(" 2024-10-20 ").unwrap(),
            NaiveDate::from_ymd_opt(2024, 10, 20).unwrap()
        );
    }

    #[test]
    fn parse_date_rejects_other_formats() {
        assert!(matches!(parse_date(""), Err(TimeParseError::Empty)));
        assert!(parse_date("20/10/2024").is_err());
        assert!(parse_date("2024-02-30").is_err());
    }

    #[test]
    fn today_respects_offset() {
        let now = Utc
            .with_ymd_and_hms(2030, 1, 15, 20, 0, 0)
            .unwrap()
            .timestamp();
        let utc = offset_from_minutes(0).unwrap();
        let colombo = offset_from_minutes(330).unwrap();
        assert_eq!(today_in(now, utc), NaiveDate::from_ymd_opt(2030, 1, 15).unwrap());
        assert_eq!(
            today_in(now, colombo),
            NaiveDate::from_ymd_opt(2030, 1, 16).unwrap()
        );
        assert_eq!(format_timestamp_datetime(now, colombo), "2030-01-16 01:30");
    }

    #[test]
    fn offset_out_of_range() {
        assert!(offset_from_minutes(24 * 60).is_err());
    }
}
