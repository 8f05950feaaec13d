// 📅 Date Offset Converter - Day offsets from a fixed reference epoch
// All internal date comparison uses "days since 2000-01-01"

use crate::error::{PipelineError, Result};
use chrono::{Duration, Local, NaiveDate};
use log::warn;

// ============================================================================
// CONSTANTS
// ============================================================================

/// The spreadsheet serial value for the reference epoch, 2000-01-01.
/// The serial format counts from "January 0, 1900" and incorrectly treats
/// 1900 as a leap year; this constant bakes in both quirks.
pub const SERIAL_OFFSET_TO_REF: f64 = 36526.0;

/// Display format for dates in reports and output
pub const STANDARD_DATE_FORMAT: &str = "%Y-%m-%d";

/// Date token format optionally embedded in a source identifier
pub const SOURCE_ID_DATE_FORMAT: &str = "%Y%m%d";

/// The reference epoch all day offsets are measured from
pub fn ref_date() -> NaiveDate {
    NaiveDate::from_ymd_opt(2000, 1, 1).expect("valid reference date")
}

// ============================================================================
// CONVERSIONS
// ============================================================================

/// Days from the reference epoch to `date` (negative for earlier dates)
pub fn date_to_offset(date: NaiveDate) -> i64 {
    (date - ref_date()).num_days()
}

/// Day offset for the current processing date
pub fn today_offset() -> i64 {
    date_to_offset(Local::now().date_naive())
}

/// Convert a day offset back to a `YYYY-MM-DD` display date
pub fn offset_to_date(offset: i64) -> String {
    (ref_date() + Duration::days(offset))
        .format(STANDARD_DATE_FORMAT)
        .to_string()
}

/// Parse a `YYYY-MM-DD` boundary date into a day offset
pub fn parse_standard_date(value: &str) -> Result<i64> {
    NaiveDate::parse_from_str(value, STANDARD_DATE_FORMAT)
        .map(date_to_offset)
        .map_err(|_| {
            PipelineError::Format(format!("not a YYYY-MM-DD date: {}", value))
        })
}

/// Convert a raw log date value into a day offset.
///
/// Two representations are accepted:
/// * a numeric day-serial as produced by spreadsheet date storage
///   (e.g. `"43467.0"`)
/// * a dot-separated `M.D.YY` token, leading zeros optional
///   (e.g. `"1.2.19"`); the year is always interpreted as 20YY and
///   trailing text after the token is ignored
pub fn log_date_to_offset(value: &str) -> Result<i64> {
    let trimmed = value.trim();

    if let Some(date) = parse_log_date_token(trimmed) {
        return Ok(date_to_offset(date));
    }

    if let Ok(serial) = trimmed.parse::<f64>() {
        // Truncation toward negative infinity matches date arithmetic on
        // fractional serials.
        return Ok((serial - SERIAL_OFFSET_TO_REF).floor() as i64);
    }

    Err(PipelineError::Format(format!(
        "no log date found in {}",
        value
    )))
}

/// Match an `M.D.YY` token at the start of a string.
///
/// The month and day segments must be entirely 1-2 digits; the year
/// segment contributes its leading 1-2 digits and any remainder is
/// ignored. Returns None when the token shape or the resulting calendar
/// date is invalid.
fn parse_log_date_token(value: &str) -> Option<NaiveDate> {
    let mut parts = value.splitn(3, '.');
    let month = parse_two_digit_field(parts.next()?)?;
    let day = parse_two_digit_field(parts.next()?)?;
    let year = leading_two_digit_field(parts.next()?)?;

    NaiveDate::from_ymd_opt(2000 + year as i32, month, day)
}

/// A field of exactly 1-2 digits and nothing else
fn parse_two_digit_field(field: &str) -> Option<u32> {
    if field.is_empty() || field.len() > 2 || !field.chars().all(|c| c.is_ascii_digit()) {
        return None;
    }
    field.parse().ok()
}

/// The leading 1-2 digits of a field, trailing content ignored
fn leading_two_digit_field(field: &str) -> Option<u32> {
    let digits: String = field.chars().take_while(|c| c.is_ascii_digit()).take(2).collect();
    if digits.is_empty() {
        return None;
    }
    digits.parse().ok()
}

// ============================================================================
// VALIDITY CEILING
// ============================================================================

/// Find the latest day offset that should be considered valid for a run.
///
/// If a `YYYYMMDD` token is present in the source identifier we assume it
/// is the date the log was generated, so any entry dated past it cannot be
/// a real logging event. Without such a token, the current processing date
/// is the ceiling.
pub fn latest_valid_offset_for_source(source_id: &str) -> i64 {
    let offsets: Vec<i64> = source_id
        .split('.')
        .filter_map(|piece| {
            NaiveDate::parse_from_str(piece, SOURCE_ID_DATE_FORMAT)
                .ok()
                .map(date_to_offset)
        })
        .collect();

    if offsets.len() > 1 {
        warn!(
            "multiple date tokens found in source identifier {}: {:?}",
            source_id, offsets
        );
    }

    match offsets.iter().max() {
        Some(&max) => max,
        None => today_offset(),
    }
}

// ============================================================================
// TESTS
// ============================================================================

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_serial_at_epoch() {
        assert_eq!(log_date_to_offset("36526").unwrap(), 0);
        assert_eq!(log_date_to_offset("36526.0").unwrap(), 0);
        assert_eq!(log_date_to_offset("36527.0").unwrap(), 1);
    }

    #[test]
    fn test_text_token_at_epoch() {
        assert_eq!(log_date_to_offset("1.1.00").unwrap(), 0);
        assert_eq!(log_date_to_offset("1.2.00").unwrap(), 1);
        assert_eq!(log_date_to_offset("01.02.00").unwrap(), 1);
    }

    #[test]
    fn test_text_token_and_serial_agree() {
        // 2019-01-02 both ways
        let expected = date_to_offset(NaiveDate::from_ymd_opt(2019, 1, 2).unwrap());
        assert_eq!(log_date_to_offset("1.2.19").unwrap(), expected);

        let serial = SERIAL_OFFSET_TO_REF + expected as f64;
        assert_eq!(log_date_to_offset(&serial.to_string()).unwrap(), expected);
    }

    #[test]
    fn test_text_token_trailing_ignored() {
        assert_eq!(
            log_date_to_offset("1.2.00 late").unwrap(),
            log_date_to_offset("1.2.00").unwrap()
        );
    }

    #[test]
    fn test_year_always_two_thousands() {
        // "99" is 2099, not 1999
        let expected = date_to_offset(NaiveDate::from_ymd_opt(2099, 12, 31).unwrap());
        assert_eq!(log_date_to_offset("12.31.99").unwrap(), expected);
    }

    #[test]
    fn test_format_error_on_garbage() {
        assert!(matches!(
            log_date_to_offset("TOWED"),
            Err(PipelineError::Format(_))
        ));
        assert!(matches!(
            log_date_to_offset("123.4.19"),
            Err(PipelineError::Format(_))
        ));
        // Month 13 is not a calendar date
        assert!(matches!(
            log_date_to_offset("13.1.19"),
            Err(PipelineError::Format(_))
        ));
    }

    #[test]
    fn test_offset_round_trip() {
        for text in ["1.1.00", "2.29.16", "12.31.25"] {
            let offset = log_date_to_offset(text).unwrap();
            let display = offset_to_date(offset);
            assert_eq!(parse_standard_date(&display).unwrap(), offset);
        }
    }

    #[test]
    fn test_serial_round_trip() {
        for serial in [36526.0, 42370.0, 44196.0] {
            let offset = log_date_to_offset(&serial.to_string()).unwrap();
            let display = offset_to_date(offset);
            assert_eq!(parse_standard_date(&display).unwrap(), offset);
        }
    }

    #[test]
    fn test_parse_standard_date_rejects_log_format() {
        assert!(parse_standard_date("1.2.19").is_err());
    }

    #[test]
    fn test_ceiling_from_source_identifier() {
        let expected = date_to_offset(NaiveDate::from_ymd_opt(2018, 3, 4).unwrap());
        assert_eq!(
            latest_valid_offset_for_source("ParkingLog.20180304.xlsx"),
            expected
        );
    }

    #[test]
    fn test_ceiling_takes_latest_of_multiple_tokens() {
        let expected = date_to_offset(NaiveDate::from_ymd_opt(2018, 6, 1).unwrap());
        assert_eq!(
            latest_valid_offset_for_source("log.20180304.20180601.xlsx"),
            expected
        );
    }

    #[test]
    fn test_ceiling_defaults_to_today() {
        assert_eq!(
            latest_valid_offset_for_source("ParkingLog.xlsx"),
            today_offset()
        );
    }
}
