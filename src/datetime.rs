//! ISO-8601-like date-time parsing
//!
//! A single left-to-right scan over the input bytes drives an explicit
//! state machine. The accepted grammar is looser than ISO 8601: calendar
//! fields are never range-checked, anything after `Z` is ignored, and the
//! offset digits on both sides of the colon are read as one `HHMM` number.

use crate::error::{PrimError, Result};
use crate::logging::{self, LogLevel};
use crate::uint64::Uint64;
use chrono::{DateTime, TimeZone, Utc};
use serde::Serialize;

// ============================================================================
// Epoch Constants
// ============================================================================

/// Seconds between 1601-01-01 and 1970-01-01
pub const NT_EPOCH_OFFSET_SECS: u64 = 11_644_473_600;

/// NT time is counted in 100-nanosecond ticks
pub const TICKS_PER_SECOND: u64 = 10_000_000;

pub const NANOS_PER_TICK: u32 = 100;

const FRACTION_DIGITS: u32 = 9;

/// Julian day number of 1970-01-01 in the March-based day count
const UNIX_EPOCH_DAY: f64 = 719_591.0;

// ============================================================================
// Epoch Timestamp
// ============================================================================

/// Seconds and nanoseconds since 1970-01-01T00:00:00Z
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
pub struct EpochTimestamp {
    pub seconds: u64,
    pub nanoseconds: u32,
}

impl EpochTimestamp {
    pub const UNIX_EPOCH: EpochTimestamp = EpochTimestamp {
        seconds: 0,
        nanoseconds: 0,
    };

    pub fn new(seconds: u64, nanoseconds: u32) -> Self {
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Convert to 100-nanosecond ticks since 1601 (wraps for far-future seconds)
    pub fn to_nt_time(self) -> Uint64 {
        Uint64::new(self.seconds)
            .add(NT_EPOCH_OFFSET_SECS)
            .mul(TICKS_PER_SECOND)
            .add(self.nanoseconds / NANOS_PER_TICK)
    }

    /// Inverse of [`EpochTimestamp::to_nt_time`], at tick resolution
    pub fn from_nt_time(ticks: Uint64) -> Self {
        let ticks = ticks.get();
        let seconds = (ticks / TICKS_PER_SECOND).wrapping_sub(NT_EPOCH_OFFSET_SECS);
        let nanoseconds = (ticks % TICKS_PER_SECOND) as u32 * NANOS_PER_TICK;
        Self {
            seconds,
            nanoseconds,
        }
    }

    /// Convert to a chrono DateTime, if the seconds fit chrono's range
    pub fn to_datetime(self) -> Option<DateTime<Utc>> {
        let seconds = i64::try_from(self.seconds).ok()?;
        Utc.timestamp_opt(seconds, self.nanoseconds).single()
    }
}

// ============================================================================
// Scanner
// ============================================================================

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ScanState {
    Year,
    Month,
    Day,
    Hour,
    Minute,
    Second,
    Fraction,
    Zulu,
    Offset,
    OffsetMinutes,
    Reject,
}

/// Calendar fields exactly as they appeared in the text
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParsedDateTime {
    pub year: i64,
    pub month: i64,
    pub day: i64,
    pub hour: i64,
    pub minute: i64,
    pub second: i64,
    /// Fraction of a second, 0..=999_999_999
    pub nanoseconds: u32,
    /// Signed UTC offset of the local time, east positive
    pub offset_seconds: i64,
}

#[inline]
fn push_digit(acc: &mut i64, c: u8) {
    *acc = acc.wrapping_mul(10).wrapping_add((c - b'0') as i64);
}

impl ParsedDateTime {
    /// Run the state machine over `text`
    pub fn scan(text: &str) -> Result<Self> {
        let mut parsed = Self::default();
        let mut fraction: u32 = 0;
        let mut fraction_digits: u32 = 0;
        let mut offset: i64 = 0;
        let mut offset_negative = false;

        let mut state = ScanState::Year;
        for (pos, &c) in text.as_bytes().iter().enumerate() {
            let digit = c.is_ascii_digit();
            state = match state {
                ScanState::Year if c == b'-' => ScanState::Month,
                ScanState::Year if digit => {
                    push_digit(&mut parsed.year, c);
                    state
                }
                ScanState::Month if c == b'-' => ScanState::Day,
                ScanState::Month if digit => {
                    push_digit(&mut parsed.month, c);
                    state
                }
                ScanState::Day if c == b'T' || c == b' ' => ScanState::Hour,
                ScanState::Day if digit => {
                    push_digit(&mut parsed.day, c);
                    state
                }
                ScanState::Hour if c == b':' => ScanState::Minute,
                ScanState::Hour if digit => {
                    push_digit(&mut parsed.hour, c);
                    state
                }
                ScanState::Minute if c == b':' => ScanState::Second,
                ScanState::Minute if digit => {
                    push_digit(&mut parsed.minute, c);
                    state
                }
                ScanState::Second if c == b'.' => ScanState::Fraction,
                ScanState::Second if digit => {
                    push_digit(&mut parsed.second, c);
                    state
                }
                ScanState::Second | ScanState::Fraction if c == b'Z' => ScanState::Zulu,
                ScanState::Second | ScanState::Fraction if c == b'+' => ScanState::Offset,
                ScanState::Second | ScanState::Fraction if c == b'-' => {
                    offset_negative = true;
                    ScanState::Offset
                }
                ScanState::Fraction if digit => {
                    // Digits past nanosecond resolution are dropped
                    if fraction_digits < FRACTION_DIGITS {
                        fraction = fraction * 10 + (c - b'0') as u32;
                        fraction_digits += 1;
                    }
                    state
                }
                ScanState::Offset if c == b':' => ScanState::OffsetMinutes,
                ScanState::Offset | ScanState::OffsetMinutes if digit => {
                    push_digit(&mut offset, c);
                    state
                }
                _ => ScanState::Reject,
            };

            if state == ScanState::Zulu {
                break;
            }
            if state == ScanState::Reject {
                if logging::enabled(LogLevel::Debug) {
                    logging::debug(
                        "DATETIME",
                        &format!("rejected byte 0x{:02x} at position {}", c, pos),
                    );
                }
                return Err(PrimError::Parse);
            }
        }

        parsed.nanoseconds = fraction * 10u32.pow(FRACTION_DIGITS - fraction_digits);

        let offset_seconds = (offset / 100)
            .wrapping_mul(3600)
            .wrapping_add((offset % 100) * 60);
        parsed.offset_seconds = if offset_negative {
            offset_seconds.wrapping_neg()
        } else {
            offset_seconds
        };

        Ok(parsed)
    }

    /// Seconds since the Unix epoch in UTC, wrapping when the offset
    /// exceeds the local epoch value
    pub fn to_epoch(&self) -> EpochTimestamp {
        let local = encode_unix_time(
            self.year,
            self.month,
            self.day,
            self.hour,
            self.minute,
            self.second,
        );
        EpochTimestamp {
            seconds: local.wrapping_sub(self.offset_seconds as u64),
            nanoseconds: self.nanoseconds,
        }
    }
}

/// Seconds since the Unix epoch for a proleptic Gregorian date and time.
///
/// Months are shifted so the computed year starts in March; January and
/// February count as months 14 and 15 of the previous year. The day count
/// is computed in `f64` and the result wraps into `u64`, so dates before
/// 1970 come out as large values.
pub fn encode_unix_time(
    year: i64,
    month: i64,
    day: i64,
    hour: i64,
    minute: i64,
    second: i64,
) -> u64 {
    let (year, month) = if month < 3 {
        (year.wrapping_sub(1), month.wrapping_add(13))
    } else {
        (year, month.wrapping_add(1))
    };

    let year = year as f64;
    let a = (year / 100.0).floor();
    let days = (365.25 * year).floor() + (30.6001 * month as f64).floor() + day as f64
        - UNIX_EPOCH_DAY
        - a
        + (a / 4.0).floor();

    (days as i64)
        .wrapping_mul(86_400)
        .wrapping_add(hour.wrapping_mul(3600))
        .wrapping_add(minute.wrapping_mul(60))
        .wrapping_add(second) as u64
}

/// Parse `text` into seconds and nanoseconds since the Unix epoch.
///
/// ```
/// use ntprims::parse_datetime;
///
/// let ts = parse_datetime("1970-01-01T00:00:00.5Z").unwrap();
/// assert_eq!((ts.seconds, ts.nanoseconds), (0, 500_000_000));
/// ```
pub fn parse_datetime(text: &str) -> Result<EpochTimestamp> {
    ParsedDateTime::scan(text).map(|parsed| parsed.to_epoch())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn chrono_epoch(y: i32, mo: u32, d: u32, h: u32, mi: u32, s: u32) -> i64 {
        NaiveDate::from_ymd_opt(y, mo, d)
            .and_then(|date| date.and_hms_opt(h, mi, s))
            .unwrap()
            .and_utc()
            .timestamp()
    }

    #[test]
    fn unix_epoch_with_zulu() {
        assert_eq!(
            parse_datetime("1970-01-01T00:00:00Z").unwrap(),
            EpochTimestamp::UNIX_EPOCH
        );
    }

    #[test]
    fn half_second_fraction() {
        let ts = parse_datetime("1970-01-01T00:00:00.5Z").unwrap();
        assert_eq!(ts, EpochTimestamp::new(0, 500_000_000));
    }

    #[test]
    fn offset_larger_than_epoch_wraps() {
        let ts = parse_datetime("1970-01-01T00:00:00+00:30").unwrap();
        assert_eq!(ts.seconds, 0u64.wrapping_sub(1800));
        assert_eq!(ts.nanoseconds, 0);
    }

    #[test]
    fn garbage_is_rejected() {
        assert!(matches!(parse_datetime("not-a-date"), Err(PrimError::Parse)));
        assert!(matches!(parse_datetime("2020/01/01"), Err(PrimError::Parse)));
        assert!(matches!(
            parse_datetime("2020-01-01T00:00:00.1x"),
            Err(PrimError::Parse)
        ));
        assert!(matches!(
            parse_datetime("2020-01-01T00:00:00+09:00:00"),
            Err(PrimError::Parse)
        ));
    }

    #[test]
    fn matches_chrono_for_assorted_dates() {
        let cases = [
            (1970, 1, 1, 0, 0, 0),
            (1999, 12, 31, 23, 59, 59),
            (2000, 2, 29, 12, 0, 0),
            (2020, 3, 1, 0, 0, 1),
            (2038, 1, 19, 3, 14, 8),
            (2100, 2, 28, 6, 30, 0),
            (2400, 12, 31, 23, 59, 59),
        ];
        for (y, mo, d, h, mi, s) in cases {
            let text = format!("{:04}-{:02}-{:02}T{:02}:{:02}:{:02}Z", y, mo, d, h, mi, s);
            let expected = chrono_epoch(y, mo, d, h, mi, s) as u64;
            assert_eq!(parse_datetime(&text).unwrap().seconds, expected, "{}", text);
        }
    }

    #[test]
    fn full_shape_with_positive_offset() {
        let ts = parse_datetime("2020-02-29T12:34:56.123456789+09:00").unwrap();
        let expected = chrono_epoch(2020, 2, 29, 12, 34, 56) - 9 * 3600;
        assert_eq!(ts.seconds, expected as u64);
        assert_eq!(ts.nanoseconds, 123_456_789);
    }

    #[test]
    fn negative_offset_adds() {
        let ts = parse_datetime("2001-09-09T01:46:40.0-05:30").unwrap();
        let expected = chrono_epoch(2001, 9, 9, 1, 46, 40) + 5 * 3600 + 30 * 60;
        assert_eq!(ts.seconds, expected as u64);
    }

    #[test]
    fn negative_offset_directly_after_seconds() {
        let ts = parse_datetime("1970-01-01T00:00:00-01:00").unwrap();
        assert_eq!(ts, EpochTimestamp::new(3600, 0));

        let parsed = ParsedDateTime::scan("1970-01-01T00:00:00-01:00").unwrap();
        assert_eq!(parsed.offset_seconds, -3600);
        assert_eq!(parsed.second, 0);
    }

    #[test]
    fn positive_offset_directly_after_seconds() {
        let ts = parse_datetime("1970-01-02T00:00:00+01:00").unwrap();
        assert_eq!(ts, EpochTimestamp::new(86_400 - 3600, 0));
    }

    #[test]
    fn empty_input_is_accepted() {
        let parsed = ParsedDateTime::scan("").unwrap();
        assert_eq!(parsed, ParsedDateTime::default());
        assert!(parse_datetime("").is_ok());
    }

    #[test]
    fn long_digit_runs_wrap_instead_of_panicking() {
        let nines = "9".repeat(40);
        let text = format!(
            "{n}-{n}-{n}T{n}:{n}:{n}.{n}+{n}:{n}",
            n = nines
        );
        let parsed = ParsedDateTime::scan(&text).unwrap();
        assert_eq!(parsed.nanoseconds, 999_999_999);
        assert!(parse_datetime(&text).is_ok());

        let negative = format!("2000-01-01T00:00:00-{n}", n = nines);
        assert!(parse_datetime(&negative).is_ok());
    }

    #[test]
    fn extreme_fields_do_not_panic() {
        let extremes = [i64::MIN, -1, 0, 1, i64::MAX];
        for &year in &extremes {
            for &month in &extremes {
                encode_unix_time(year, month, 1, 0, 0, 0);
                encode_unix_time(year, 1, month, month, month, month);
            }
        }
    }

    #[test]
    fn offset_digits_without_colon() {
        let with_colon = parse_datetime("2010-06-01 08:00:00+05:45").unwrap();
        let without = parse_datetime("2010-06-01 08:00:00+0545").unwrap();
        assert_eq!(with_colon, without);
    }

    #[test]
    fn space_separator_and_trailing_after_zulu() {
        let a = parse_datetime("2015-07-04 10:20:30Z").unwrap();
        let b = parse_datetime("2015-07-04T10:20:30Zanything goes here").unwrap();
        assert_eq!(a, b);
        assert_eq!(a.seconds, chrono_epoch(2015, 7, 4, 10, 20, 30) as u64);
    }

    #[test]
    fn fraction_is_right_padded() {
        let ts = parse_datetime("1970-01-01T00:00:01.000123Z").unwrap();
        assert_eq!(ts, EpochTimestamp::new(1, 123_000));
    }

    #[test]
    fn fraction_beyond_nanoseconds_is_truncated() {
        let ts = parse_datetime("1970-01-01T00:00:00.1234567891234Z").unwrap();
        assert_eq!(ts.nanoseconds, 123_456_789);
    }

    #[test]
    fn out_of_range_fields_are_projected() {
        let overflowed = parse_datetime("2019-13-01T00:00:00Z").unwrap();
        let next_year = parse_datetime("2020-01-01T00:00:00Z").unwrap();
        assert_eq!(overflowed, next_year);

        let day_40 = parse_datetime("2021-03-40T00:00:00Z").unwrap();
        assert_eq!(day_40.seconds, chrono_epoch(2021, 4, 9, 0, 0, 0) as u64);
    }

    #[test]
    fn end_of_input_accepts_partial_text() {
        let parsed = ParsedDateTime::scan("2024-05-06").unwrap();
        assert_eq!((parsed.year, parsed.month, parsed.day), (2024, 5, 6));
        assert_eq!(parsed.hour, 0);
        assert_eq!(
            parsed.to_epoch().seconds,
            chrono_epoch(2024, 5, 6, 0, 0, 0) as u64
        );
    }

    #[test]
    fn pre_epoch_dates_wrap() {
        let ts = parse_datetime("1969-12-31T23:59:59Z").unwrap();
        assert_eq!(ts.seconds, u64::MAX);
    }

    #[test]
    fn nt_time_conversions() {
        let epoch = EpochTimestamp::UNIX_EPOCH;
        assert_eq!(epoch.to_nt_time().get(), 116_444_736_000_000_000);

        let ts = EpochTimestamp::new(1_600_000_000, 987_654_321);
        let back = EpochTimestamp::from_nt_time(ts.to_nt_time());
        assert_eq!(back, EpochTimestamp::new(1_600_000_000, 987_654_300));
    }

    #[test]
    fn chrono_rendering() {
        let ts = parse_datetime("2000-01-01T00:00:00Z").unwrap();
        assert_eq!(
            ts.to_datetime().unwrap().to_rfc3339(),
            "2000-01-01T00:00:00+00:00"
        );
        assert!(EpochTimestamp::new(u64::MAX, 0).to_datetime().is_none());
    }
}
