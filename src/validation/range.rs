//! Date/time range expressions
//!
//! Range filters use the DICOM date/time range syntax:
//! - `20180101` single instant, matched exactly
//! - `20180101-` everything from the instant on
//! - `-20180131` everything up to the end of the instant's precision period
//! - `20180101-20180131` both bounds, inclusive
//!
//! An instant is `YYYYMMDD`, `YYYYMMDDHHMM`, `YYYYMMDDHHMMSS` or
//! `YYYYMMDDHHMMSS.F` with one to six fraction digits, interpreted as UTC.
//!
//! A single value is exact at its own precision: `20180101` matches only
//! midnight, while `20180101-20180101` covers the whole day.

use chrono::{DateTime, Duration, NaiveDate, NaiveDateTime, NaiveTime, Utc};
use std::fmt;
use std::str::FromStr;

/// Inclusive range filter; either bound may be open
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DateTimeRange {
    pub start: Option<DateTime<Utc>>,
    pub end: Option<DateTime<Utc>>,
}

impl DateTimeRange {
    pub fn contains(&self, instant: DateTime<Utc>) -> bool {
        self.start.map_or(true, |start| instant >= start) && self.end.map_or(true, |end| instant <= end)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RangeParseError {
    pub expr: String,
    pub reason: &'static str,
}

impl fmt::Display for RangeParseError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "'{}': {}", self.expr, self.reason)
    }
}

impl std::error::Error for RangeParseError {}

/// Resolution of a parsed instant
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Precision {
    Day,
    Minute,
    Second,
    Fraction(u32),
}

impl Precision {
    /// Length of the period an instant of this precision stands for
    fn period(self) -> Duration {
        match self {
            Precision::Day => Duration::days(1),
            Precision::Minute => Duration::minutes(1),
            Precision::Second => Duration::seconds(1),
            Precision::Fraction(digits) => Duration::microseconds(10i64.pow(6 - digits)),
        }
    }
}

impl FromStr for DateTimeRange {
    type Err = RangeParseError;

    fn from_str(expr: &str) -> Result<Self, Self::Err> {
        let fail = |reason| RangeParseError { expr: expr.to_string(), reason };

        match expr.split_once('-') {
            None => {
                let (instant, _) = parse_instant(expr).map_err(fail)?;
                Ok(DateTimeRange { start: Some(instant), end: Some(instant) })
            }
            Some(("", "")) => Err(fail("range without bounds")),
            Some((lower, upper)) => {
                let start = match lower {
                    "" => None,
                    lower => Some(parse_instant(lower).map_err(fail)?.0),
                };
                let end = match upper {
                    "" => None,
                    upper => {
                        let (instant, precision) = parse_instant(upper).map_err(fail)?;
                        Some(instant + precision.period() - Duration::microseconds(1))
                    }
                };
                if let (Some(start), Some(end)) = (start, end) {
                    if start > end {
                        return Err(fail("lower bound is after upper bound"));
                    }
                }
                Ok(DateTimeRange { start, end })
            }
        }
    }
}

fn parse_instant(value: &str) -> Result<(DateTime<Utc>, Precision), &'static str> {
    let (digits, fraction) = match value.split_once('.') {
        Some((digits, fraction)) => (digits, Some(fraction)),
        None => (value, None),
    };
    if !digits.bytes().all(|b| b.is_ascii_digit()) {
        return Err("expected digits");
    }

    let date = digits.get(..8).ok_or("expected YYYYMMDD")?;
    let date = NaiveDate::parse_from_str(date, "%Y%m%d").map_err(|_| "invalid date")?;

    let (time, precision) = match (digits.len(), fraction) {
        (8, None) => (NaiveTime::MIN, Precision::Day),
        (12, None) => (parse_time(&digits[8..], "%H%M")?, Precision::Minute),
        (14, None) => (parse_time(&digits[8..], "%H%M%S")?, Precision::Second),
        (14, Some(fraction)) => {
            if fraction.is_empty() || fraction.len() > 6 || !fraction.bytes().all(|b| b.is_ascii_digit()) {
                return Err("expected 1 to 6 fraction digits");
            }
            let time = parse_time(&digits[8..], "%H%M%S")?;
            let scale = 10u32.pow(6 - fraction.len() as u32);
            let micros: u32 = fraction.parse().map_err(|_| "invalid fraction")?;
            let time = time + Duration::microseconds(i64::from(micros * scale));
            (time, Precision::Fraction(fraction.len() as u32))
        }
        _ => return Err("unsupported date/time length"),
    };

    Ok((NaiveDateTime::new(date, time).and_utc(), precision))
}

fn parse_time(value: &str, format: &str) -> Result<NaiveTime, &'static str> {
    // %H%M alone is not enough for chrono to build a time, pad the seconds.
    let (value, format) = if format == "%H%M" {
        (format!("{value}00"), "%H%M%S")
    } else {
        (value.to_string(), format)
    };
    NaiveTime::parse_from_str(&value, format).map_err(|_| "invalid time")
}
