/******************************************************************************
   Author: Joaquín Béjar García
   Email: jb@taunais.com
   Date: 27/1/26
******************************************************************************/

//! FIX date and time formats.
//!
//! Timestamps in FIX are formatted as `YYYYMMDD-HH:MM:SS`, optionally
//! followed by `.sss` (milliseconds) or `.ssssss` (microseconds). Times of day
//! use the same layout without the date part, dates are `YYYYMMDD`.

use arrayvec::ArrayString;
use chrono::{NaiveDate, NaiveDateTime, NaiveTime};

const DATE_FORMAT: &str = "%Y%m%d";
const TIME_PARSE_FORMAT: &str = "%H:%M:%S%.f";
const DATETIME_PARSE_FORMAT: &str = "%Y%m%d-%H:%M:%S%.f";

/// Number of fractional-second digits written on encode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TimePrecision {
    /// Whole seconds.
    Seconds,
    /// Three fractional digits.
    Millis,
    /// Six fractional digits.
    Micros,
}

impl TimePrecision {
    /// Resolves the precision from caller flags; microseconds win over milliseconds.
    #[must_use]
    pub const fn from_flags(include_millis: bool, include_micros: bool) -> Self {
        if include_micros {
            Self::Micros
        } else if include_millis {
            Self::Millis
        } else {
            Self::Seconds
        }
    }

    const fn time_format(self) -> &'static str {
        match self {
            Self::Seconds => "%H:%M:%S",
            Self::Millis => "%H:%M:%S%.3f",
            Self::Micros => "%H:%M:%S%.6f",
        }
    }

    const fn datetime_format(self) -> &'static str {
        match self {
            Self::Seconds => "%Y%m%d-%H:%M:%S",
            Self::Millis => "%Y%m%d-%H:%M:%S%.3f",
            Self::Micros => "%Y%m%d-%H:%M:%S%.6f",
        }
    }
}

/// Formats a timestamp as `YYYYMMDD-HH:MM:SS[.sss[sss]]`.
#[must_use]
pub fn format_datetime(value: &NaiveDateTime, precision: TimePrecision) -> ArrayString<32> {
    let mut buf = ArrayString::new();
    let _ = std::fmt::write(
        &mut buf,
        format_args!("{}", value.format(precision.datetime_format())),
    );
    buf
}

/// Formats a time of day as `HH:MM:SS[.sss[sss]]`.
#[must_use]
pub fn format_time(value: &NaiveTime, precision: TimePrecision) -> ArrayString<24> {
    let mut buf = ArrayString::new();
    let _ = std::fmt::write(
        &mut buf,
        format_args!("{}", value.format(precision.time_format())),
    );
    buf
}

/// Formats a date as `YYYYMMDD`.
#[must_use]
pub fn format_date(value: &NaiveDate) -> ArrayString<16> {
    let mut buf = ArrayString::new();
    let _ = std::fmt::write(&mut buf, format_args!("{}", value.format(DATE_FORMAT)));
    buf
}

/// Parses `YYYYMMDD-HH:MM:SS` with any number of fractional digits.
#[must_use]
pub fn parse_datetime(s: &str) -> Option<NaiveDateTime> {
    NaiveDateTime::parse_from_str(s, DATETIME_PARSE_FORMAT).ok()
}

/// Parses `HH:MM:SS` with any number of fractional digits.
#[must_use]
pub fn parse_time(s: &str) -> Option<NaiveTime> {
    NaiveTime::parse_from_str(s, TIME_PARSE_FORMAT).ok()
}

/// Parses `YYYYMMDD`.
#[must_use]
pub fn parse_date(s: &str) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(s, DATE_FORMAT).ok()
}
