// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Time-of-day codec for schedule transitions.
//!
//! Transition times travel as strict 24-hour `HH:mm` strings. This module
//! provides the typed [`TimeOfDay`] plus the string-level helpers used by the
//! schedule codec, the validator and editor option lists.
//!
//! # Functions
//!
//! - [`format_time`] - Zero-padded `HH:mm` from hour and minute
//! - [`parse_time`] - Strict `HH:mm` parsing with range checks
//! - [`compare_time`] - Chronological ordering of two time strings
//! - [`time_to_minutes`] / [`minutes_to_time`] - Minutes since midnight
//! - [`generate_time_options`] - Evenly spaced options across one day

use std::cmp::Ordering;
use std::fmt;
use std::str::FromStr;

use crate::error::{Error, ParseError, ValueError};

/// Number of minutes in one day.
pub const MINUTES_PER_DAY: u16 = 1440;

/// Default step for [`generate_time_options`], in minutes.
pub const DEFAULT_TIME_STEP_MINUTES: u16 = 15;

/// A validated time of day with minute precision.
///
/// # Examples
///
/// ```
/// use trv_schedule::types::TimeOfDay;
///
/// let time: TimeOfDay = "06:30".parse().unwrap();
/// assert_eq!(time.hour(), 6);
/// assert_eq!(time.minute(), 30);
/// assert_eq!(time.minutes(), 390);
/// assert_eq!(time.to_string(), "06:30");
///
/// assert!("6:30".parse::<TimeOfDay>().is_err());
/// assert!("24:00".parse::<TimeOfDay>().is_err());
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(try_from = "String", into = "String")]
pub struct TimeOfDay {
    hour: u8,
    minute: u8,
}

impl TimeOfDay {
    /// Midnight, the mandatory start of every day schedule.
    pub const MIDNIGHT: Self = Self { hour: 0, minute: 0 };

    /// Creates a time of day from hour and minute.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::HourOutOfRange`] if `hour > 23`, otherwise
    /// [`ValueError::MinuteOutOfRange`] if `minute > 59`.
    pub fn new(hour: u8, minute: u8) -> Result<Self, ValueError> {
        if hour > 23 {
            return Err(ValueError::HourOutOfRange(u32::from(hour)));
        }
        if minute > 59 {
            return Err(ValueError::MinuteOutOfRange(u32::from(minute)));
        }
        Ok(Self { hour, minute })
    }

    /// Creates a time of day from minutes since midnight.
    ///
    /// # Errors
    ///
    /// Returns [`ValueError::MinutesOfDayOutOfRange`] unless
    /// `0 <= minutes < 1440`.
    pub fn from_minutes(minutes: i64) -> Result<Self, ValueError> {
        if !(0..i64::from(MINUTES_PER_DAY)).contains(&minutes) {
            return Err(ValueError::MinutesOfDayOutOfRange(minutes));
        }
        // Truncation is safe: minutes is in [0, 1440)
        #[allow(clippy::cast_possible_truncation, clippy::cast_sign_loss)]
        let (hour, minute) = ((minutes / 60) as u8, (minutes % 60) as u8);
        Ok(Self { hour, minute })
    }

    /// Returns the hour (0-23).
    #[must_use]
    pub const fn hour(&self) -> u8 {
        self.hour
    }

    /// Returns the minute (0-59).
    #[must_use]
    pub const fn minute(&self) -> u8 {
        self.minute
    }

    /// Returns the number of minutes since midnight.
    #[must_use]
    pub const fn minutes(&self) -> u16 {
        self.hour as u16 * 60 + self.minute as u16
    }
}

impl fmt::Display for TimeOfDay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:02}:{:02}", self.hour, self.minute)
    }
}

impl FromStr for TimeOfDay {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        parse_time(s)
    }
}

impl TryFrom<String> for TimeOfDay {
    type Error = Error;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        parse_time(&value)
    }
}

impl From<TimeOfDay> for String {
    fn from(value: TimeOfDay) -> Self {
        value.to_string()
    }
}

/// Formats hour and minute as a zero-padded `HH:mm` string.
///
/// No range validation is performed.
///
/// # Examples
///
/// ```
/// use trv_schedule::types::format_time;
///
/// assert_eq!(format_time(6, 5), "06:05");
/// assert_eq!(format_time(23, 59), "23:59");
/// ```
#[must_use]
pub fn format_time(hour: u32, minute: u32) -> String {
    format!("{hour:02}:{minute:02}")
}

/// Parses a strict `HH:mm` string.
///
/// Exactly two digits, a colon and two digits are accepted; no surrounding
/// whitespace, single-digit fields or seconds.
///
/// # Errors
///
/// Returns [`ParseError::InvalidTime`] when the syntax does not match, then
/// [`ValueError::HourOutOfRange`] or [`ValueError::MinuteOutOfRange`] (hour
/// checked first).
///
/// # Examples
///
/// ```
/// use trv_schedule::types::parse_time;
///
/// let time = parse_time("22:45").unwrap();
/// assert_eq!((time.hour(), time.minute()), (22, 45));
///
/// assert!(parse_time("7:00").is_err());
/// assert!(parse_time("07:00:00").is_err());
/// assert!(parse_time("23:60").is_err());
/// ```
pub fn parse_time(s: &str) -> Result<TimeOfDay, Error> {
    let bytes = s.as_bytes();
    let well_formed = bytes.len() == 5
        && bytes[0].is_ascii_digit()
        && bytes[1].is_ascii_digit()
        && bytes[2] == b':'
        && bytes[3].is_ascii_digit()
        && bytes[4].is_ascii_digit();

    if !well_formed {
        return Err(ParseError::InvalidTime(s.to_string()).into());
    }

    let digit = |b: u8| u32::from(b - b'0');
    let hour = digit(bytes[0]) * 10 + digit(bytes[1]);
    let minute = digit(bytes[3]) * 10 + digit(bytes[4]);

    if hour > 23 {
        return Err(ValueError::HourOutOfRange(hour).into());
    }
    if minute > 59 {
        return Err(ValueError::MinuteOutOfRange(minute).into());
    }

    // Truncation is safe: both values were range-checked above
    #[allow(clippy::cast_possible_truncation)]
    let (hour, minute) = (hour as u8, minute as u8);
    Ok(TimeOfDay { hour, minute })
}

/// Compares two `HH:mm` strings chronologically.
///
/// # Errors
///
/// Returns the [`parse_time`] error of the first input that fails to parse.
///
/// # Examples
///
/// ```
/// use std::cmp::Ordering;
/// use trv_schedule::types::compare_time;
///
/// assert_eq!(compare_time("06:00", "08:30").unwrap(), Ordering::Less);
/// assert_eq!(compare_time("12:00", "12:00").unwrap(), Ordering::Equal);
/// assert!(compare_time("06:00", "6:00").is_err());
/// ```
pub fn compare_time(a: &str, b: &str) -> Result<Ordering, Error> {
    let a = parse_time(a)?;
    let b = parse_time(b)?;
    Ok(a.minutes().cmp(&b.minutes()))
}

/// Converts an `HH:mm` string to minutes since midnight.
///
/// # Errors
///
/// Returns the [`parse_time`] error if the string is not a valid time.
pub fn time_to_minutes(s: &str) -> Result<u16, Error> {
    parse_time(s).map(|time| time.minutes())
}

/// Converts minutes since midnight to an `HH:mm` string.
///
/// # Errors
///
/// Returns [`ValueError::MinutesOfDayOutOfRange`] unless
/// `0 <= minutes < 1440`. `1440` (the next midnight) has no representation.
///
/// # Examples
///
/// ```
/// use trv_schedule::types::minutes_to_time;
///
/// assert_eq!(minutes_to_time(0).unwrap(), "00:00");
/// assert_eq!(minutes_to_time(1439).unwrap(), "23:59");
/// assert!(minutes_to_time(1440).is_err());
/// assert!(minutes_to_time(-1).is_err());
/// ```
pub fn minutes_to_time(minutes: i64) -> Result<String, ValueError> {
    TimeOfDay::from_minutes(minutes).map(|time| time.to_string())
}

/// Generates `HH:mm` options from midnight in `step_minutes` increments.
///
/// The result is strictly increasing, starts at `00:00` and never includes
/// `24:00`. The step is used as given, so a step that does not divide 1440
/// yields `ceil(1440 / step)` options.
///
/// # Errors
///
/// Returns [`ValueError::ZeroStep`] if `step_minutes` is zero.
///
/// # Examples
///
/// ```
/// use trv_schedule::types::generate_time_options;
///
/// let options = generate_time_options(15).unwrap();
/// assert_eq!(options.len(), 96);
/// assert_eq!(options.first().map(String::as_str), Some("00:00"));
/// assert_eq!(options.last().map(String::as_str), Some("23:45"));
///
/// assert_eq!(generate_time_options(7).unwrap().len(), 206);
/// ```
pub fn generate_time_options(step_minutes: u16) -> Result<Vec<String>, ValueError> {
    if step_minutes == 0 {
        return Err(ValueError::ZeroStep);
    }

    Ok((0..MINUTES_PER_DAY)
        .step_by(usize::from(step_minutes))
        .map(|minutes| format_time(u32::from(minutes / 60), u32::from(minutes % 60)))
        .collect())
}
