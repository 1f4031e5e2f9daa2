// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Day-of-week keys used by the weekly schedule.

use std::fmt;
use std::str::FromStr;

use crate::error::ParseError;

/// A day of the week, ordered Sunday first as the device reports them.
///
/// # Examples
///
/// ```
/// use trv_schedule::types::DayOfWeek;
///
/// let day: DayOfWeek = "monday".parse().unwrap();
/// assert_eq!(day, DayOfWeek::Monday);
/// assert_eq!(day.key(), "monday");
/// assert_eq!(day.label(), "Monday");
/// assert_eq!(DayOfWeek::ALL[0], DayOfWeek::Sunday);
/// ```
#[derive(
    Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, serde::Serialize, serde::Deserialize,
)]
#[serde(rename_all = "lowercase")]
pub enum DayOfWeek {
    /// Sunday.
    Sunday,
    /// Monday.
    Monday,
    /// Tuesday.
    Tuesday,
    /// Wednesday.
    Wednesday,
    /// Thursday.
    Thursday,
    /// Friday.
    Friday,
    /// Saturday.
    Saturday,
}

impl DayOfWeek {
    /// All days in their fixed order, Sunday through Saturday.
    pub const ALL: [Self; 7] = [
        Self::Sunday,
        Self::Monday,
        Self::Tuesday,
        Self::Wednesday,
        Self::Thursday,
        Self::Friday,
        Self::Saturday,
    ];

    /// Returns the position in [`DayOfWeek::ALL`] (Sunday = 0).
    #[must_use]
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Returns the day at the given position, wrapping modulo 7.
    #[must_use]
    pub const fn from_index(index: usize) -> Self {
        Self::ALL[index % 7]
    }

    /// Returns the previous day, wrapping from Sunday to Saturday.
    #[must_use]
    pub const fn previous(self) -> Self {
        Self::from_index(self.index() + 6)
    }

    /// Returns the lowercase key used in entity ids and payload keys.
    #[must_use]
    pub const fn key(self) -> &'static str {
        match self {
            Self::Sunday => "sunday",
            Self::Monday => "monday",
            Self::Tuesday => "tuesday",
            Self::Wednesday => "wednesday",
            Self::Thursday => "thursday",
            Self::Friday => "friday",
            Self::Saturday => "saturday",
        }
    }

    /// Returns the capitalized name used in validation messages.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Sunday => "Sunday",
            Self::Monday => "Monday",
            Self::Tuesday => "Tuesday",
            Self::Wednesday => "Wednesday",
            Self::Thursday => "Thursday",
            Self::Friday => "Friday",
            Self::Saturday => "Saturday",
        }
    }

    /// Converts from a chrono weekday.
    #[must_use]
    pub const fn from_chrono(weekday: chrono::Weekday) -> Self {
        match weekday {
            chrono::Weekday::Sun => Self::Sunday,
            chrono::Weekday::Mon => Self::Monday,
            chrono::Weekday::Tue => Self::Tuesday,
            chrono::Weekday::Wed => Self::Wednesday,
            chrono::Weekday::Thu => Self::Thursday,
            chrono::Weekday::Fri => Self::Friday,
            chrono::Weekday::Sat => Self::Saturday,
        }
    }
}

impl fmt::Display for DayOfWeek {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.key())
    }
}

impl FromStr for DayOfWeek {
    type Err = ParseError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|day| day.key().eq_ignore_ascii_case(s.trim()))
            .ok_or_else(|| ParseError::UnknownDay(s.to_string()))
    }
}

impl From<chrono::Weekday> for DayOfWeek {
    fn from(weekday: chrono::Weekday) -> Self {
        Self::from_chrono(weekday)
    }
}
