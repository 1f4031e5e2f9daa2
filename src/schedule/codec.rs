// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Text codec for the device's per-day schedule strings.
//!
//! A day is encoded as space-separated `HH:mm/T` tokens, for example
//! `"00:00/17 06:30/21.5 22:00/17"`. Serialization is canonical: tokens are
//! sorted by time, so two days holding the same transitions in a different
//! order always encode to the same string.

use crate::error::{Error, ParseError};
use crate::types::{format_temperature, parse_time};

use super::{DaySchedule, MqttWeeklySchedule, Transition, WeeklySchedule};

/// Creates a week in which every day holds a single `00:00` transition at
/// the default setpoint.
#[must_use]
pub fn create_empty_weekly_schedule() -> WeeklySchedule {
    WeeklySchedule::default()
}

/// Encodes one day in canonical form.
///
/// # Examples
///
/// ```
/// use trv_schedule::schedule::{DaySchedule, Transition, serialize_day_schedule};
///
/// let day = DaySchedule::new(vec![
///     Transition::new("06:30", 21.5),
///     Transition::new("00:00", 17.0),
/// ]);
/// assert_eq!(serialize_day_schedule(&day), "00:00/17 06:30/21.5");
/// ```
#[must_use]
pub fn serialize_day_schedule(day: &DaySchedule) -> String {
    day.canonical()
        .iter()
        .map(|t| format!("{}/{}", t.time, format_temperature(t.temperature)))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Encodes all seven days.
#[must_use]
pub fn serialize_weekly_schedule(schedule: &WeeklySchedule) -> MqttWeeklySchedule {
    MqttWeeklySchedule::from_fn(|day| serialize_day_schedule(schedule.day(day)))
}

/// Decodes a single `HH:mm/T` token.
///
/// The time must have `HH:mm` syntax; out-of-range values such as `25:00`
/// are kept so the validator can report them.
///
/// # Errors
///
/// Returns [`ParseError::InvalidToken`] for a missing or repeated `/` or a
/// time without `HH:mm` syntax, and [`ParseError::InvalidTemperature`] for a
/// temperature that is not a finite number.
pub fn parse_transition(token: &str) -> Result<Transition, ParseError> {
    let (time, temperature) = token
        .split_once('/')
        .filter(|(_, rest)| !rest.contains('/'))
        .ok_or_else(|| ParseError::InvalidToken(token.to_string()))?;

    if let Err(Error::Parse(_)) = parse_time(time) {
        return Err(ParseError::InvalidToken(token.to_string()));
    }

    let value: f64 = temperature
        .parse()
        .ok()
        .filter(|v: &f64| v.is_finite())
        .ok_or_else(|| ParseError::InvalidTemperature(temperature.to_string()))?;

    Ok(Transition::new(time, value))
}

/// Decodes one day string. Tokens are kept in the order they appear.
///
/// Day invariants (first at midnight, ordering, limits) are not checked
/// here.
///
/// # Errors
///
/// Returns the first token error.
///
/// # Examples
///
/// ```
/// use trv_schedule::schedule::parse_day_schedule;
///
/// let day = parse_day_schedule("00:00/17 06:30/21.5").unwrap();
/// assert_eq!(day.len(), 2);
/// assert_eq!(day.transitions()[1].temperature, 21.5);
///
/// assert!(parse_day_schedule("00:00-17").is_err());
/// ```
pub fn parse_day_schedule(encoded: &str) -> Result<DaySchedule, ParseError> {
    encoded.split_whitespace().map(parse_transition).collect()
}

/// Decodes all seven days.
///
/// # Errors
///
/// Returns the first token error, in Sunday..Saturday order.
pub fn parse_weekly_schedule(wire: &MqttWeeklySchedule) -> Result<WeeklySchedule, ParseError> {
    let mut schedule = WeeklySchedule::default();
    for (day, encoded) in wire.iter() {
        let parsed = parse_day_schedule(encoded).inspect_err(|err| {
            tracing::debug!(day = %day, encoded = %encoded, error = %err, "Failed to parse day schedule");
        })?;
        schedule.set_day(day, parsed);
    }
    Ok(schedule)
}
