// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Schedule validation.
//!
//! Validation is advisory: every check runs and reports a human-readable
//! message, so an editor can show all problems at once. Nothing here
//! returns an error for invalid input.
//!
//! # Rules
//!
//! - A day has 1 to [`MAX_TRANSITIONS_PER_DAY`] transitions
//! - The first transition is at `00:00`
//! - Times are strict `HH:mm` and strictly increasing
//! - Temperatures are within 4-35 °C in 0.5 ° steps
//!
//! # Examples
//!
//! ```
//! use trv_schedule::schedule::{DaySchedule, Transition};
//! use trv_schedule::validation::validate_day_schedule;
//!
//! let day = DaySchedule::new(vec![
//!     Transition::new("06:00", 22.0),
//!     Transition::new("08:00", 18.0),
//! ]);
//!
//! let result = validate_day_schedule(&day);
//! assert!(!result.valid);
//! assert!(result.errors[0].contains("First transition must be at 00:00"));
//! ```

use std::cmp::Ordering;
use std::collections::BTreeSet;

use serde::{Deserialize, Serialize};

use crate::error::ValidationError;
use crate::schedule::{DaySchedule, Transition, WeeklySchedule};
use crate::types::{
    MAX_TEMPERATURE, MIN_TEMPERATURE, TimeOfDay, compare_time, format_temperature, is_half_step,
    is_in_range, parse_time,
};

/// Maximum number of transitions the device stores per day.
pub const MAX_TRANSITIONS_PER_DAY: usize = 6;

/// Outcome of a validation pass.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ValidationResult {
    /// `true` when no check failed.
    pub valid: bool,
    /// Messages in the order the checks ran.
    pub errors: Vec<String>,
}

impl ValidationResult {
    fn from_errors(errors: Vec<String>) -> Self {
        Self {
            valid: errors.is_empty(),
            errors,
        }
    }

    /// Converts into a `Result`, carrying the messages on failure.
    ///
    /// # Errors
    ///
    /// Returns a [`ValidationError`] holding all messages if invalid.
    pub fn into_result(self) -> Result<(), ValidationError> {
        if self.valid {
            Ok(())
        } else {
            Err(ValidationError {
                messages: self.errors,
            })
        }
    }
}

/// Returns `true` if the string is a valid `HH:mm` time.
#[must_use]
pub fn is_valid_time(time: &str) -> bool {
    parse_time(time).is_ok()
}

/// Returns `true` if the temperature is within range and on the 0.5 grid.
///
/// # Examples
///
/// ```
/// use trv_schedule::validation::is_valid_temperature;
///
/// assert!(is_valid_temperature(20.5));
/// assert!(is_valid_temperature(35.0));
/// assert!(!is_valid_temperature(20.3));
/// assert!(!is_valid_temperature(3.5));
/// ```
#[must_use]
pub fn is_valid_temperature(temperature: f64) -> bool {
    is_in_range(temperature) && is_half_step(temperature)
}

/// Checks a single transition.
///
/// Reports an invalid time, then either an out-of-range temperature or a
/// temperature off the 0.5 grid (never both).
#[must_use]
pub fn validate_transition(transition: &Transition) -> ValidationResult {
    ValidationResult::from_errors(transition_errors(transition))
}

fn transition_errors(transition: &Transition) -> Vec<String> {
    let mut errors = Vec::new();

    if !is_valid_time(&transition.time) {
        errors.push(format!(
            "Invalid time \"{}\". Use HH:mm (00:00-23:59)",
            transition.time
        ));
    }

    let temperature = format_temperature(transition.temperature);
    if !is_in_range(transition.temperature) {
        errors.push(format!(
            "Temperature {temperature}°C is out of range ({}-{}°C)",
            format_temperature(MIN_TEMPERATURE),
            format_temperature(MAX_TEMPERATURE)
        ));
    } else if !is_half_step(transition.temperature) {
        errors.push(format!(
            "Temperature {temperature}°C must be in 0.5°C steps"
        ));
    }

    errors
}

/// Checks one day.
///
/// An empty day yields a single error. Otherwise every check runs: count,
/// midnight start, each transition (prefixed with its 1-based index),
/// duplicate times, then chronological order per adjacent pair.
#[must_use]
pub fn validate_day_schedule(day: &DaySchedule) -> ValidationResult {
    ValidationResult::from_errors(day_errors(day))
}

fn day_errors(day: &DaySchedule) -> Vec<String> {
    let transitions = day.transitions();
    if transitions.is_empty() {
        return vec!["Day must have at least one transition".to_string()];
    }

    let mut errors = Vec::new();

    if transitions.len() > MAX_TRANSITIONS_PER_DAY {
        errors.push(format!(
            "Too many transitions ({}). Maximum is {MAX_TRANSITIONS_PER_DAY}",
            transitions.len()
        ));
    }

    if transitions[0].time != TimeOfDay::MIDNIGHT.to_string() {
        errors.push(format!(
            "First transition must be at 00:00 (found {})",
            transitions[0].time
        ));
    }

    for (i, transition) in transitions.iter().enumerate() {
        for message in transition_errors(transition) {
            errors.push(format!("Transition {}: {message}", i + 1));
        }
    }

    let mut seen = BTreeSet::new();
    let duplicates: BTreeSet<&str> = transitions
        .iter()
        .map(|t| t.time.as_str())
        .filter(|time| !seen.insert(*time))
        .collect();
    if !duplicates.is_empty() {
        errors.push(format!(
            "Duplicate transition times: {}",
            duplicates.into_iter().collect::<Vec<_>>().join(", ")
        ));
    }

    for (i, pair) in transitions.windows(2).enumerate() {
        // Unparseable times were already reported above
        if let Ok(Ordering::Equal | Ordering::Greater) = compare_time(&pair[0].time, &pair[1].time)
        {
            errors.push(format!(
                "Transition {} ({}) must be later than transition {} ({})",
                i + 2,
                pair[1].time,
                i + 1,
                pair[0].time
            ));
        }
    }

    errors
}

/// Checks all seven days, Sunday first, prefixing each message with the
/// day name.
///
/// # Examples
///
/// ```
/// use trv_schedule::schedule::{DaySchedule, WeeklySchedule};
/// use trv_schedule::validation::validate_weekly_schedule;
///
/// assert!(validate_weekly_schedule(&WeeklySchedule::default()).valid);
///
/// let empty = WeeklySchedule::from_fn(|_| DaySchedule::default());
/// let result = validate_weekly_schedule(&empty);
/// assert_eq!(result.errors.len(), 7);
/// assert!(result.errors[0].starts_with("Sunday: "));
/// ```
#[must_use]
pub fn validate_weekly_schedule(week: &WeeklySchedule) -> ValidationResult {
    let errors = week
        .iter()
        .flat_map(|(day, schedule)| {
            day_errors(schedule)
                .into_iter()
                .map(move |message| format!("{}: {message}", day.label()))
        })
        .collect();
    ValidationResult::from_errors(errors)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::types::DayOfWeek;

    fn day(transitions: &[(&str, f64)]) -> DaySchedule {
        transitions
            .iter()
            .map(|(time, temperature)| Transition::new(*time, *temperature))
            .collect()
    }

    // -------------------------------------------------------------------------
    // Predicates
    // -------------------------------------------------------------------------

    #[test]
    fn temperature_predicate() {
        assert!(!is_valid_temperature(20.3));
        assert!(is_valid_temperature(20.5));
        assert!(!is_valid_temperature(3.5));
        assert!(is_valid_temperature(35.0));
        assert!(is_valid_temperature(4.0));
        assert!(!is_valid_temperature(20.1));
    }

    #[test]
    fn time_predicate() {
        assert!(is_valid_time("00:00"));
        assert!(is_valid_time("23:59"));
        assert!(!is_valid_time("24:00"));
        assert!(!is_valid_time("9:00"));
    }

    // -------------------------------------------------------------------------
    // Transitions
    // -------------------------------------------------------------------------

    #[test]
    fn transition_range_and_step_are_exclusive() {
        let result = validate_transition(&Transition::new("06:00", 40.3));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("out of range"));

        let result = validate_transition(&Transition::new("06:00", 20.3));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("0.5°C steps"));
    }

    #[test]
    fn transition_reports_time_and_temperature() {
        let result = validate_transition(&Transition::new("6am", 2.0));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].contains("Invalid time \"6am\""));
        assert!(result.errors[1].contains("out of range (4-35°C)"));
    }

    // -------------------------------------------------------------------------
    // Days
    // -------------------------------------------------------------------------

    #[test]
    fn valid_day() {
        let result = validate_day_schedule(&day(&[("00:00", 17.0), ("06:30", 21.5), ("22:00", 17.0)]));
        assert_eq!(result, ValidationResult { valid: true, errors: vec![] });
    }

    #[test]
    fn empty_day_short_circuits() {
        let result = validate_day_schedule(&DaySchedule::default());
        assert_eq!(result.errors, ["Day must have at least one transition"]);
    }

    #[test]
    fn first_transition_must_be_midnight() {
        let result = validate_day_schedule(&day(&[("06:00", 22.0), ("08:00", 18.0)]));
        assert!(!result.valid);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("First transition must be at 00:00"));
    }

    #[test]
    fn too_many_transitions() {
        let schedule = day(&[
            ("00:00", 17.0),
            ("04:00", 18.0),
            ("08:00", 19.0),
            ("12:00", 20.0),
            ("16:00", 21.0),
            ("20:00", 22.0),
            ("22:00", 17.0),
        ]);
        let result = validate_day_schedule(&schedule);
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].contains("Maximum is 6"));
    }

    #[test]
    fn per_transition_errors_are_indexed() {
        let result = validate_day_schedule(&day(&[("00:00", 17.0), ("08:00", 20.3)]));
        assert_eq!(result.errors, ["Transition 2: Temperature 20.3°C must be in 0.5°C steps"]);
    }

    #[test]
    fn duplicate_and_order_errors_are_cumulative() {
        let result = validate_day_schedule(&day(&[
            ("00:00", 17.0),
            ("08:00", 20.0),
            ("08:00", 21.0),
            ("07:00", 19.0),
        ]));
        assert_eq!(
            result.errors,
            [
                "Duplicate transition times: 08:00",
                "Transition 3 (08:00) must be later than transition 2 (08:00)",
                "Transition 4 (07:00) must be later than transition 3 (08:00)",
            ]
        );
    }

    #[test]
    fn order_check_skips_unparseable_pairs() {
        let result = validate_day_schedule(&day(&[("00:00", 17.0), ("bad", 20.0), ("06:00", 19.0)]));
        assert_eq!(result.errors.len(), 1);
        assert!(result.errors[0].starts_with("Transition 2: Invalid time"));
    }

    // -------------------------------------------------------------------------
    // Weeks
    // -------------------------------------------------------------------------

    #[test]
    fn weekly_errors_are_prefixed_in_day_order() {
        let mut week = WeeklySchedule::default();
        week[DayOfWeek::Saturday] = day(&[("06:00", 20.0)]);
        week[DayOfWeek::Monday] = day(&[("00:00", 50.0)]);

        let result = validate_weekly_schedule(&week);
        assert_eq!(result.errors.len(), 2);
        assert!(result.errors[0].starts_with("Monday: Transition 1: Temperature 50°C"));
        assert!(result.errors[1].starts_with("Saturday: First transition must be at 00:00"));
    }

    #[test]
    fn empty_week_has_one_error_per_day() {
        let week = WeeklySchedule::from_fn(|_| DaySchedule::default());
        let result = validate_weekly_schedule(&week);
        let expected: Vec<_> = DayOfWeek::ALL
            .iter()
            .map(|d| format!("{}: Day must have at least one transition", d.label()))
            .collect();
        assert_eq!(result.errors, expected);
    }

    #[test]
    fn into_result_carries_messages() {
        let err = validate_day_schedule(&DaySchedule::default())
            .into_result()
            .unwrap_err();
        assert_eq!(err.messages.len(), 1);
        assert!(validate_day_schedule(&DaySchedule::constant(20.0)).into_result().is_ok());
    }
}
