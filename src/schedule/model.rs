// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory weekly schedule model.

use std::ops::{Index, IndexMut};

use chrono::{Datelike, NaiveDateTime, Timelike};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::types::{DEFAULT_TEMPERATURE, DayOfWeek, TimeOfDay, parse_time};

/// A single setpoint change within a day.
///
/// The time is kept as text so that data read from the device can be held,
/// displayed and validated even when it is out of range. Equality ignores
/// the UI identifier.
///
/// # Examples
///
/// ```
/// use trv_schedule::schedule::Transition;
///
/// let t = Transition::new("06:30", 21.5);
/// assert_eq!(t.time, "06:30");
/// assert_eq!(t, Transition::new("06:30", 21.5).with_generated_id());
/// ```
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Transition {
    /// Start time, `HH:mm`.
    pub time: String,
    /// Setpoint in degrees Celsius.
    pub temperature: f64,
    /// Identifier for list rendering. Never persisted.
    #[serde(skip)]
    pub id: Option<Uuid>,
}

impl Transition {
    /// Creates a transition without an identifier.
    #[must_use]
    pub fn new(time: impl Into<String>, temperature: f64) -> Self {
        Self {
            time: time.into(),
            temperature,
            id: None,
        }
    }

    /// Creates a transition from a typed time.
    #[must_use]
    pub fn at(time: TimeOfDay, temperature: f64) -> Self {
        Self::new(time.to_string(), temperature)
    }

    /// Returns this transition with a fresh random identifier.
    #[must_use]
    pub fn with_generated_id(mut self) -> Self {
        self.id = Some(Uuid::new_v4());
        self
    }

    /// Returns the parsed time, if the stored text is a valid time.
    #[must_use]
    pub fn time_of_day(&self) -> Option<TimeOfDay> {
        parse_time(&self.time).ok()
    }
}

impl PartialEq for Transition {
    fn eq(&self, other: &Self) -> bool {
        self.time == other.time && self.temperature.total_cmp(&other.temperature).is_eq()
    }
}

/// Transitions for one day, in the order they were entered.
///
/// No invariants are enforced here; see
/// [`validate_day_schedule`](crate::validation::validate_day_schedule).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct DaySchedule {
    transitions: Vec<Transition>,
}

impl DaySchedule {
    /// Creates a day schedule from transitions.
    #[must_use]
    pub fn new(transitions: Vec<Transition>) -> Self {
        Self { transitions }
    }

    /// Creates a day holding a single midnight transition.
    #[must_use]
    pub fn constant(temperature: f64) -> Self {
        Self::new(vec![Transition::at(TimeOfDay::MIDNIGHT, temperature)])
    }

    /// Returns the transitions in stored order.
    #[must_use]
    pub fn transitions(&self) -> &[Transition] {
        &self.transitions
    }

    /// Returns mutable access to the transitions.
    pub fn transitions_mut(&mut self) -> &mut Vec<Transition> {
        &mut self.transitions
    }

    /// Appends a transition.
    pub fn push(&mut self, transition: Transition) {
        self.transitions.push(transition);
    }

    /// Returns the number of transitions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.transitions.len()
    }

    /// Returns `true` if the day has no transitions.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.transitions.is_empty()
    }

    /// Returns an iterator over the transitions.
    pub fn iter(&self) -> std::slice::Iter<'_, Transition> {
        self.transitions.iter()
    }

    /// Returns a copy sorted into the canonical wire order: by time, then by
    /// temperature for equal times.
    #[must_use]
    pub fn canonical(&self) -> Self {
        let mut transitions = self.transitions.clone();
        transitions.sort_by(|a, b| {
            a.time
                .cmp(&b.time)
                .then_with(|| a.temperature.total_cmp(&b.temperature))
        });
        Self { transitions }
    }

    /// Returns `true` if both days contain the same transitions regardless
    /// of order.
    #[must_use]
    pub fn same_transitions(&self, other: &Self) -> bool {
        self.canonical() == other.canonical()
    }

    /// Latest setpoint at or before `until` minutes, or the latest of the
    /// whole day when `until` is `None`. Transitions with unparseable times
    /// are ignored.
    fn latest_setpoint(&self, until: Option<u16>) -> Option<f64> {
        self.transitions
            .iter()
            .filter_map(|t| t.time_of_day().map(|time| (time.minutes(), t.temperature)))
            .filter(|(minutes, _)| until.is_none_or(|limit| *minutes <= limit))
            .max_by_key(|(minutes, _)| *minutes)
            .map(|(_, temperature)| temperature)
    }
}

impl FromIterator<Transition> for DaySchedule {
    fn from_iter<I: IntoIterator<Item = Transition>>(iter: I) -> Self {
        Self::new(iter.into_iter().collect())
    }
}

impl<'a> IntoIterator for &'a DaySchedule {
    type Item = &'a Transition;
    type IntoIter = std::slice::Iter<'a, Transition>;

    fn into_iter(self) -> Self::IntoIter {
        self.transitions.iter()
    }
}

/// A full week of day schedules. All seven days are always present.
///
/// # Examples
///
/// ```
/// use trv_schedule::schedule::{DaySchedule, Transition, WeeklySchedule};
/// use trv_schedule::types::DayOfWeek;
///
/// let mut week = WeeklySchedule::default();
/// week[DayOfWeek::Monday] = DaySchedule::new(vec![
///     Transition::new("00:00", 17.0),
///     Transition::new("06:30", 21.0),
/// ]);
///
/// assert_eq!(week[DayOfWeek::Monday].len(), 2);
/// assert_eq!(week[DayOfWeek::Tuesday].len(), 1);
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct WeeklySchedule {
    days: [DaySchedule; 7],
}

impl WeeklySchedule {
    /// Builds a week by calling `f` once per day, Sunday first.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(DayOfWeek) -> DaySchedule) -> Self {
        Self {
            days: DayOfWeek::ALL.map(&mut f),
        }
    }

    /// Returns the schedule for a day.
    #[must_use]
    pub fn day(&self, day: DayOfWeek) -> &DaySchedule {
        &self.days[day.index()]
    }

    /// Returns mutable access to the schedule for a day.
    pub fn day_mut(&mut self, day: DayOfWeek) -> &mut DaySchedule {
        &mut self.days[day.index()]
    }

    /// Replaces the schedule for a day.
    pub fn set_day(&mut self, day: DayOfWeek, schedule: DaySchedule) {
        self.days[day.index()] = schedule;
    }

    /// Iterates over `(day, schedule)` pairs, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &DaySchedule)> {
        DayOfWeek::ALL.into_iter().zip(self.days.iter())
    }

    /// Returns `true` if every day has the same transitions as `other`,
    /// ignoring transition order.
    #[must_use]
    pub fn same_transitions(&self, other: &Self) -> bool {
        self.days
            .iter()
            .zip(other.days.iter())
            .all(|(a, b)| a.same_transitions(b))
    }

    /// Returns the setpoint in effect on `day` at `time`.
    ///
    /// This is the last transition at or before `time`. When the day has
    /// none (its first transition is later), the search wraps back through
    /// previous days and takes the latest transition found.
    ///
    /// # Examples
    ///
    /// ```
    /// use trv_schedule::schedule::{DaySchedule, Transition, WeeklySchedule};
    /// use trv_schedule::types::{DayOfWeek, TimeOfDay};
    ///
    /// let mut week = WeeklySchedule::default();
    /// week[DayOfWeek::Monday] = DaySchedule::new(vec![
    ///     Transition::new("00:00", 17.0),
    ///     Transition::new("06:30", 21.0),
    ///     Transition::new("22:00", 16.5),
    /// ]);
    ///
    /// let at = |h, m| TimeOfDay::new(h, m).unwrap();
    /// assert_eq!(week.setpoint_at(DayOfWeek::Monday, at(5, 0)), Some(17.0));
    /// assert_eq!(week.setpoint_at(DayOfWeek::Monday, at(6, 30)), Some(21.0));
    /// assert_eq!(week.setpoint_at(DayOfWeek::Monday, at(23, 0)), Some(16.5));
    /// ```
    #[must_use]
    pub fn setpoint_at(&self, day: DayOfWeek, time: TimeOfDay) -> Option<f64> {
        if let Some(temperature) = self.day(day).latest_setpoint(Some(time.minutes())) {
            return Some(temperature);
        }

        let mut candidate = day;
        for _ in 0..7 {
            candidate = candidate.previous();
            if let Some(temperature) = self.day(candidate).latest_setpoint(None) {
                return Some(temperature);
            }
        }
        None
    }

    /// Returns the setpoint in effect at a local date and time.
    #[must_use]
    pub fn current_setpoint(&self, now: NaiveDateTime) -> Option<f64> {
        let day = DayOfWeek::from_chrono(now.weekday());
        // Truncation is safe: chrono hours are 0-23 and minutes 0-59
        #[allow(clippy::cast_possible_truncation)]
        let time = TimeOfDay::new(now.hour() as u8, now.minute() as u8).ok()?;
        self.setpoint_at(day, time)
    }
}

impl Default for WeeklySchedule {
    fn default() -> Self {
        Self::from_fn(|_| DaySchedule::constant(DEFAULT_TEMPERATURE))
    }
}

impl Index<DayOfWeek> for WeeklySchedule {
    type Output = DaySchedule;

    fn index(&self, day: DayOfWeek) -> &Self::Output {
        self.day(day)
    }
}

impl IndexMut<DayOfWeek> for WeeklySchedule {
    fn index_mut(&mut self, day: DayOfWeek) -> &mut Self::Output {
        self.day_mut(day)
    }
}

/// Device wire form of a weekly schedule: one encoded string per day.
///
/// Serializes as a JSON object keyed by day (`"sunday"` .. `"saturday"`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct MqttWeeklySchedule {
    /// Sunday's encoded transitions.
    pub sunday: String,
    /// Monday's encoded transitions.
    pub monday: String,
    /// Tuesday's encoded transitions.
    pub tuesday: String,
    /// Wednesday's encoded transitions.
    pub wednesday: String,
    /// Thursday's encoded transitions.
    pub thursday: String,
    /// Friday's encoded transitions.
    pub friday: String,
    /// Saturday's encoded transitions.
    pub saturday: String,
}

impl MqttWeeklySchedule {
    /// Builds the wire schedule by calling `f` once per day, Sunday first.
    #[must_use]
    pub fn from_fn(mut f: impl FnMut(DayOfWeek) -> String) -> Self {
        Self {
            sunday: f(DayOfWeek::Sunday),
            monday: f(DayOfWeek::Monday),
            tuesday: f(DayOfWeek::Tuesday),
            wednesday: f(DayOfWeek::Wednesday),
            thursday: f(DayOfWeek::Thursday),
            friday: f(DayOfWeek::Friday),
            saturday: f(DayOfWeek::Saturday),
        }
    }

    /// Returns the encoded string for a day.
    #[must_use]
    pub fn get(&self, day: DayOfWeek) -> &str {
        match day {
            DayOfWeek::Sunday => &self.sunday,
            DayOfWeek::Monday => &self.monday,
            DayOfWeek::Tuesday => &self.tuesday,
            DayOfWeek::Wednesday => &self.wednesday,
            DayOfWeek::Thursday => &self.thursday,
            DayOfWeek::Friday => &self.friday,
            DayOfWeek::Saturday => &self.saturday,
        }
    }

    /// Iterates over `(day, encoded)` pairs, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &str)> {
        DayOfWeek::ALL.into_iter().map(|day| (day, self.get(day)))
    }
}
