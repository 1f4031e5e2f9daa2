// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Access to the per-day schedule status sensors.
//!
//! The home-automation platform exposes one sensor per day whose state is
//! that day's encoded schedule:
//!
//! ```text
//! sensor.living_room_trv_weekly_schedule_sunday  →  "00:00/17 06:30/21"
//! sensor.living_room_trv_weekly_schedule_monday  →  "unavailable"
//! ```
//!
//! A missing entity and an "unavailable"-style state both mean there is no
//! data for that day.

mod memory;

pub use memory::MemoryStore;

use crate::schedule::MqttWeeklySchedule;
use crate::types::DayOfWeek;

/// States that mean a sensor has no usable value (compared case-insensitively).
const UNAVAILABLE_STATES: [&str; 6] = ["", "unavailable", "unknown", "none", "null", "n/a"];

/// Read-only access to entity states.
pub trait StatusStore: Send + Sync {
    /// Returns the current state of an entity, or `None` if it does not exist.
    fn state(&self, entity_id: &str) -> Option<String>;
}

impl<T: StatusStore + ?Sized> StatusStore for std::sync::Arc<T> {
    fn state(&self, entity_id: &str) -> Option<String> {
        (**self).state(entity_id)
    }
}

/// Returns the entity id of a day's schedule sensor.
///
/// # Examples
///
/// ```
/// use trv_schedule::store::schedule_entity_id;
/// use trv_schedule::types::DayOfWeek;
///
/// assert_eq!(
///     schedule_entity_id("sensor", "bedroom_trv", DayOfWeek::Monday),
///     "sensor.bedroom_trv_weekly_schedule_monday"
/// );
/// ```
#[must_use]
pub fn schedule_entity_id(namespace: &str, device: &str, day: DayOfWeek) -> String {
    format!("{namespace}.{device}_weekly_schedule_{}", day.key())
}

/// Returns `true` if a state value carries no schedule data.
#[must_use]
pub fn is_unavailable(state: &str) -> bool {
    let state = state.trim();
    UNAVAILABLE_STATES
        .iter()
        .any(|marker| marker.eq_ignore_ascii_case(state))
}

/// Raw states of the seven schedule sensors at one point in time.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleStates {
    states: [Option<String>; 7],
}

impl ScheduleStates {
    /// Reads all seven sensors from the store.
    #[must_use]
    pub fn read<S: StatusStore + ?Sized>(store: &S, namespace: &str, device: &str) -> Self {
        Self {
            states: DayOfWeek::ALL.map(|day| store.state(&schedule_entity_id(namespace, device, day))),
        }
    }

    /// Creates a snapshot from explicit values, Sunday first.
    #[must_use]
    pub fn from_states(states: [Option<String>; 7]) -> Self {
        Self { states }
    }

    /// Returns the raw state of a day's sensor.
    #[must_use]
    pub fn get(&self, day: DayOfWeek) -> Option<&str> {
        self.states[day.index()].as_deref()
    }

    /// Returns the usable schedule string of a day, if any.
    #[must_use]
    pub fn available(&self, day: DayOfWeek) -> Option<&str> {
        self.get(day).filter(|s| !is_unavailable(s))
    }

    /// Returns the days that have no usable value.
    #[must_use]
    pub fn missing_days(&self) -> Vec<DayOfWeek> {
        DayOfWeek::ALL
            .into_iter()
            .filter(|day| self.available(*day).is_none())
            .collect()
    }

    /// Converts to the wire schedule when every day has a usable value.
    #[must_use]
    pub fn to_wire(&self) -> Option<MqttWeeklySchedule> {
        if !self.missing_days().is_empty() {
            return None;
        }
        Some(MqttWeeklySchedule::from_fn(|day| {
            self.available(day).unwrap_or_default().to_string()
        }))
    }

    /// Returns `true` if every day's state equals the expected encoding exactly.
    #[must_use]
    pub fn matches(&self, expected: &MqttWeeklySchedule) -> bool {
        expected
            .iter()
            .all(|(day, encoded)| self.get(day) == Some(encoded))
    }
}
