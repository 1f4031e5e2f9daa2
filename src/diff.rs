// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Minimal change sets between two weekly schedules.
//!
//! Days are compared by their canonical encoding, so reordering the
//! transitions of a day never counts as a change. Only changed days are
//! sent to the device, each under its own `weekly_schedule_<day>` key.
//!
//! # Examples
//!
//! ```
//! use trv_schedule::diff::{build_partial_payload, compute_schedule_diff};
//! use trv_schedule::schedule::{DaySchedule, Transition, WeeklySchedule};
//! use trv_schedule::types::DayOfWeek;
//!
//! let original = WeeklySchedule::default();
//! let mut modified = original.clone();
//! modified[DayOfWeek::Monday].push(Transition::new("06:00", 21.0));
//!
//! let diff = compute_schedule_diff(&original, &modified);
//! assert_eq!(diff.changed_days(), vec![DayOfWeek::Monday]);
//!
//! let payload = build_partial_payload(&diff);
//! assert_eq!(payload.to_json().unwrap(), r#"{"weekly_schedule_monday":"00:00/20 06:00/21"}"#);
//! ```

use std::collections::BTreeMap;

use serde::Serialize;

use crate::error::ParseError;
use crate::schedule::{WeeklySchedule, serialize_day_schedule};
use crate::types::DayOfWeek;

/// Prefix of per-day keys in the partial payload.
pub const PAYLOAD_KEY_PREFIX: &str = "weekly_schedule_";

/// Days whose encoded content changed, with their new encoding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ScheduleDiff {
    changes: BTreeMap<DayOfWeek, String>,
}

impl ScheduleDiff {
    /// A diff that rewrites every day of `schedule`.
    ///
    /// Used when the device's current content is unknown.
    #[must_use]
    pub fn full(schedule: &WeeklySchedule) -> Self {
        Self {
            changes: schedule
                .iter()
                .map(|(day, d)| (day, serialize_day_schedule(d)))
                .collect(),
        }
    }

    /// Returns `true` if at least one day changed.
    #[must_use]
    pub fn has_changes(&self) -> bool {
        !self.changes.is_empty()
    }

    /// Returns the changed days, Sunday first.
    #[must_use]
    pub fn changed_days(&self) -> Vec<DayOfWeek> {
        self.changes.keys().copied().collect()
    }

    /// Returns the new encoding of a changed day.
    #[must_use]
    pub fn get(&self, day: DayOfWeek) -> Option<&str> {
        self.changes.get(&day).map(String::as_str)
    }

    /// Iterates over `(day, new encoding)` pairs, Sunday first.
    pub fn iter(&self) -> impl Iterator<Item = (DayOfWeek, &str)> {
        self.changes.iter().map(|(day, s)| (*day, s.as_str()))
    }
}

/// Compares two weeks day by day on their canonical encoding.
#[must_use]
pub fn compute_schedule_diff(original: &WeeklySchedule, modified: &WeeklySchedule) -> ScheduleDiff {
    let changes = DayOfWeek::ALL
        .into_iter()
        .filter_map(|day| {
            let before = serialize_day_schedule(original.day(day));
            let after = serialize_day_schedule(modified.day(day));
            (before != after).then_some((day, after))
        })
        .collect();
    ScheduleDiff { changes }
}

/// Update message carrying only changed days.
///
/// An empty payload means there is nothing to send.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct PartialPayload(BTreeMap<String, String>);

impl PartialPayload {
    /// Returns `true` if no day is included.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the number of days included.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Returns the encoding stored under `key`.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&str> {
        self.0.get(key).map(String::as_str)
    }

    /// Returns the keys, sorted.
    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.keys().map(String::as_str)
    }

    /// Encodes the payload as a JSON object.
    ///
    /// # Errors
    ///
    /// Returns [`ParseError::Json`] if serialization fails.
    pub fn to_json(&self) -> Result<String, ParseError> {
        serde_json::to_string(&self.0).map_err(ParseError::from)
    }
}

/// Returns the payload key for a day (`weekly_schedule_monday`).
#[must_use]
pub fn payload_key(day: DayOfWeek) -> String {
    format!("{PAYLOAD_KEY_PREFIX}{}", day.key())
}

/// Builds the update message for the changed days of a diff.
#[must_use]
pub fn build_partial_payload(diff: &ScheduleDiff) -> PartialPayload {
    PartialPayload(
        diff.iter()
            .map(|(day, encoded)| (payload_key(day), encoded.to_string()))
            .collect(),
    )
}
