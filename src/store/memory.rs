// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! In-memory status store.

use std::collections::HashMap;

use parking_lot::RwLock;

use super::{StatusStore, schedule_entity_id};
use crate::schedule::MqttWeeklySchedule;

/// Thread-safe in-memory [`StatusStore`].
///
/// Useful for tests and for feeding states received from another source
/// (for example a websocket subscription) into a synchronizer.
///
/// # Examples
///
/// ```
/// use trv_schedule::store::{MemoryStore, StatusStore};
///
/// let store = MemoryStore::new();
/// store.set("sensor.trv_weekly_schedule_monday", "00:00/20");
/// assert_eq!(store.state("sensor.trv_weekly_schedule_monday").as_deref(), Some("00:00/20"));
/// ```
#[derive(Debug, Default)]
pub struct MemoryStore {
    states: RwLock<HashMap<String, String>>,
}

impl MemoryStore {
    /// Creates an empty store.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the state of an entity.
    pub fn set(&self, entity_id: impl Into<String>, state: impl Into<String>) {
        self.states.write().insert(entity_id.into(), state.into());
    }

    /// Removes an entity. Returns `true` if it existed.
    pub fn remove(&self, entity_id: &str) -> bool {
        self.states.write().remove(entity_id).is_some()
    }

    /// Writes all seven schedule sensors of a device.
    pub fn set_schedule(&self, namespace: &str, device: &str, wire: &MqttWeeklySchedule) {
        let mut states = self.states.write();
        for (day, encoded) in wire.iter() {
            states.insert(
                schedule_entity_id(namespace, device, day),
                encoded.to_string(),
            );
        }
    }

    /// Returns the number of entities.
    #[must_use]
    pub fn len(&self) -> usize {
        self.states.read().len()
    }

    /// Returns `true` if the store holds no entities.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.states.read().is_empty()
    }
}

impl StatusStore for MemoryStore {
    fn state(&self, entity_id: &str) -> Option<String> {
        self.states.read().get(entity_id).cloned()
    }
}
