// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronizer configuration.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::Error;
use crate::store::schedule_entity_id;
use crate::topic::set_topic;
use crate::types::DayOfWeek;

/// Default namespace of the schedule status sensors.
pub const DEFAULT_ENTITY_NAMESPACE: &str = "sensor";

/// Default base topic of the Zigbee bridge.
pub const DEFAULT_MQTT_BASE_TOPIC: &str = "zigbee2mqtt";

/// Default time to wait for the device to confirm a save.
pub const DEFAULT_CONFIRMATION_TIMEOUT_SECS: u64 = 30;

/// Target device and bus settings for a [`ScheduleSynchronizer`].
///
/// Deserializes from the card-style configuration object, where only
/// `device` is required:
///
/// ```
/// use trv_schedule::config::SyncConfig;
///
/// let config: SyncConfig = serde_json::from_str(r#"{"device": "living_room_trvzb"}"#).unwrap();
/// assert_eq!(config.entity_namespace, "sensor");
/// assert_eq!(config.mqtt_base_topic, "zigbee2mqtt");
/// assert_eq!(config.confirmation_timeout_secs, 30);
///
/// let config = SyncConfig::new("bedroom_trv")
///     .with_mqtt_base_topic("z2m")
///     .with_confirmation_timeout_secs(10);
/// assert_eq!(config.set_topic(), "z2m/bedroom_trv/set");
/// ```
///
/// [`ScheduleSynchronizer`]: crate::sync::ScheduleSynchronizer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncConfig {
    /// Device name as known to the bridge and the status sensors.
    pub device: String,
    /// Namespace of the schedule status sensors.
    #[serde(default = "default_entity_namespace")]
    pub entity_namespace: String,
    /// Base topic under which device commands are published.
    #[serde(default = "default_mqtt_base_topic")]
    pub mqtt_base_topic: String,
    /// Seconds to wait for the device to report a saved schedule.
    #[serde(default = "default_confirmation_timeout_secs")]
    pub confirmation_timeout_secs: u64,
}

fn default_entity_namespace() -> String {
    DEFAULT_ENTITY_NAMESPACE.to_string()
}

fn default_mqtt_base_topic() -> String {
    DEFAULT_MQTT_BASE_TOPIC.to_string()
}

fn default_confirmation_timeout_secs() -> u64 {
    DEFAULT_CONFIRMATION_TIMEOUT_SECS
}

impl SyncConfig {
    /// Creates a configuration for `device` with default settings.
    #[must_use]
    pub fn new(device: impl Into<String>) -> Self {
        Self {
            device: device.into(),
            entity_namespace: default_entity_namespace(),
            mqtt_base_topic: default_mqtt_base_topic(),
            confirmation_timeout_secs: DEFAULT_CONFIRMATION_TIMEOUT_SECS,
        }
    }

    /// Sets the sensor namespace.
    #[must_use]
    pub fn with_entity_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.entity_namespace = namespace.into();
        self
    }

    /// Sets the base topic.
    #[must_use]
    pub fn with_mqtt_base_topic(mut self, base_topic: impl Into<String>) -> Self {
        self.mqtt_base_topic = base_topic.into();
        self
    }

    /// Sets the confirmation timeout in seconds.
    #[must_use]
    pub fn with_confirmation_timeout_secs(mut self, secs: u64) -> Self {
        self.confirmation_timeout_secs = secs;
        self
    }

    /// Returns the confirmation timeout.
    #[must_use]
    pub fn confirmation_timeout(&self) -> Duration {
        Duration::from_secs(self.confirmation_timeout_secs)
    }

    /// Returns the topic that schedule updates are published on.
    #[must_use]
    pub fn set_topic(&self) -> String {
        set_topic(&self.mqtt_base_topic, &self.device)
    }

    /// Returns the status sensor id for `day`.
    #[must_use]
    pub fn entity_id(&self, day: DayOfWeek) -> String {
        schedule_entity_id(&self.entity_namespace, &self.device, day)
    }

    /// Checks that required settings are present.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the device name, namespace
    /// or base topic is blank, or the timeout is zero.
    pub fn validate(&self) -> Result<(), Error> {
        if self.device.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "device is required".to_string(),
            ));
        }
        if self.entity_namespace.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "entity_namespace must not be empty".to_string(),
            ));
        }
        if self.mqtt_base_topic.trim().is_empty() {
            return Err(Error::InvalidConfiguration(
                "mqtt_base_topic must not be empty".to_string(),
            ));
        }
        if self.confirmation_timeout_secs == 0 {
            return Err(Error::InvalidConfiguration(
                "confirmation_timeout_secs must be greater than zero".to_string(),
            ));
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults() {
        let config = SyncConfig::new("trv");
        assert_eq!(config.entity_namespace, "sensor");
        assert_eq!(config.mqtt_base_topic, "zigbee2mqtt");
        assert_eq!(config.confirmation_timeout(), Duration::from_secs(30));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn deserialize_requires_device() {
        assert!(serde_json::from_str::<SyncConfig>("{}").is_err());
    }

    #[test]
    fn deserialize_overrides() {
        let config: SyncConfig = serde_json::from_str(
            r#"{"device":"trv","entity_namespace":"input_text","confirmation_timeout_secs":5}"#,
        )
        .unwrap();
        assert_eq!(config.entity_namespace, "input_text");
        assert_eq!(config.mqtt_base_topic, "zigbee2mqtt");
        assert_eq!(config.confirmation_timeout_secs, 5);
    }

    #[test]
    fn validate_rejects_blank_fields() {
        assert!(matches!(
            SyncConfig::new("  ").validate(),
            Err(Error::InvalidConfiguration(_))
        ));
        assert!(
            SyncConfig::new("trv")
                .with_entity_namespace("")
                .validate()
                .is_err()
        );
        assert!(
            SyncConfig::new("trv")
                .with_mqtt_base_topic(" ")
                .validate()
                .is_err()
        );
        assert!(
            SyncConfig::new("trv")
                .with_confirmation_timeout_secs(0)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn entity_and_topic_names() {
        let config = SyncConfig::new("kitchen+trv");
        assert_eq!(
            config.entity_id(DayOfWeek::Sunday),
            "sensor.kitchen+trv_weekly_schedule_sunday"
        );
        assert_eq!(config.set_topic(), "zigbee2mqtt/kitchen_trv/set");
    }
}
