// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT topic construction from free-form device names.
//!
//! Device names come from user configuration and end up inside a publish
//! topic. Wildcards (`+`, `#`), the level separator (`/`) and NUL would
//! change which topic is addressed, so they are replaced before use.
//!
//! ```text
//! base:    zigbee2mqtt
//! device:  "living/room#1"  →  "living_room_1"
//! topic:   zigbee2mqtt/living_room_1/set
//! ```

/// Replacement for forbidden characters.
const REPLACEMENT: char = '_';

/// Maximum segment length, in characters.
pub const MAX_TOPIC_SEGMENT_LEN: usize = 256;

/// Fallback used when the device name is missing or blank.
pub const DEFAULT_TOPIC_FALLBACK: &str = "unknown_device";

fn is_forbidden(c: char) -> bool {
    matches!(c, '+' | '#' | '/' | '\0')
}

/// Result of sanitizing a topic segment.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SanitizedSegment {
    /// The segment safe to interpolate into a topic.
    pub value: String,
    /// `true` if `value` differs from the untrimmed input.
    pub was_modified: bool,
    /// The input as given, if any.
    pub original_value: Option<String>,
}

/// Sanitizes a device name for use as a single topic level.
///
/// Missing or blank input yields `fallback`. Otherwise the input is trimmed,
/// forbidden characters become `_` and the result is cut to
/// [`MAX_TOPIC_SEGMENT_LEN`] characters.
///
/// # Examples
///
/// ```
/// use trv_schedule::topic::{sanitize_mqtt_topic_segment, DEFAULT_TOPIC_FALLBACK};
///
/// let s = sanitize_mqtt_topic_segment(Some("device+name"), DEFAULT_TOPIC_FALLBACK);
/// assert_eq!(s.value, "device_name");
/// assert!(s.was_modified);
///
/// let s = sanitize_mqtt_topic_segment(Some("living_room_trvzb"), DEFAULT_TOPIC_FALLBACK);
/// assert_eq!(s.value, "living_room_trvzb");
/// assert!(!s.was_modified);
///
/// let s = sanitize_mqtt_topic_segment(Some(""), DEFAULT_TOPIC_FALLBACK);
/// assert_eq!(s.value, "unknown_device");
/// ```
#[must_use]
pub fn sanitize_mqtt_topic_segment(input: Option<&str>, fallback: &str) -> SanitizedSegment {
    let original_value = input.map(str::to_string);

    let Some(raw) = input.filter(|s| !s.trim().is_empty()) else {
        return SanitizedSegment {
            value: fallback.to_string(),
            was_modified: true,
            original_value,
        };
    };

    let value: String = raw
        .trim()
        .chars()
        .map(|c| if is_forbidden(c) { REPLACEMENT } else { c })
        .take(MAX_TOPIC_SEGMENT_LEN)
        .collect();

    SanitizedSegment {
        was_modified: value != raw,
        value,
        original_value,
    }
}

/// Returns `true` if the input can be used as a topic level unchanged.
///
/// # Examples
///
/// ```
/// use trv_schedule::topic::is_valid_mqtt_topic_segment;
///
/// assert!(is_valid_mqtt_topic_segment(Some("bedroom_trv")));
/// assert!(!is_valid_mqtt_topic_segment(Some("bedroom/trv")));
/// assert!(!is_valid_mqtt_topic_segment(Some("   ")));
/// assert!(!is_valid_mqtt_topic_segment(None));
/// ```
#[must_use]
pub fn is_valid_mqtt_topic_segment(input: Option<&str>) -> bool {
    input.is_some_and(|s| {
        !s.trim().is_empty() && s.chars().count() <= MAX_TOPIC_SEGMENT_LEN && !s.contains(is_forbidden)
    })
}

/// Builds the command topic `<base>/<device>/set`, sanitizing the device.
///
/// A warning is logged when the device name had to be altered.
#[must_use]
pub fn set_topic(base_topic: &str, device: &str) -> String {
    let segment = sanitize_mqtt_topic_segment(Some(device), DEFAULT_TOPIC_FALLBACK);
    if segment.was_modified {
        tracing::warn!(
            original = %device,
            sanitized = %segment.value,
            "Device name sanitized for MQTT topic"
        );
    }
    format!("{base_topic}/{}/set", segment.value)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sanitize(input: &str) -> SanitizedSegment {
        sanitize_mqtt_topic_segment(Some(input), DEFAULT_TOPIC_FALLBACK)
    }

    #[test]
    fn replaces_every_forbidden_character() {
        let s = sanitize("a+b#c/d\0e");
        assert_eq!(s.value, "a_b_c_d_e");
        assert!(s.was_modified);
        assert_eq!(s.original_value.as_deref(), Some("a+b#c/d\0e"));
    }

    #[test]
    fn traversal_attempt_stays_in_one_level() {
        let s = sanitize("../../#");
        assert_eq!(s.value, ".._..__");
        assert!(!s.value.contains('/'));
    }

    #[test]
    fn missing_or_blank_uses_fallback() {
        let s = sanitize_mqtt_topic_segment(None, DEFAULT_TOPIC_FALLBACK);
        assert_eq!(s.value, "unknown_device");
        assert!(s.was_modified);
        assert_eq!(s.original_value, None);

        let s = sanitize_mqtt_topic_segment(Some(" \t "), "custom");
        assert_eq!(s.value, "custom");
        assert!(s.was_modified);
    }

    #[test]
    fn trimming_alone_counts_as_modified() {
        let s = sanitize("  bedroom  ");
        assert_eq!(s.value, "bedroom");
        assert!(s.was_modified);
    }

    #[test]
    fn truncates_to_max_chars() {
        let long = "é".repeat(300);
        let s = sanitize(&long);
        assert_eq!(s.value.chars().count(), MAX_TOPIC_SEGMENT_LEN);
        assert!(s.was_modified);

        let exact = "x".repeat(MAX_TOPIC_SEGMENT_LEN);
        assert!(!sanitize(&exact).was_modified);
    }

    #[test]
    fn validity_predicate() {
        assert!(is_valid_mqtt_topic_segment(Some("living_room_trvzb")));
        assert!(!is_valid_mqtt_topic_segment(Some("a+b")));
        assert!(!is_valid_mqtt_topic_segment(Some("a\0b")));
        assert!(!is_valid_mqtt_topic_segment(Some(&"x".repeat(257))));
        assert!(is_valid_mqtt_topic_segment(Some(&"x".repeat(256))));
    }

    #[test]
    fn set_topic_sanitizes_device() {
        assert_eq!(set_topic("zigbee2mqtt", "bedroom"), "zigbee2mqtt/bedroom/set");
        assert_eq!(set_topic("zigbee2mqtt", "bed/room"), "zigbee2mqtt/bed_room/set");
        assert_eq!(set_topic("zigbee2mqtt", ""), "zigbee2mqtt/unknown_device/set");
    }
}
