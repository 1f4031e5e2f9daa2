// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Error types for the `trv_schedule` library.
//!
//! This module provides the error hierarchy used across the library:
//! malformed wire data, out-of-range values, aggregated validation
//! messages, missing status sensors and transport failures.

use thiserror::Error;

/// The main error type for this library.
#[derive(Debug, Error)]
pub enum Error {
    /// A value was outside its permitted numeric domain.
    #[error("value error: {0}")]
    Value(#[from] ValueError),

    /// Malformed time, token or JSON data.
    #[error("parse error: {0}")]
    Parse(#[from] ParseError),

    /// Remote publish call failed.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),

    /// A schedule failed validation.
    #[error("validation failed: {0}")]
    Validation(#[from] ValidationError),

    /// One or more required status sensors are absent or unavailable.
    #[error("missing schedule data for: {}", entities.join(", "))]
    MissingData {
        /// Entity identifiers that had no usable value.
        entities: Vec<String>,
    },

    /// The synchronizer configuration is invalid.
    #[error("invalid configuration: {0}")]
    InvalidConfiguration(String),
}

/// Errors raised when a value is outside its permitted range.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum ValueError {
    /// Hour component is greater than 23.
    #[error("hour {0} is out of range [0, 23]")]
    HourOutOfRange(u32),

    /// Minute component is greater than 59.
    #[error("minute {0} is out of range [0, 59]")]
    MinuteOutOfRange(u32),

    /// Minutes since midnight outside `[0, 1440)`.
    #[error("minutes of day {0} is out of range [0, 1440)")]
    MinutesOfDayOutOfRange(i64),

    /// A time option step of zero minutes was requested.
    #[error("time option step must be a positive number of minutes")]
    ZeroStep,
}

/// Errors raised when text does not have the expected syntax.
#[derive(Debug, Error)]
pub enum ParseError {
    /// A time string is not exactly `HH:mm`.
    #[error("invalid time format: {0:?} (expected HH:mm)")]
    InvalidTime(String),

    /// A schedule token is not `HH:mm/T`.
    #[error("invalid schedule token: {0:?} (expected HH:mm/temperature)")]
    InvalidToken(String),

    /// A temperature is not a finite number.
    #[error("invalid temperature: {0:?}")]
    InvalidTemperature(String),

    /// A day key is not one of `sunday`..`saturday`.
    #[error("unknown day: {0:?}")]
    UnknownDay(String),

    /// JSON encoding or decoding failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),
}

/// Errors related to the remote publish call.
#[derive(Debug, Error)]
pub enum ProtocolError {
    /// MQTT client request failed.
    #[cfg(feature = "mqtt")]
    #[error("MQTT error: {0}")]
    Mqtt(#[from] rumqttc::ClientError),

    /// Connection to the broker failed.
    #[error("connection failed: {0}")]
    ConnectionFailed(String),

    /// Invalid broker URL or address.
    #[error("invalid address: {0}")]
    InvalidAddress(String),

    /// Publish was rejected or could not be delivered.
    #[error("publish failed: {0}")]
    PublishFailed(String),

    /// Internal channel was closed.
    #[error("channel closed: {0}")]
    ChannelClosed(String),
}

/// Aggregate of human-readable validation messages.
///
/// The validator never raises this; it is built from a
/// [`ValidationResult`](crate::validation::ValidationResult) when a caller
/// wants to treat an invalid schedule as an error.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
#[error("{}", messages.join("; "))]
pub struct ValidationError {
    /// Messages in the order the checks produced them.
    pub messages: Vec<String>,
}

/// A specialized Result type for this library.
pub type Result<T> = std::result::Result<T, Error>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn value_error_display() {
        let err = ValueError::HourOutOfRange(24);
        assert_eq!(err.to_string(), "hour 24 is out of range [0, 23]");
    }

    #[test]
    fn error_from_value_error() {
        let err: Error = ValueError::MinuteOutOfRange(60).into();
        assert!(matches!(err, Error::Value(ValueError::MinuteOutOfRange(60))));
    }

    #[test]
    fn parse_error_display() {
        let err = ParseError::InvalidTime("6:00".to_string());
        assert_eq!(
            err.to_string(),
            "invalid time format: \"6:00\" (expected HH:mm)"
        );
    }

    #[test]
    fn missing_data_lists_entities() {
        let err = Error::MissingData {
            entities: vec![
                "sensor.trv_weekly_schedule_sunday".to_string(),
                "sensor.trv_weekly_schedule_monday".to_string(),
            ],
        };
        assert_eq!(
            err.to_string(),
            "missing schedule data for: sensor.trv_weekly_schedule_sunday, sensor.trv_weekly_schedule_monday"
        );
    }

    #[test]
    fn validation_error_joins_messages() {
        let err = ValidationError {
            messages: vec!["a".to_string(), "b".to_string()],
        };
        assert_eq!(err.to_string(), "a; b");
    }
}
