// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Remote publish call used to send schedule updates to the device.
//!
//! The synchronizer only needs a fire-and-report primitive: publish one
//! UTF-8 payload on one topic and learn whether that succeeded. The device
//! confirms the change later through its status sensors.
//!
//! # Implementations
//!
//! - [`MqttPublisher`]: publishes directly to an MQTT broker (feature `mqtt`)
//! - Any type implementing [`Publisher`], for example a bridge to the
//!   platform's own `mqtt.publish` service

#[cfg(feature = "mqtt")]
mod mqtt;

#[cfg(feature = "mqtt")]
pub use mqtt::{MqttPublisher, MqttPublisherBuilder};

use crate::error::ProtocolError;

/// Asynchronous publish primitive.
#[allow(async_fn_in_trait)]
pub trait Publisher {
    /// Publishes `payload` on `topic`.
    ///
    /// # Errors
    ///
    /// Returns `ProtocolError` if the message could not be handed to the
    /// transport.
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError>;
}

impl<T: Publisher + ?Sized> Publisher for std::sync::Arc<T> {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        (**self).publish(topic, payload).await
    }
}
