// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! MQTT publisher backed by `rumqttc`.

use std::sync::atomic::{AtomicU64, Ordering};
use std::time::Duration;

use rumqttc::{AsyncClient, EventLoop, MqttOptions, QoS};
use tokio::sync::watch;

use crate::error::ProtocolError;
use crate::protocol::Publisher;

/// Global counter for generating unique client IDs.
static CLIENT_ID_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Default MQTT port.
const DEFAULT_PORT: u16 = 1883;

/// Default time to wait for the broker's CONNACK.
const DEFAULT_CONNECT_TIMEOUT: Duration = Duration::from_secs(5);

/// Delay before polling again after an event loop error.
const RECONNECT_DELAY: Duration = Duration::from_secs(2);

/// Publishes schedule updates to an MQTT broker.
///
/// Messages are sent with QoS 1 and without the retain flag, so a device
/// that is offline does not apply a stale schedule when it reconnects.
///
/// # Examples
///
/// ```ignore
/// use trv_schedule::protocol::{MqttPublisher, Publisher};
///
/// let publisher = MqttPublisher::connect("mqtt://192.168.1.50:1883").await?;
/// publisher
///     .publish("zigbee2mqtt/bedroom_trv/set", r#"{"weekly_schedule_monday":"00:00/20"}"#)
///     .await?;
/// ```
#[derive(Debug, Clone)]
pub struct MqttPublisher {
    client: AsyncClient,
    connected: watch::Receiver<bool>,
}

impl MqttPublisher {
    /// Connects to a broker with default settings.
    ///
    /// # Arguments
    ///
    /// * `broker_url` - `mqtt://host:port`, `tcp://host:port` or `host[:port]`
    ///
    /// # Errors
    ///
    /// Returns error if the URL is invalid or the broker does not
    /// acknowledge the connection in time.
    pub async fn connect(broker_url: impl Into<String>) -> Result<Self, ProtocolError> {
        MqttPublisherBuilder::new().broker(broker_url).build().await
    }

    /// Returns a builder for custom configuration.
    #[must_use]
    pub fn builder() -> MqttPublisherBuilder {
        MqttPublisherBuilder::new()
    }

    /// Returns `true` while the broker connection is established.
    #[must_use]
    pub fn is_connected(&self) -> bool {
        *self.connected.borrow()
    }
}

impl Publisher for MqttPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        tracing::debug!(topic = %topic, payload = %payload, "Publishing MQTT message");

        self.client
            .publish(topic, QoS::AtLeastOnce, false, payload)
            .await
            .map_err(ProtocolError::Mqtt)
    }
}

/// Parses an MQTT URL into host and port.
fn parse_mqtt_url(url: &str) -> Result<(String, u16), ProtocolError> {
    let url = url
        .strip_prefix("mqtt://")
        .or_else(|| url.strip_prefix("tcp://"))
        .unwrap_or(url);

    let (host, port) = if let Some((h, p)) = url.rsplit_once(':') {
        let port = p
            .parse()
            .map_err(|_| ProtocolError::InvalidAddress(format!("Invalid port: {p}")))?;
        (h.to_string(), port)
    } else {
        (url.to_string(), DEFAULT_PORT)
    };

    if host.is_empty() {
        return Err(ProtocolError::InvalidAddress(format!(
            "Missing host in broker URL: {url}"
        )));
    }

    Ok((host, port))
}

/// Drives the MQTT event loop and tracks connection state.
async fn handle_mqtt_events(mut event_loop: EventLoop, connected: watch::Sender<bool>) {
    use rumqttc::{Event, Packet};

    loop {
        match event_loop.poll().await {
            Ok(Event::Incoming(Packet::ConnAck(connack))) => {
                tracing::debug!(?connack, "MQTT connected");
                connected.send_replace(true);
            }
            Ok(Event::Incoming(Packet::PubAck(puback))) => {
                tracing::trace!(pkid = puback.pkid, "MQTT publish acknowledged");
            }
            Ok(_) => {}
            Err(e) => {
                connected.send_replace(false);
                if connected.is_closed() {
                    tracing::debug!("MQTT publisher dropped, stopping event loop");
                    break;
                }
                tracing::warn!(error = %e, "MQTT event loop error");
                tokio::time::sleep(RECONNECT_DELAY).await;
            }
        }
    }
}

/// Builder for creating an MQTT publisher with custom configuration.
#[derive(Debug, Default)]
pub struct MqttPublisherBuilder {
    broker: Option<String>,
    username: Option<String>,
    password: Option<String>,
    client_id: Option<String>,
    keep_alive: Option<Duration>,
    connect_timeout: Option<Duration>,
}

impl MqttPublisherBuilder {
    /// Creates a new builder.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Sets the MQTT broker URL.
    #[must_use]
    pub fn broker(mut self, broker: impl Into<String>) -> Self {
        self.broker = Some(broker.into());
        self
    }

    /// Sets authentication credentials for the MQTT broker.
    #[must_use]
    pub fn credentials(mut self, username: impl Into<String>, password: impl Into<String>) -> Self {
        self.username = Some(username.into());
        self.password = Some(password.into());
        self
    }

    /// Sets a custom client ID.
    #[must_use]
    pub fn client_id(mut self, id: impl Into<String>) -> Self {
        self.client_id = Some(id.into());
        self
    }

    /// Sets the keep-alive interval.
    #[must_use]
    pub fn keep_alive(mut self, duration: Duration) -> Self {
        self.keep_alive = Some(duration);
        self
    }

    /// Sets how long to wait for the broker to accept the connection.
    #[must_use]
    pub fn connect_timeout(mut self, duration: Duration) -> Self {
        self.connect_timeout = Some(duration);
        self
    }

    /// Builds and connects the publisher.
    ///
    /// # Errors
    ///
    /// Returns error if the broker is missing or invalid, or if no CONNACK
    /// arrives within the connect timeout.
    pub async fn build(self) -> Result<MqttPublisher, ProtocolError> {
        let broker = self
            .broker
            .ok_or_else(|| ProtocolError::InvalidAddress("broker is required".to_string()))?;

        let (host, port) = parse_mqtt_url(&broker)?;

        // Generate or use provided client ID (PID + counter to avoid conflicts)
        let client_id = self.client_id.unwrap_or_else(|| {
            let counter = CLIENT_ID_COUNTER.fetch_add(1, Ordering::Relaxed);
            format!("trv_schedule_{}_{}", std::process::id(), counter)
        });

        let mut mqtt_options = MqttOptions::new(&client_id, host, port);
        mqtt_options.set_keep_alive(self.keep_alive.unwrap_or(Duration::from_secs(30)));
        mqtt_options.set_clean_session(true);

        if let (Some(username), Some(password)) = (self.username, self.password) {
            mqtt_options.set_credentials(username, password);
        }

        let (client, event_loop) = AsyncClient::new(mqtt_options, 10);
        let (connected_tx, mut connected_rx) = watch::channel(false);

        tokio::spawn(handle_mqtt_events(event_loop, connected_tx));

        let timeout = self.connect_timeout.unwrap_or(DEFAULT_CONNECT_TIMEOUT);
        match tokio::time::timeout(timeout, connected_rx.wait_for(|connected| *connected)).await {
            Ok(Ok(_)) => {}
            Ok(Err(_)) => {
                return Err(ProtocolError::ChannelClosed(
                    "MQTT event loop stopped".to_string(),
                ));
            }
            Err(_) => {
                let _ = client.disconnect().await;
                return Err(ProtocolError::ConnectionFailed(format!(
                    "no CONNACK from {broker} within {} ms",
                    timeout.as_millis()
                )));
            }
        }

        tracing::debug!(client_id = %client_id, broker = %broker, "MQTT publisher ready");

        Ok(MqttPublisher {
            client,
            connected: connected_rx,
        })
    }
}
