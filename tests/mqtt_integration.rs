// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Integration tests for the MQTT publisher using mockforge-mqtt.

#![cfg(feature = "mqtt")]

use std::sync::Arc;
use std::time::Duration;

use mockforge_mqtt::broker::MqttConfig;
use mockforge_mqtt::start_mqtt_server;
use tokio::time::sleep;
use trv_schedule::config::SyncConfig;
use trv_schedule::error::ProtocolError;
use trv_schedule::protocol::{MqttPublisher, Publisher};
use trv_schedule::schedule::{MqttWeeklySchedule, parse_day_schedule};
use trv_schedule::store::MemoryStore;
use trv_schedule::sync::{SaveOutcome, ScheduleSynchronizer, UiEvent};
use trv_schedule::types::DayOfWeek;

/// Helper to find an available port for testing.
fn get_test_port() -> u16 {
    use std::sync::atomic::{AtomicU16, Ordering};
    static PORT_COUNTER: AtomicU16 = AtomicU16::new(18950);
    PORT_COUNTER.fetch_add(1, Ordering::SeqCst)
}

/// Starts a mock MQTT broker on the given port.
async fn start_mock_broker(port: u16) {
    let config = MqttConfig {
        port,
        host: "127.0.0.1".to_string(),
        ..Default::default()
    };

    tokio::spawn(async move {
        let _ = start_mqtt_server(config).await;
    });

    // Give the broker time to bind
    sleep(Duration::from_millis(500)).await;
}

// ============================================================================
// Connection
// ============================================================================

mod connection {
    use super::*;

    #[tokio::test]
    async fn connect_to_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttPublisher::connect(format!("mqtt://127.0.0.1:{port}")).await;

        assert!(result.is_ok(), "Failed to connect: {:?}", result.err());
        assert!(result.unwrap().is_connected());
    }

    #[tokio::test]
    async fn connect_with_tcp_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttPublisher::connect(format!("tcp://127.0.0.1:{port}")).await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_scheme() {
        let port = get_test_port();
        start_mock_broker(port).await;

        let result = MqttPublisher::builder()
            .broker(format!("127.0.0.1:{port}"))
            .client_id("schedule_card")
            .keep_alive(Duration::from_secs(10))
            .build()
            .await;
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn connect_without_broker_times_out() {
        let port = get_test_port();

        let result = MqttPublisher::builder()
            .broker(format!("mqtt://127.0.0.1:{port}"))
            .connect_timeout(Duration::from_millis(300))
            .build()
            .await;

        assert!(matches!(result, Err(ProtocolError::ConnectionFailed(_))));
    }
}

// ============================================================================
// Publishing
// ============================================================================

mod publishing {
    use super::*;

    #[tokio::test]
    async fn publish_schedule_payload() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let publisher = MqttPublisher::connect(format!("mqtt://127.0.0.1:{port}"))
            .await
            .unwrap();

        let result = publisher
            .publish(
                "zigbee2mqtt/living_room_trvzb/set",
                r#"{"weekly_schedule_monday":"00:00/18 06:00/21"}"#,
            )
            .await;

        assert!(result.is_ok(), "Publish failed: {:?}", result.err());
    }

    #[tokio::test]
    async fn synchronizer_saves_through_broker() {
        let port = get_test_port();
        start_mock_broker(port).await;
        let publisher = MqttPublisher::connect(format!("mqtt://127.0.0.1:{port}"))
            .await
            .unwrap();

        let store = Arc::new(MemoryStore::new());
        store.set_schedule(
            "sensor",
            "living_room_trvzb",
            &MqttWeeklySchedule::from_fn(|_| "00:00/18 06:00/21 22:00/18".to_string()),
        );
        let sync = ScheduleSynchronizer::new(Arc::clone(&store), publisher);
        sync.configure(SyncConfig::new("living_room_trvzb")).unwrap();

        sync.handle_event(UiEvent::ScheduleChanged {
            day: DayOfWeek::Saturday,
            schedule: parse_day_schedule("00:00/18 08:00/21 23:00/18").unwrap(),
        });

        assert_eq!(
            sync.save().await,
            SaveOutcome::Published {
                save_id: 1,
                changed_days: vec![DayOfWeek::Saturday],
            }
        );
    }
}
