// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! End-to-end synchronizer scenarios with an in-memory store.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Duration;

use parking_lot::Mutex;
use trv_schedule::config::SyncConfig;
use trv_schedule::error::ProtocolError;
use trv_schedule::event::SyncEvent;
use trv_schedule::protocol::Publisher;
use trv_schedule::schedule::{
    MqttWeeklySchedule, parse_day_schedule, serialize_weekly_schedule,
};
use trv_schedule::store::MemoryStore;
use trv_schedule::sync::{
    ChangeOutcome, LoadOutcome, SaveOutcome, ScheduleSynchronizer, SyncState, UiEvent,
};
use trv_schedule::types::DayOfWeek;

const DEVICE: &str = "living_room_trvzb";

#[derive(Debug, Default)]
struct RecordingPublisher {
    messages: Mutex<Vec<(String, String)>>,
    offline: AtomicBool,
}

impl RecordingPublisher {
    fn messages(&self) -> Vec<(String, String)> {
        self.messages.lock().clone()
    }
}

impl Publisher for RecordingPublisher {
    async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
        if self.offline.load(Ordering::SeqCst) {
            return Err(ProtocolError::ConnectionFailed("broker offline".to_string()));
        }
        self.messages
            .lock()
            .push((topic.to_string(), payload.to_string()));
        Ok(())
    }
}

struct Harness {
    store: Arc<MemoryStore>,
    publisher: Arc<RecordingPublisher>,
    sync: ScheduleSynchronizer<Arc<MemoryStore>, Arc<RecordingPublisher>>,
}

impl Harness {
    fn new(week: &MqttWeeklySchedule) -> Self {
        let store = Arc::new(MemoryStore::new());
        store.set_schedule("sensor", DEVICE, week);
        let publisher = Arc::new(RecordingPublisher::default());
        let sync = ScheduleSynchronizer::new(Arc::clone(&store), Arc::clone(&publisher));
        Self {
            store,
            publisher,
            sync,
        }
    }

    /// Device applies a published payload to its sensors, one day at a time.
    fn apply_payload(&self, payload: &str) -> Vec<ChangeOutcome> {
        let json: serde_json::Map<String, serde_json::Value> =
            serde_json::from_str(payload).unwrap();
        json.into_iter()
            .map(|(key, value)| {
                let day = key.trim_start_matches("weekly_schedule_");
                self.store.set(
                    format!("sensor.{DEVICE}_{key}"),
                    value.as_str().unwrap().to_string(),
                );
                assert!(day.parse::<DayOfWeek>().is_ok());
                self.sync.on_store_changed()
            })
            .collect()
    }
}

/// Monday differs from Tuesday only in the morning setpoint.
fn weekday_week() -> MqttWeeklySchedule {
    MqttWeeklySchedule::from_fn(|day| match day {
        DayOfWeek::Monday => "00:00/17 06:30/21 22:00/17".to_string(),
        _ => "00:00/17 06:30/20.5 22:00/17".to_string(),
    })
}

#[tokio::test]
async fn edit_one_day_publishes_one_day() {
    let h = Harness::new(&weekday_week());
    assert_eq!(
        h.sync.configure(SyncConfig::new(DEVICE)).unwrap(),
        Some(LoadOutcome::Loaded)
    );

    h.sync.handle_event(UiEvent::DaySelected(DayOfWeek::Monday));
    h.sync.handle_event(UiEvent::ScheduleChanged {
        day: DayOfWeek::Monday,
        schedule: parse_day_schedule("00:00/17 06:30/22 22:00/17").unwrap(),
    });
    h.sync.handle_event(UiEvent::EditorClosed);
    assert!(h.sync.validate().unwrap().valid);

    let outcome = h.sync.save().await;

    assert_eq!(
        outcome,
        SaveOutcome::Published {
            save_id: 1,
            changed_days: vec![DayOfWeek::Monday],
        }
    );
    let messages = h.publisher.messages();
    assert_eq!(messages.len(), 1);
    let (topic, payload) = &messages[0];
    assert_eq!(topic, "zigbee2mqtt/living_room_trvzb/set");
    let json: serde_json::Value = serde_json::from_str(payload).unwrap();
    let keys: Vec<_> = json.as_object().unwrap().keys().cloned().collect();
    assert_eq!(keys, ["weekly_schedule_monday"]);
    assert_eq!(json["weekly_schedule_monday"], "00:00/17 06:30/22 22:00/17");
}

#[tokio::test]
async fn device_confirmation_resumes_external_change_detection() {
    let h = Harness::new(&weekday_week());
    h.sync.configure(SyncConfig::new(DEVICE)).unwrap();
    let mut rx = h.sync.subscribe();

    h.sync.handle_event(UiEvent::CopyConfirmed {
        source: DayOfWeek::Monday,
        targets: vec![DayOfWeek::Tuesday, DayOfWeek::Wednesday],
    });
    let SaveOutcome::Published { changed_days, .. } = h.sync.save().await else {
        panic!("expected publish");
    };
    assert_eq!(changed_days, vec![DayOfWeek::Tuesday, DayOfWeek::Wednesday]);

    let (_, payload) = h.publisher.messages().remove(0);
    let outcomes = h.apply_payload(&payload);
    assert_eq!(
        outcomes,
        vec![
            ChangeOutcome::AwaitingConfirmation { save_id: 1 },
            ChangeOutcome::Confirmed { save_id: 1 },
        ]
    );
    assert_eq!(h.sync.state(), SyncState::Ready);
    assert_eq!(
        serialize_weekly_schedule(&h.sync.original().unwrap()).wednesday,
        "00:00/17 06:30/21 22:00/17"
    );

    let events: Vec<_> = std::iter::from_fn(|| rx.try_recv().ok()).collect();
    assert!(matches!(events[0], SyncEvent::SavePublished { save_id: 1, .. }));
    assert!(matches!(events[1], SyncEvent::SaveConfirmed { save_id: 1, .. }));

    // Someone changes the schedule on the device itself
    h.store
        .set(format!("sensor.{DEVICE}_weekly_schedule_sunday"), "00:00/16");
    assert_eq!(
        h.sync.on_store_changed(),
        ChangeOutcome::Reloaded(LoadOutcome::Loaded)
    );
}

#[tokio::test]
async fn offline_broker_keeps_edits_for_retry() {
    let h = Harness::new(&weekday_week());
    h.sync.configure(SyncConfig::new(DEVICE)).unwrap();
    h.publisher.offline.store(true, Ordering::SeqCst);

    h.sync.handle_event(UiEvent::ScheduleChanged {
        day: DayOfWeek::Friday,
        schedule: parse_day_schedule("00:00/16 07:00/20").unwrap(),
    });
    let outcome = h.sync.save().await;

    assert!(matches!(outcome, SaveOutcome::Failed(_)));
    assert!(h.sync.has_unsaved_changes());
    assert_eq!(h.sync.pending_save_id(), None);

    // A sensor update now is an external change, not a confirmation
    h.store
        .set(format!("sensor.{DEVICE}_weekly_schedule_sunday"), "00:00/19");
    assert!(matches!(
        h.sync.on_store_changed(),
        ChangeOutcome::Reloaded(_)
    ));
    assert!(!h.sync.has_unsaved_changes());
}

#[tokio::test(start_paused = true)]
async fn silent_device_releases_pending_save() {
    let h = Harness::new(&weekday_week());
    h.sync
        .configure(SyncConfig::new(DEVICE).with_confirmation_timeout_secs(5))
        .unwrap();

    h.sync.handle_event(UiEvent::ScheduleChanged {
        day: DayOfWeek::Sunday,
        schedule: parse_day_schedule("00:00/19").unwrap(),
    });
    h.sync.save().await;
    assert_eq!(h.sync.pending_save_id(), Some(1));

    tokio::time::sleep(Duration::from_secs(6)).await;

    assert_eq!(h.sync.pending_save_id(), None);
    assert!(h.sync.warning().is_some());
}

#[tokio::test]
async fn unreadable_device_schedule_is_rewritten_in_full() {
    let mut week = weekday_week();
    week.thursday = "07:00-21".to_string();
    let h = Harness::new(&week);

    let outcome = h.sync.configure(SyncConfig::new(DEVICE)).unwrap();
    assert!(matches!(outcome, Some(LoadOutcome::Fallback { .. })));
    assert!(h.sync.has_unsaved_changes());

    h.sync.save().await;

    let (_, payload) = h.publisher.messages().remove(0);
    let json: serde_json::Value = serde_json::from_str(&payload).unwrap();
    assert_eq!(json.as_object().unwrap().len(), 7);
    assert_eq!(json["weekly_schedule_thursday"], "00:00/20");
}

#[tokio::test]
async fn sanitized_device_name_in_topic() {
    let h = Harness::new(&weekday_week());
    let store = Arc::clone(&h.store);
    store.set_schedule("sensor", "hall/trv#1", &weekday_week());

    h.sync.configure(SyncConfig::new("hall/trv#1")).unwrap();
    h.sync.handle_event(UiEvent::ScheduleChanged {
        day: DayOfWeek::Monday,
        schedule: parse_day_schedule("00:00/18").unwrap(),
    });
    h.sync.save().await;

    let (topic, _) = h.publisher.messages().remove(0);
    assert_eq!(topic, "zigbee2mqtt/hall_trv_1/set");
}
