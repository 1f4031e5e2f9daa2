// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! `trv_schedule` - Weekly heating schedules for Zigbee thermostatic
//! radiator valves.
//!
//! This library reads a valve's weekly schedule from per-day status
//! sensors, lets an editor change it, and sends back only the days that
//! changed as a single MQTT message.
//!
//! # Supported Features
//!
//! - **Wire codec**: `HH:mm/T` transition tokens, one string per day
//! - **Validation**: Advisory checks with user-facing messages
//! - **Minimal updates**: Per-day diff and `weekly_schedule_<day>` payloads
//! - **Synchronization**: Optimistic saves confirmed by the device's sensors
//! - **Topic safety**: Device names sanitized before use in MQTT topics
//!
//! # Quick Start
//!
//! ```no_run
//! use std::sync::Arc;
//!
//! use trv_schedule::config::SyncConfig;
//! use trv_schedule::protocol::MqttPublisher;
//! use trv_schedule::schedule::parse_day_schedule;
//! use trv_schedule::store::MemoryStore;
//! use trv_schedule::sync::{ScheduleSynchronizer, UiEvent};
//! use trv_schedule::types::DayOfWeek;
//!
//! #[tokio::main]
//! async fn main() -> trv_schedule::Result<()> {
//!     let store = Arc::new(MemoryStore::new());
//!     let publisher = MqttPublisher::connect("mqtt://192.168.1.50:1883").await?;
//!
//!     let sync = ScheduleSynchronizer::new(Arc::clone(&store), publisher);
//!     sync.configure(SyncConfig::new("living_room_trvzb"))?;
//!
//!     sync.handle_event(UiEvent::ScheduleChanged {
//!         day: DayOfWeek::Monday,
//!         schedule: parse_day_schedule("00:00/17 06:30/21 22:00/17")?,
//!     });
//!     let outcome = sync.save().await;
//!     println!("{outcome:?}");
//!
//!     Ok(())
//! }
//! ```

pub mod config;
pub mod diff;
pub mod error;
pub mod event;
pub mod protocol;
pub mod schedule;
pub mod store;
pub mod sync;
pub mod topic;
pub mod types;
pub mod validation;

pub use config::SyncConfig;
pub use diff::{PartialPayload, ScheduleDiff, build_partial_payload, compute_schedule_diff};
pub use error::{Error, ParseError, ProtocolError, Result, ValidationError, ValueError};
pub use event::{EventBus, SyncEvent};
#[cfg(feature = "mqtt")]
pub use protocol::{MqttPublisher, MqttPublisherBuilder};
pub use protocol::Publisher;
pub use schedule::{DaySchedule, MqttWeeklySchedule, Transition, WeeklySchedule};
pub use store::{MemoryStore, StatusStore};
pub use sync::{ScheduleSynchronizer, SyncState, UiEvent};
pub use types::{DayOfWeek, TimeOfDay};
pub use validation::ValidationResult;
