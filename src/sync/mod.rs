// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronization between an edited schedule and the device.
//!
//! [`ScheduleSynchronizer`] owns two snapshots of a weekly schedule: the
//! last known device state (`original`) and the user's edits (`working`).
//!
//! ```text
//!  configure ──► load ──► Ready ──edit──► Editing ──save──► Saving
//!                  ▲                                         │
//!                  │ external change            publish ok   ▼
//!                  └──────────────────── AwaitingDeviceConfirmation
//!                                          (all 7 days match or timeout)
//! ```
//!
//! # Examples
//!
//! ```
//! use trv_schedule::config::SyncConfig;
//! use trv_schedule::error::ProtocolError;
//! use trv_schedule::protocol::Publisher;
//! use trv_schedule::store::MemoryStore;
//! use trv_schedule::sync::{LoadOutcome, ScheduleSynchronizer, SyncState};
//!
//! struct PrintPublisher;
//!
//! impl Publisher for PrintPublisher {
//!     async fn publish(&self, topic: &str, payload: &str) -> Result<(), ProtocolError> {
//!         println!("{topic}: {payload}");
//!         Ok(())
//!     }
//! }
//!
//! let sync = ScheduleSynchronizer::new(MemoryStore::new(), PrintPublisher);
//! let outcome = sync.configure(SyncConfig::new("bedroom_trv"))?;
//!
//! // No sensors in the store yet
//! assert!(matches!(outcome, Some(LoadOutcome::Missing { .. })));
//! assert!(matches!(sync.state(), SyncState::Error(_)));
//! # Ok::<(), trv_schedule::Error>(())
//! ```

mod state;
mod synchronizer;

pub use state::{ChangeOutcome, LoadOutcome, SaveOutcome, SyncState, UiEvent};
pub use synchronizer::ScheduleSynchronizer;
