// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Notifications about load, save and confirmation progress.
//!
//! The synchronizer publishes a [`SyncEvent`] on its [`EventBus`] for every
//! outcome a user interface may want to show: load results, soft warnings,
//! published or failed saves, confirmations and external reloads.

mod event_bus;
mod sync_event;

pub use event_bus::EventBus;
pub use sync_event::SyncEvent;
