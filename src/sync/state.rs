// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Observable states, editor input and operation outcomes.

use crate::schedule::DaySchedule;
use crate::types::DayOfWeek;

/// Coarse state of a [`ScheduleSynchronizer`](super::ScheduleSynchronizer).
///
/// Derived from the synchronizer's bookkeeping in priority order: loading,
/// error, in-flight save, pending confirmation, editing, ready, idle.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncState {
    /// No device configured.
    Idle,
    /// Reading the status sensors.
    Loading,
    /// Local and device schedules agree.
    Ready,
    /// The local schedule has unsaved changes.
    Editing,
    /// A publish call is in flight.
    Saving,
    /// A save was published; waiting for the device to report it.
    AwaitingDeviceConfirmation {
        /// Identifier of the pending save.
        save_id: u64,
    },
    /// The last load or save failed.
    Error(String),
}

impl SyncState {
    /// Returns `true` if a schedule is loaded and can be edited.
    #[must_use]
    pub fn is_editable(&self) -> bool {
        matches!(
            self,
            Self::Ready | Self::Editing | Self::AwaitingDeviceConfirmation { .. }
        )
    }
}

/// Input raised by the schedule editor.
#[derive(Debug, Clone, PartialEq)]
pub enum UiEvent {
    /// A day was opened for editing.
    DaySelected(DayOfWeek),
    /// A day's transitions were replaced.
    ScheduleChanged {
        /// Edited day.
        day: DayOfWeek,
        /// New transitions for the day.
        schedule: DaySchedule,
    },
    /// A day was copied onto other days.
    CopyConfirmed {
        /// Day to copy from.
        source: DayOfWeek,
        /// Days to overwrite.
        targets: Vec<DayOfWeek>,
    },
    /// The day editor was closed.
    EditorClosed,
    /// The copy dialog was closed.
    DialogClosed,
}

/// Result of reading the status sensors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadOutcome {
    /// Every day parsed; local and device schedules agree.
    Loaded,
    /// Content could not be parsed; editing starts from the default schedule.
    Fallback {
        /// Warning shown to the user.
        warning: String,
    },
    /// Some sensors had no data.
    Missing {
        /// Entity ids without usable data.
        entities: Vec<String>,
    },
    /// Not reloaded because a save is in flight.
    Deferred,
    /// A newer load started while this one was reading.
    Superseded,
}

/// Result of [`save`](super::ScheduleSynchronizer::save).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SaveOutcome {
    /// Nothing changed; no message was sent.
    Skipped,
    /// A partial update was published.
    Published {
        /// Identifier of this save.
        save_id: u64,
        /// Days included in the payload.
        changed_days: Vec<DayOfWeek>,
    },
    /// No schedule is loaded.
    NotReady,
    /// Another save is in flight.
    InProgress,
    /// The update could not be sent. Local edits are kept.
    Failed(String),
}

/// Result of [`on_store_changed`](super::ScheduleSynchronizer::on_store_changed).
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ChangeOutcome {
    /// No device configured.
    NotConfigured,
    /// The sensors hold the same values as last seen.
    Unchanged,
    /// The device now reports the full schedule of the pending save.
    Confirmed {
        /// Identifier of the confirmed save.
        save_id: u64,
    },
    /// The device has not reported the full pending schedule yet.
    AwaitingConfirmation {
        /// Identifier of the pending save.
        save_id: u64,
    },
    /// A save is in flight; the change is not acted on.
    Deferred,
    /// The schedule changed externally and was reloaded.
    Reloaded(LoadOutcome),
}
