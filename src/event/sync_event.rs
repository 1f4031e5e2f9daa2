// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Synchronizer event types.

use serde::Serialize;

use crate::types::DayOfWeek;

/// Events emitted by the schedule synchronizer.
///
/// Every event names the device it concerns. Save-related events also
/// carry the save identifier, which increases strictly with each publish.
///
/// # Examples
///
/// ```
/// use trv_schedule::event::SyncEvent;
///
/// let event = SyncEvent::SaveConfirmed {
///     device: "bedroom_trv".to_string(),
///     save_id: 3,
/// };
/// assert_eq!(event.device(), "bedroom_trv");
/// assert_eq!(event.save_id(), Some(3));
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum SyncEvent {
    /// The device schedule was loaded and parsed.
    Loaded {
        /// Device name.
        device: String,
    },

    /// The device schedule could not be parsed; editing starts from the
    /// default schedule.
    LoadFallback {
        /// Device name.
        device: String,
        /// Human-readable warning.
        warning: String,
    },

    /// One or more schedule sensors have no data.
    LoadFailed {
        /// Device name.
        device: String,
        /// Entity ids of the missing sensors.
        missing: Vec<String>,
    },

    /// A save found no changes and sent nothing.
    SaveSkipped {
        /// Device name.
        device: String,
    },

    /// A partial update was published.
    SavePublished {
        /// Device name.
        device: String,
        /// Save identifier.
        save_id: u64,
        /// Days included in the payload.
        changed_days: Vec<DayOfWeek>,
    },

    /// Publishing a partial update failed. Local edits are kept.
    SaveFailed {
        /// Device name.
        device: String,
        /// Save identifier.
        save_id: u64,
        /// Transport error message.
        error: String,
    },

    /// The device reported the full intended schedule.
    SaveConfirmed {
        /// Device name.
        device: String,
        /// Save identifier.
        save_id: u64,
    },

    /// The device did not confirm a save in time.
    ConfirmationTimedOut {
        /// Device name.
        device: String,
        /// Save identifier.
        save_id: u64,
    },

    /// The device schedule changed outside this synchronizer and was reloaded.
    ExternalChange {
        /// Device name.
        device: String,
    },
}

impl SyncEvent {
    /// Returns the device this event concerns.
    #[must_use]
    pub fn device(&self) -> &str {
        match self {
            Self::Loaded { device }
            | Self::LoadFallback { device, .. }
            | Self::LoadFailed { device, .. }
            | Self::SaveSkipped { device }
            | Self::SavePublished { device, .. }
            | Self::SaveFailed { device, .. }
            | Self::SaveConfirmed { device, .. }
            | Self::ConfirmationTimedOut { device, .. }
            | Self::ExternalChange { device } => device,
        }
    }

    /// Returns the save identifier for save-related events.
    #[must_use]
    pub fn save_id(&self) -> Option<u64> {
        match self {
            Self::SavePublished { save_id, .. }
            | Self::SaveFailed { save_id, .. }
            | Self::SaveConfirmed { save_id, .. }
            | Self::ConfirmationTimedOut { save_id, .. } => Some(*save_id),
            _ => None,
        }
    }

    /// Returns `true` if this event reports a load outcome.
    #[must_use]
    pub fn is_load(&self) -> bool {
        matches!(
            self,
            Self::Loaded { .. } | Self::LoadFallback { .. } | Self::LoadFailed { .. }
        )
    }

    /// Returns `true` if this event reports a problem the user should see.
    #[must_use]
    pub fn is_error(&self) -> bool {
        matches!(
            self,
            Self::LoadFailed { .. } | Self::SaveFailed { .. } | Self::ConfirmationTimedOut { .. }
        )
    }
}
