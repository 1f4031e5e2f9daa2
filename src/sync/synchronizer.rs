// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Load, edit, save and reconciliation of one device's weekly schedule.

use std::sync::{Arc, Weak};
use std::time::Duration;

use parking_lot::Mutex;
use tokio::sync::broadcast;

use super::state::{ChangeOutcome, LoadOutcome, SaveOutcome, SyncState, UiEvent};
use crate::config::SyncConfig;
use crate::diff::{ScheduleDiff, build_partial_payload, compute_schedule_diff};
use crate::error::{Error, ProtocolError, Result};
use crate::event::{EventBus, SyncEvent};
use crate::protocol::Publisher;
use crate::schedule::{
    MqttWeeklySchedule, WeeklySchedule, create_empty_weekly_schedule, parse_weekly_schedule,
    serialize_weekly_schedule,
};
use crate::store::{ScheduleStates, StatusStore};
use crate::types::DayOfWeek;
use crate::validation::{ValidationResult, validate_weekly_schedule};

/// A published save waiting for the device to report it.
#[derive(Debug)]
struct PendingSave {
    save_id: u64,
    /// Full encoded week the device should end up with.
    expected: MqttWeeklySchedule,
}

/// Everything needed to publish and then settle one save.
#[derive(Debug)]
struct SaveRequest {
    save_id: u64,
    device: String,
    topic: String,
    payload: String,
    snapshot: WeeklySchedule,
    changed_days: Vec<DayOfWeek>,
    timeout: Duration,
}

/// Releases a save whose `save()` future is dropped before the publish
/// returns.
struct InFlightSave {
    inner: Weak<Mutex<SyncInner>>,
    events: EventBus,
    save_id: u64,
    device: String,
    armed: bool,
}

impl InFlightSave {
    fn disarm(mut self) {
        self.armed = false;
    }
}

impl Drop for InFlightSave {
    fn drop(&mut self) {
        if !self.armed {
            return;
        }
        let Some(shared) = self.inner.upgrade() else {
            return;
        };
        let mut inner = shared.lock();
        if !inner.release_save(self.save_id) {
            return;
        }
        inner.warning =
            Some("Schedule update was cancelled before the publish finished".to_string());
        drop(inner);

        tracing::warn!(device = %self.device, save_id = self.save_id, "Schedule update cancelled");
        self.events.publish(SyncEvent::SaveFailed {
            device: std::mem::take(&mut self.device),
            save_id: self.save_id,
            error: "cancelled".to_string(),
        });
    }
}

enum Prepared {
    Done(SaveOutcome),
    Publish(SaveRequest),
}

/// Identifies one load so a slower, older load cannot overwrite a newer one.
struct LoadTicket {
    generation: u64,
    config: SyncConfig,
}

#[derive(Debug, Default)]
struct SyncInner {
    config: Option<SyncConfig>,
    load_generation: u64,
    loading: bool,
    original: Option<WeeklySchedule>,
    working: Option<WeeklySchedule>,
    has_unsaved_changes: bool,
    /// Device content is unknown; the next save writes every day.
    force_full_write: bool,
    warning: Option<String>,
    error: Option<String>,
    last_seen: Option<ScheduleStates>,
    saving: Option<u64>,
    pending: Option<PendingSave>,
    next_save_id: u64,
    selected_day: Option<DayOfWeek>,
}

impl SyncInner {
    fn state(&self) -> SyncState {
        if self.loading {
            return SyncState::Loading;
        }
        if let Some(error) = &self.error {
            return SyncState::Error(error.clone());
        }
        if self.saving.is_some() {
            return SyncState::Saving;
        }
        if let Some(pending) = &self.pending {
            return SyncState::AwaitingDeviceConfirmation {
                save_id: pending.save_id,
            };
        }
        match (&self.original, self.has_unsaved_changes) {
            (Some(_), true) => SyncState::Editing,
            (Some(_), false) => SyncState::Ready,
            (None, _) => SyncState::Idle,
        }
    }

    /// Clears the in-flight and pending bookkeeping of `save_id`.
    ///
    /// Returns `false` if that save was already settled or superseded.
    fn release_save(&mut self, save_id: u64) -> bool {
        let mut released = false;
        if self.saving == Some(save_id) {
            self.saving = None;
            released = true;
        }
        if self.pending.as_ref().is_some_and(|p| p.save_id == save_id) {
            self.pending = None;
            released = true;
        }
        released
    }

    fn begin_load(&mut self) -> Option<LoadTicket> {
        let config = self.config.clone()?;
        self.load_generation += 1;
        self.loading = true;
        Some(LoadTicket {
            generation: self.load_generation,
            config,
        })
    }

    /// Replaces both schedules with what the sensors report.
    fn apply_snapshot(
        &mut self,
        config: &SyncConfig,
        snapshot: ScheduleStates,
        events: &EventBus,
    ) -> LoadOutcome {
        let device = config.device.clone();
        let missing = snapshot.missing_days();
        let wire = snapshot.to_wire();

        self.last_seen = Some(snapshot);
        self.loading = false;
        self.warning = None;
        self.error = None;
        self.force_full_write = false;
        self.has_unsaved_changes = false;

        let Some(wire) = wire else {
            let entities: Vec<String> = missing.into_iter().map(|day| config.entity_id(day)).collect();
            let error = Error::MissingData {
                entities: entities.clone(),
            };
            tracing::warn!(device = %device, error = %error, "Schedule sensors unavailable");
            self.original = None;
            self.working = None;
            self.error = Some(error.to_string());
            events.publish(SyncEvent::LoadFailed {
                device,
                missing: entities.clone(),
            });
            return LoadOutcome::Missing { entities };
        };

        match parse_weekly_schedule(&wire) {
            Ok(week) => {
                tracing::debug!(device = %device, "Weekly schedule loaded");
                self.original = Some(week.clone());
                self.working = Some(week);
                events.publish(SyncEvent::Loaded { device });
                LoadOutcome::Loaded
            }
            Err(e) => {
                let warning = format!(
                    "Could not parse the device schedule ({e}); starting from the default schedule"
                );
                tracing::warn!(device = %device, error = %e, "Falling back to default schedule");
                let fallback = create_empty_weekly_schedule();
                self.original = Some(fallback.clone());
                self.working = Some(fallback);
                self.has_unsaved_changes = true;
                self.force_full_write = true;
                self.warning = Some(warning.clone());
                events.publish(SyncEvent::LoadFallback {
                    device,
                    warning: warning.clone(),
                });
                LoadOutcome::Fallback { warning }
            }
        }
    }

    fn apply_edit(&mut self, event: UiEvent) -> bool {
        match event {
            UiEvent::DaySelected(day) => {
                self.selected_day = Some(day);
                false
            }
            UiEvent::EditorClosed | UiEvent::DialogClosed => {
                self.selected_day = None;
                false
            }
            UiEvent::ScheduleChanged { day, schedule } => {
                let Some(working) = self.working.as_mut() else {
                    tracing::debug!(day = %day, "Ignoring edit, no schedule loaded");
                    return false;
                };
                working.set_day(day, schedule);
                self.has_unsaved_changes = true;
                true
            }
            UiEvent::CopyConfirmed { source, targets } => {
                let Some(working) = self.working.as_mut() else {
                    tracing::debug!(source = %source, "Ignoring copy, no schedule loaded");
                    return false;
                };
                let copied = working.day(source).clone();
                let mut changed = false;
                for target in targets.into_iter().filter(|target| *target != source) {
                    working.set_day(target, copied.clone());
                    changed = true;
                }
                self.has_unsaved_changes |= changed;
                changed
            }
        }
    }

    fn prepare_save(&mut self, events: &EventBus) -> Prepared {
        if self.saving.is_some() {
            return Prepared::Done(SaveOutcome::InProgress);
        }
        let (Some(config), Some(original), Some(working)) =
            (&self.config, &self.original, &self.working)
        else {
            return Prepared::Done(SaveOutcome::NotReady);
        };

        let diff = if self.force_full_write {
            ScheduleDiff::full(working)
        } else {
            compute_schedule_diff(original, working)
        };

        if !diff.has_changes() {
            tracing::debug!(device = %config.device, "No schedule changes to save");
            events.publish(SyncEvent::SaveSkipped {
                device: config.device.clone(),
            });
            self.has_unsaved_changes = false;
            return Prepared::Done(SaveOutcome::Skipped);
        }

        let payload = match build_partial_payload(&diff).to_json() {
            Ok(payload) => payload,
            Err(e) => {
                let message = format!("Failed to encode schedule update: {e}");
                self.error = Some(message.clone());
                return Prepared::Done(SaveOutcome::Failed(message));
            }
        };

        let request = SaveRequest {
            save_id: self.next_save_id + 1,
            device: config.device.clone(),
            topic: config.set_topic(),
            payload,
            snapshot: working.clone(),
            changed_days: diff.changed_days(),
            timeout: config.confirmation_timeout(),
        };
        let expected = serialize_weekly_schedule(working);

        self.next_save_id = request.save_id;
        self.saving = Some(request.save_id);
        self.pending = Some(PendingSave {
            save_id: request.save_id,
            expected,
        });
        self.error = None;
        Prepared::Publish(request)
    }
}

/// Keeps a local editable copy of a thermostat's weekly schedule in step
/// with the device.
///
/// The device reports its schedule through seven status sensors in a
/// [`StatusStore`] and accepts updates through a [`Publisher`]. Edits are
/// applied to a working copy; [`save`](Self::save) publishes only the days
/// that differ from the last known device state, in a single message.
///
/// After a publish the synchronizer waits until every sensor reports the
/// intended schedule before it treats sensor changes as external edits
/// again. If the device stays silent for the configured timeout, the
/// wait is abandoned.
///
/// Notify the synchronizer of sensor changes with
/// [`on_store_changed`](Self::on_store_changed). Progress is published as
/// [`SyncEvent`]s on the bus returned by [`subscribe`](Self::subscribe).
pub struct ScheduleSynchronizer<S, P> {
    store: S,
    publisher: P,
    inner: Arc<Mutex<SyncInner>>,
    events: EventBus,
}

impl<S: StatusStore, P: Publisher> ScheduleSynchronizer<S, P> {
    /// Creates an unconfigured synchronizer.
    #[must_use]
    pub fn new(store: S, publisher: P) -> Self {
        Self {
            store,
            publisher,
            inner: Arc::new(Mutex::new(SyncInner::default())),
            events: EventBus::new(),
        }
    }

    /// Applies a configuration.
    ///
    /// The schedule is loaded on the first configuration and whenever the
    /// target device or sensor namespace changes; `Ok(None)` means no load
    /// was needed. Switching device drops any save bookkeeping of the
    /// previous device.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if the configuration is invalid.
    pub fn configure(&self, config: SyncConfig) -> Result<Option<LoadOutcome>> {
        config.validate()?;

        let ticket = {
            let mut inner = self.inner.lock();
            let target_changed = inner.config.as_ref().is_none_or(|current| {
                current.device != config.device || current.entity_namespace != config.entity_namespace
            });
            inner.config = Some(config);
            if !target_changed {
                return Ok(None);
            }
            inner.saving = None;
            inner.pending = None;
            inner.selected_day = None;
            inner.begin_load()
        };

        Ok(ticket.map(|ticket| self.run_load(ticket)))
    }

    /// Re-reads the schedule from the status sensors, discarding local edits.
    ///
    /// Deferred while a save is in flight. Any pending confirmation is
    /// abandoned, so later sensor changes reload again.
    ///
    /// # Errors
    ///
    /// Returns [`Error::InvalidConfiguration`] if no device is configured.
    pub fn reload(&self) -> Result<LoadOutcome> {
        let ticket = {
            let mut inner = self.inner.lock();
            if inner.config.is_none() {
                return Err(Error::InvalidConfiguration(
                    "no device configured".to_string(),
                ));
            }
            if inner.saving.is_some() {
                tracing::debug!("Save in flight, reload deferred");
                return Ok(LoadOutcome::Deferred);
            }
            inner.pending = None;
            inner.begin_load()
        };

        ticket
            .map(|ticket| self.run_load(ticket))
            .ok_or_else(|| Error::InvalidConfiguration("no device configured".to_string()))
    }

    fn run_load(&self, ticket: LoadTicket) -> LoadOutcome {
        let LoadTicket { generation, config } = ticket;
        tracing::debug!(device = %config.device, "Loading weekly schedule");

        let snapshot = ScheduleStates::read(&self.store, &config.entity_namespace, &config.device);

        let mut inner = self.inner.lock();
        if inner.load_generation != generation {
            tracing::debug!(device = %config.device, "Discarding superseded load");
            return LoadOutcome::Superseded;
        }
        inner.apply_snapshot(&config, snapshot, &self.events)
    }

    /// Applies an editor event to the working copy.
    ///
    /// Returns `true` if the working schedule changed. Edits are never
    /// validated here; see [`validate`](Self::validate).
    pub fn handle_event(&self, event: UiEvent) -> bool {
        self.inner.lock().apply_edit(event)
    }

    /// Publishes the changed days of the working schedule.
    ///
    /// At most one save runs at a time. On success the working copy becomes
    /// the new baseline immediately; the device's sensors are then expected
    /// to report the full schedule. On failure the edits are kept and can be
    /// saved again.
    ///
    /// The confirmation timeout starts with the publish. If it elapses, or
    /// the returned future is dropped, before the publish returns, the save
    /// is abandoned: edits stay unsaved and a late completion is ignored.
    pub async fn save(&self) -> SaveOutcome {
        let prepared = self.inner.lock().prepare_save(&self.events);
        let request = match prepared {
            Prepared::Done(outcome) => return outcome,
            Prepared::Publish(request) => request,
        };

        tracing::debug!(
            device = %request.device,
            save_id = request.save_id,
            topic = %request.topic,
            payload = %request.payload,
            "Publishing schedule update"
        );

        // Bounds both the publish and the device confirmation
        self.arm_confirmation_timeout(request.save_id, request.device.clone(), request.timeout);
        let guard = InFlightSave {
            inner: Arc::downgrade(&self.inner),
            events: self.events.clone(),
            save_id: request.save_id,
            device: request.device.clone(),
            armed: true,
        };

        let result = self
            .publisher
            .publish(&request.topic, &request.payload)
            .await;
        guard.disarm();
        self.complete_save(request, result)
    }

    fn complete_save(
        &self,
        request: SaveRequest,
        result: std::result::Result<(), ProtocolError>,
    ) -> SaveOutcome {
        let SaveRequest {
            save_id,
            device,
            snapshot,
            changed_days,
            ..
        } = request;

        let mut inner = self.inner.lock();
        if inner.saving != Some(save_id) {
            // Device switched, or the save was abandoned, while publishing
            tracing::debug!(device = %device, save_id, "Ignoring completion of superseded save");
            return match result {
                Ok(()) => SaveOutcome::Published {
                    save_id,
                    changed_days,
                },
                Err(e) => SaveOutcome::Failed(e.to_string()),
            };
        }
        inner.saving = None;

        match result {
            Ok(()) => {
                if inner.working.as_ref() == Some(&snapshot) {
                    inner.has_unsaved_changes = false;
                }
                inner.original = Some(snapshot);
                inner.force_full_write = false;
                inner.warning = None;
                drop(inner);

                tracing::info!(device = %device, save_id, ?changed_days, "Schedule update published");
                self.events.publish(SyncEvent::SavePublished {
                    device,
                    save_id,
                    changed_days: changed_days.clone(),
                });

                SaveOutcome::Published {
                    save_id,
                    changed_days,
                }
            }
            Err(e) => {
                inner.release_save(save_id);
                let message = format!("Failed to save schedule: {e}");
                inner.error = Some(message.clone());
                drop(inner);

                tracing::warn!(device = %device, save_id, error = %e, "Schedule update failed");
                self.events.publish(SyncEvent::SaveFailed {
                    device,
                    save_id,
                    error: e.to_string(),
                });

                SaveOutcome::Failed(message)
            }
        }
    }

    fn arm_confirmation_timeout(&self, save_id: u64, device: String, timeout: Duration) {
        let inner: Weak<Mutex<SyncInner>> = Arc::downgrade(&self.inner);
        let events = self.events.clone();

        tokio::spawn(async move {
            tokio::time::sleep(timeout).await;

            let Some(shared) = inner.upgrade() else {
                return;
            };
            let mut inner = shared.lock();
            if !inner.release_save(save_id) {
                return;
            }
            inner.warning = Some(format!(
                "Device did not confirm the schedule within {} s",
                timeout.as_secs()
            ));
            drop(inner);

            tracing::warn!(device = %device, save_id, "Timed out waiting for device confirmation");
            events.publish(SyncEvent::ConfirmationTimedOut { device, save_id });
        });
    }

    /// Reacts to a change notification from the status store.
    ///
    /// While a save is pending the sensors are only compared against the
    /// intended schedule; the save is confirmed once all seven days match.
    /// Otherwise any change to any day reloads the schedule, replacing
    /// local edits.
    pub fn on_store_changed(&self) -> ChangeOutcome {
        let (generation, config) = {
            let inner = self.inner.lock();
            let Some(config) = inner.config.clone() else {
                return ChangeOutcome::NotConfigured;
            };
            (inner.load_generation, config)
        };

        let snapshot = ScheduleStates::read(&self.store, &config.entity_namespace, &config.device);

        let mut inner = self.inner.lock();
        if inner.load_generation != generation || inner.last_seen.as_ref() == Some(&snapshot) {
            return ChangeOutcome::Unchanged;
        }

        let pending = inner
            .pending
            .as_ref()
            .map(|p| (p.save_id, snapshot.matches(&p.expected)));

        match pending {
            Some((save_id, true)) => {
                inner.pending = None;
                inner.last_seen = Some(snapshot);
                drop(inner);

                tracing::info!(device = %config.device, save_id, "Device confirmed schedule");
                self.events.publish(SyncEvent::SaveConfirmed {
                    device: config.device,
                    save_id,
                });
                ChangeOutcome::Confirmed { save_id }
            }
            Some((save_id, false)) => {
                inner.last_seen = Some(snapshot);
                tracing::debug!(device = %config.device, save_id, "Waiting for remaining days");
                ChangeOutcome::AwaitingConfirmation { save_id }
            }
            None if inner.saving.is_some() => {
                inner.last_seen = Some(snapshot);
                ChangeOutcome::Deferred
            }
            None => {
                tracing::info!(device = %config.device, "Schedule changed externally, reloading");
                self.events.publish(SyncEvent::ExternalChange {
                    device: config.device.clone(),
                });
                inner.load_generation += 1;
                ChangeOutcome::Reloaded(inner.apply_snapshot(&config, snapshot, &self.events))
            }
        }
    }

    /// Returns the current state.
    #[must_use]
    pub fn state(&self) -> SyncState {
        self.inner.lock().state()
    }

    /// Returns the active configuration.
    #[must_use]
    pub fn config(&self) -> Option<SyncConfig> {
        self.inner.lock().config.clone()
    }

    /// Returns a copy of the working schedule.
    #[must_use]
    pub fn working(&self) -> Option<WeeklySchedule> {
        self.inner.lock().working.clone()
    }

    /// Returns a copy of the last known device schedule.
    #[must_use]
    pub fn original(&self) -> Option<WeeklySchedule> {
        self.inner.lock().original.clone()
    }

    /// Returns `true` if the working schedule has unsaved edits.
    #[must_use]
    pub fn has_unsaved_changes(&self) -> bool {
        self.inner.lock().has_unsaved_changes
    }

    /// Returns the identifier of the save awaiting confirmation.
    #[must_use]
    pub fn pending_save_id(&self) -> Option<u64> {
        self.inner.lock().pending.as_ref().map(|p| p.save_id)
    }

    /// Returns the current soft warning, if any.
    #[must_use]
    pub fn warning(&self) -> Option<String> {
        self.inner.lock().warning.clone()
    }

    /// Returns the current error message, if any.
    #[must_use]
    pub fn error(&self) -> Option<String> {
        self.inner.lock().error.clone()
    }

    /// Returns the day open in the editor.
    #[must_use]
    pub fn selected_day(&self) -> Option<DayOfWeek> {
        self.inner.lock().selected_day
    }

    /// Validates the working schedule.
    #[must_use]
    pub fn validate(&self) -> Option<ValidationResult> {
        self.inner
            .lock()
            .working
            .as_ref()
            .map(validate_weekly_schedule)
    }

    /// Subscribes to synchronizer events.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.events.subscribe()
    }
}
