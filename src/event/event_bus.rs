// SPDX-License-Identifier: MPL-2.0
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at https://mozilla.org/MPL/2.0/.

//! Event bus for broadcasting synchronizer events.

use tokio::sync::broadcast;

use super::SyncEvent;

/// Default channel capacity for the event bus.
const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// Broadcasts [`SyncEvent`]s to any number of subscribers.
///
/// A subscriber that falls more than the channel capacity behind receives
/// `RecvError::Lagged` and loses the oldest events.
///
/// # Examples
///
/// ```
/// use trv_schedule::event::{EventBus, SyncEvent};
///
/// let bus = EventBus::new();
/// let mut rx = bus.subscribe();
///
/// bus.publish(SyncEvent::Loaded { device: "trv".to_string() });
/// assert!(rx.try_recv().is_ok());
/// ```
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SyncEvent>,
}

impl EventBus {
    /// Creates a new event bus with default capacity.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Creates a new event bus buffering at most `capacity` events.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity);
        Self { sender }
    }

    /// Subscribes to events published after this call.
    #[must_use]
    pub fn subscribe(&self) -> broadcast::Receiver<SyncEvent> {
        self.sender.subscribe()
    }

    /// Returns the number of active subscribers.
    #[must_use]
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }

    /// Publishes an event. Without subscribers the event is discarded.
    pub fn publish(&self, event: SyncEvent) {
        tracing::trace!(?event, "Sync event");
        // No subscribers is not an error
        let _ = self.sender.send(event);
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> SyncEvent {
        SyncEvent::Loaded {
            device: "trv".to_string(),
        }
    }

    #[test]
    fn subscriber_count_tracks_receivers() {
        let bus = EventBus::new();
        assert_eq!(bus.subscriber_count(), 0);

        let rx1 = bus.subscribe();
        let _rx2 = bus.subscribe();
        assert_eq!(bus.subscriber_count(), 2);

        drop(rx1);
        assert_eq!(bus.subscriber_count(), 1);
    }

    #[tokio::test]
    async fn publish_delivers_to_every_subscriber() {
        let bus = EventBus::new();
        let mut rx1 = bus.subscribe();
        let mut rx2 = bus.subscribe();

        bus.publish(loaded());

        assert_eq!(rx1.recv().await.unwrap(), loaded());
        assert_eq!(rx2.recv().await.unwrap(), loaded());
    }

    #[test]
    fn publish_without_subscribers_is_silent() {
        EventBus::new().publish(loaded());
    }

    #[test]
    fn clone_shares_same_channel() {
        let bus1 = EventBus::with_capacity(8);
        let bus2 = bus1.clone();

        let mut rx = bus1.subscribe();
        bus2.publish(loaded());
        assert_eq!(rx.try_recv().unwrap(), loaded());
    }
}
