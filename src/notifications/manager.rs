//! AsyncNotificationManager implementation
//!
//! Fan-out of engine events to registered subscribers over per-subscriber
//! unbounded channels. Publishing never blocks on consumers: a slow
//! subscriber accumulates a queue instead of stalling the scan loop, and
//! per-subscriber delivery order is publish order. Detection pacing is
//! bounded by the debounce window and the contactless cool-down, not by how
//! quickly subscribers drain their channels.

use crate::notifications::error::NotificationError;
use crate::notifications::event::{Event, EventFilter};
use crate::notifications::traits::SubscriberStatistics;
use std::collections::HashMap;
use tokio::sync::mpsc::{unbounded_channel, UnboundedReceiver, UnboundedSender};

/// Receiving half handed to a subscriber on registration
pub type EventReceiver = UnboundedReceiver<Event>;

struct SubscriberInfo {
    filter: EventFilter,
    source: String,
    sender: UnboundedSender<Event>,
    statistics: SubscriberStatistics,
}

pub struct AsyncNotificationManager {
    subscribers: HashMap<String, SubscriberInfo>,
}

impl Default for AsyncNotificationManager {
    fn default() -> Self {
        Self::new()
    }
}

impl AsyncNotificationManager {
    pub fn new() -> Self {
        Self {
            subscribers: HashMap::new(),
        }
    }

    /// Register a subscriber and hand back its event channel.
    ///
    /// Subscriber ids are unique; registering an id twice is rejected so a
    /// stale receiver cannot be silently orphaned.
    pub fn subscribe(
        &mut self,
        subscriber_id: String,
        filter: EventFilter,
        source: String,
    ) -> Result<EventReceiver, NotificationError> {
        if self.subscribers.contains_key(&subscriber_id) {
            return Err(NotificationError::DuplicateSubscriber(subscriber_id));
        }

        let (sender, receiver) = unbounded_channel();

        let subscriber_info = SubscriberInfo {
            filter,
            source,
            sender,
            statistics: SubscriberStatistics::new(),
        };

        self.subscribers.insert(subscriber_id, subscriber_info);

        Ok(receiver)
    }

    /// Remove a subscriber; returns whether it was registered.
    pub fn unsubscribe(&mut self, subscriber_id: &str) -> bool {
        self.subscribers.remove(subscriber_id).is_some()
    }

    pub fn subscriber_count(&self) -> usize {
        self.subscribers.len()
    }

    pub fn has_subscriber(&self, subscriber_id: &str) -> bool {
        self.subscribers.contains_key(subscriber_id)
    }

    pub fn get_subscriber_statistics(&self, subscriber_id: &str) -> Option<&SubscriberStatistics> {
        self.subscribers
            .get(subscriber_id)
            .map(|info| &info.statistics)
    }

    /// Publish an event to all subscribers whose filter accepts it.
    ///
    /// Subscribers whose receiving channel has been dropped are removed;
    /// their ids are reported through the error.
    pub async fn publish(&mut self, event: Event) -> Result<(), NotificationError> {
        let mut failed_subscribers = Vec::new();
        let event_type = match &event {
            Event::Tag(_) => "Tag",
            Event::Scanner(_) => "Scanner",
            Event::System(_) => "System",
        }
        .to_string();

        for (subscriber_id, subscriber_info) in &self.subscribers {
            if subscriber_info.filter.accepts(&event) {
                if subscriber_info.sender.send(event.clone()).is_err() {
                    // Channel is closed, mark for removal
                    failed_subscribers.push(subscriber_id.clone());
                } else {
                    subscriber_info.statistics.record_event_sent();
                }
            }
        }

        for subscriber_id in &failed_subscribers {
            log::debug!("Removing subscriber with closed channel: {subscriber_id}");
            self.subscribers.remove(subscriber_id);
        }

        if !failed_subscribers.is_empty() {
            return Err(NotificationError::PublishFailed {
                event_type,
                failed_subscribers,
            });
        }

        Ok(())
    }

    /// Log the registered subscribers at debug level
    pub fn log_subscribers(&self) {
        for (id, info) in &self.subscribers {
            log::debug!(
                "Subscriber '{}' (source: {}, filter: {:?}, events sent: {})",
                id,
                info.source,
                info.filter,
                info.statistics.events_sent()
            );
        }
    }
}
