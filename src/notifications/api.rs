//! Public API for the notification system
//!
//! This module provides the complete public API for the notification system.
//! External modules should import from here rather than directly from
//! internal modules.
//!
//! Delivery contract: events are fanned out over per-subscriber unbounded
//! channels from the publisher's execution context. The scan loop never
//! waits for consumers; a slow subscriber grows its own queue. See
//! `manager` module docs.

use std::sync::{Arc, LazyLock};
use tokio::sync::Mutex;

// Core event types and enums
pub use crate::notifications::event::{
    Event, EventFilter, ScannerEvent, ScannerEventType, SystemEvent, SystemEventType, TagEvent,
};

// Manager and utilities
pub use crate::notifications::error::NotificationError;
pub use crate::notifications::manager::{AsyncNotificationManager, EventReceiver};

// Subscriber bookkeeping
pub use crate::notifications::traits::SubscriberStatistics;

/// Global notification service instance
static NOTIFICATION_SERVICE: LazyLock<Arc<Mutex<AsyncNotificationManager>>> = LazyLock::new(|| {
    log::trace!("Initializing notification service");
    Arc::new(Mutex::new(AsyncNotificationManager::new()))
});

/// Access notification service
///
/// Returns a guard on the global notification service that can be used to
/// publish events and manage subscribers. Each call locks the same shared
/// instance.
pub async fn get_notification_service() -> tokio::sync::MutexGuard<'static, AsyncNotificationManager>
{
    NOTIFICATION_SERVICE.lock().await
}
