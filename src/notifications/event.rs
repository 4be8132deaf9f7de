//! Event types for the notification system

use std::time::SystemTime;

#[derive(Clone, Debug, PartialEq)]
pub enum ScannerEventType {
    Connected,
    Disabled,
    Started,
    Stopped,
}

#[derive(Clone, Debug, PartialEq)]
pub enum SystemEventType {
    Startup,
    Shutdown,
}

/// Debounced tag read, produced once per accepted read.
#[derive(Clone, Debug)]
pub struct TagEvent {
    pub tag_id: String,
    pub observed_at: SystemTime,
}

impl TagEvent {
    pub fn new(tag_id: String) -> Self {
        Self {
            tag_id,
            observed_at: SystemTime::now(),
        }
    }
}

/// Scanner lifecycle event (backend connected, disabled, loop started/stopped).
#[derive(Clone, Debug)]
pub struct ScannerEvent {
    pub event_type: ScannerEventType,
    pub timestamp: SystemTime,
    pub details: Option<String>,
}

impl ScannerEvent {
    pub fn new(event_type: ScannerEventType) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            details: None,
        }
    }

    pub fn with_details(event_type: ScannerEventType, details: String) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            details: Some(details),
        }
    }
}

#[derive(Clone, Debug)]
pub struct SystemEvent {
    pub event_type: SystemEventType,
    pub timestamp: SystemTime,
    pub message: Option<String>,
}

impl SystemEvent {
    pub fn new(event_type: SystemEventType) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: None,
        }
    }

    pub fn with_message(event_type: SystemEventType, message: String) -> Self {
        Self {
            event_type,
            timestamp: SystemTime::now(),
            message: Some(message),
        }
    }
}

/// Unified event enum that encompasses all event types
#[derive(Clone, Debug)]
pub enum Event {
    Tag(TagEvent),
    Scanner(ScannerEvent),
    System(SystemEvent),
}

/// Event filtering options for subscribers
#[derive(Clone, Debug, PartialEq)]
pub enum EventFilter {
    TagOnly,
    ScannerOnly,
    SystemOnly,
    All,
}

impl EventFilter {
    /// Check if an event should be accepted by this filter
    pub fn accepts(&self, event: &Event) -> bool {
        matches!(
            (self, event),
            (EventFilter::TagOnly, Event::Tag(_))
                | (EventFilter::ScannerOnly, Event::Scanner(_))
                | (EventFilter::SystemOnly, Event::System(_))
                | (EventFilter::All, _)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_scanner_event_type_equality() {
        assert_eq!(ScannerEventType::Connected, ScannerEventType::Connected);
        assert_ne!(ScannerEventType::Connected, ScannerEventType::Disabled);
        assert_ne!(ScannerEventType::Started, ScannerEventType::Stopped);
    }

    #[test]
    fn test_tag_event_creation() {
        let event = TagEvent::new("04A1B2C3".to_string());
        assert_eq!(event.tag_id, "04A1B2C3");
        assert!(event.observed_at <= SystemTime::now());
    }

    #[test]
    fn test_scanner_event_creation() {
        let event = ScannerEvent::new(ScannerEventType::Stopped);
        assert_eq!(event.event_type, ScannerEventType::Stopped);
        assert!(event.details.is_none());

        let event_with_details = ScannerEvent::with_details(
            ScannerEventType::Connected,
            "serial /dev/ttyUSB0 @ 9600".to_string(),
        );
        assert_eq!(
            event_with_details.details,
            Some("serial /dev/ttyUSB0 @ 9600".to_string())
        );
    }

    #[test]
    fn test_system_event_creation() {
        let startup = SystemEvent::new(SystemEventType::Startup);
        assert_eq!(startup.event_type, SystemEventType::Startup);
        assert!(startup.message.is_none());

        let shutdown =
            SystemEvent::with_message(SystemEventType::Shutdown, "signal received".to_string());
        assert_eq!(shutdown.message, Some("signal received".to_string()));
    }

    #[test]
    fn test_event_filter_accepts() {
        let tag = Event::Tag(TagEvent::new("0123456789".to_string()));
        let scanner = Event::Scanner(ScannerEvent::new(ScannerEventType::Disabled));
        let system = Event::System(SystemEvent::new(SystemEventType::Shutdown));

        let tag_filter = EventFilter::TagOnly;
        assert!(tag_filter.accepts(&tag));
        assert!(!tag_filter.accepts(&scanner));
        assert!(!tag_filter.accepts(&system));

        let scanner_filter = EventFilter::ScannerOnly;
        assert!(!scanner_filter.accepts(&tag));
        assert!(scanner_filter.accepts(&scanner));
        assert!(!scanner_filter.accepts(&system));

        let system_filter = EventFilter::SystemOnly;
        assert!(!system_filter.accepts(&tag));
        assert!(!system_filter.accepts(&scanner));
        assert!(system_filter.accepts(&system));

        let all_filter = EventFilter::All;
        assert!(all_filter.accepts(&tag));
        assert!(all_filter.accepts(&scanner));
        assert!(all_filter.accepts(&system));
    }

    #[test]
    fn test_event_debug_formatting() {
        let event = Event::Scanner(ScannerEvent::new(ScannerEventType::Disabled));
        let debug_str = format!("{:?}", event);
        assert!(debug_str.contains("Disabled"));
    }
}
