//! Duplicate-read suppression
//!
//! Tag-identity-aware, not a fixed-interval throttle: a different tag
//! presented within the window is accepted immediately; the same tag must
//! wait out the window. State is owned exclusively by the scan loop.

use std::time::{Duration, Instant};

pub struct DebounceFilter {
    window: Duration,
    last_tag_id: Option<String>,
    last_seen_at: Option<Instant>,
}

impl DebounceFilter {
    pub fn new(window: Duration) -> Self {
        Self {
            window,
            last_tag_id: None,
            last_seen_at: None,
        }
    }

    /// Decide whether a just-read tag should be emitted.
    ///
    /// Accepts when the tag differs from the last accepted one, or when the
    /// window has elapsed since. On accept, both fields update; rejected
    /// reads change nothing. `now` is injected so tests run on a fake clock.
    pub fn accept(&mut self, raw_tag: &str, now: Instant) -> bool {
        let is_repeat = self.last_tag_id.as_deref() == Some(raw_tag);
        let within_window = self
            .last_seen_at
            .is_some_and(|seen| now.duration_since(seen) <= self.window);

        if is_repeat && within_window {
            return false;
        }

        self.last_tag_id = Some(raw_tag.to_string());
        self.last_seen_at = Some(now);
        true
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const WINDOW: Duration = Duration::from_secs(2);

    #[test]
    fn test_first_read_always_accepted() {
        let mut filter = DebounceFilter::new(WINDOW);
        assert!(filter.accept("TAG-A", Instant::now()));
    }

    #[test]
    fn test_same_tag_within_window_rejected() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("TAG-A", t0));
        assert!(!filter.accept("TAG-A", t0 + Duration::from_millis(500)));
        assert!(!filter.accept("TAG-A", t0 + Duration::from_millis(1999)));
    }

    #[test]
    fn test_same_tag_after_window_accepted() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("TAG-A", t0));
        assert!(filter.accept("TAG-A", t0 + Duration::from_millis(2001)));
    }

    #[test]
    fn test_different_tag_within_window_accepted() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("TAG-A", t0));
        assert!(
            filter.accept("TAG-B", t0 + Duration::from_millis(10)),
            "a different tag always emits regardless of timing"
        );
    }

    #[test]
    fn test_rejection_does_not_extend_window() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("TAG-A", t0));
        // Rejected reads must not refresh last_seen_at
        assert!(!filter.accept("TAG-A", t0 + Duration::from_millis(1500)));
        assert!(filter.accept("TAG-A", t0 + Duration::from_millis(2100)));
    }

    #[test]
    fn test_alternating_tags_all_accepted() {
        let mut filter = DebounceFilter::new(WINDOW);
        let t0 = Instant::now();

        assert!(filter.accept("TAG-A", t0));
        assert!(filter.accept("TAG-B", t0 + Duration::from_millis(100)));
        assert!(filter.accept("TAG-A", t0 + Duration::from_millis(200)));
        assert!(filter.accept("TAG-B", t0 + Duration::from_millis(300)));
    }
}
