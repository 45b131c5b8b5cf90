//! Suppresses repeated reads of a tag that stays in the field.
//!
//! A tag held over the reader is detected on every poll tick. A read is
//! accepted only if more than the threshold has passed since the previous
//! read. Every read, accepted or skipped, restarts the window, so a tag
//! that never leaves the field fires once, and a tag re-presented within
//! the window is suppressed as well.

/// Verdict for one tag detection.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Decision {
    Accepted,
    Skipped,
}

/// Time-gated acceptance of tag reads (microsecond timestamps).
#[derive(Clone, Debug)]
pub struct Debouncer {
    threshold_us: u64,
    last_read_us: Option<u64>,
}

impl Debouncer {
    pub const fn new(threshold_us: u64) -> Self {
        Self {
            threshold_us,
            last_read_us: None,
        }
    }

    /// Register a tag detection at `now_us` on a monotonic clock.
    pub fn on_tag(&mut self, now_us: u64) -> Decision {
        let decision = match self.last_read_us {
            Some(last) if now_us.saturating_sub(last) < self.threshold_us => Decision::Skipped,
            _ => Decision::Accepted,
        };
        self.last_read_us = Some(now_us);
        decision
    }

    /// Timestamp of the most recent detection, accepted or not.
    #[cfg(test)]
    pub fn last_read_us(&self) -> Option<u64> {
        self.last_read_us
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DEBOUNCE_US;

    const MS: u64 = 1_000;

    #[test]
    fn first_read_is_accepted() {
        let mut debouncer = Debouncer::new(DEBOUNCE_US);
        assert_eq!(debouncer.last_read_us(), None);
        assert_eq!(debouncer.on_tag(0), Decision::Accepted);
        assert_eq!(debouncer.last_read_us(), Some(0));
    }

    #[test]
    fn read_inside_window_is_skipped() {
        let mut debouncer = Debouncer::new(DEBOUNCE_US);
        debouncer.on_tag(0);
        assert_eq!(debouncer.on_tag(150 * MS), Decision::Skipped);
    }

    #[test]
    fn read_after_window_is_accepted() {
        let mut debouncer = Debouncer::new(DEBOUNCE_US);
        debouncer.on_tag(0);
        assert_eq!(debouncer.on_tag(250 * MS), Decision::Accepted);
    }

    #[test]
    fn read_exactly_at_threshold_is_accepted() {
        let mut debouncer = Debouncer::new(DEBOUNCE_US);
        debouncer.on_tag(0);
        assert_eq!(debouncer.on_tag(DEBOUNCE_US), Decision::Accepted);
    }

    #[test]
    fn skipped_read_restarts_window() {
        let mut debouncer = Debouncer::new(DEBOUNCE_US);
        assert_eq!(debouncer.on_tag(0), Decision::Accepted);
        assert_eq!(debouncer.on_tag(150 * MS), Decision::Skipped);
        // 300 ms after the first read, but only 150 ms after the skipped one.
        assert_eq!(debouncer.on_tag(300 * MS), Decision::Skipped);
        assert_eq!(debouncer.last_read_us(), Some(300 * MS));
    }

    #[test]
    fn held_tag_fires_once() {
        let mut debouncer = Debouncer::new(DEBOUNCE_US);
        let accepted = (0..50)
            .map(|tick| debouncer.on_tag(tick * 100 * MS))
            .filter(|d| *d == Decision::Accepted)
            .count();
        assert_eq!(accepted, 1);
    }

    #[test]
    fn clock_going_backwards_is_skipped() {
        let mut debouncer = Debouncer::new(DEBOUNCE_US);
        debouncer.on_tag(500 * MS);
        assert_eq!(debouncer.on_tag(100 * MS), Decision::Skipped);
    }
}
