//! One tick of the scan loop: debounce a detection and, if the session
//! allows it, type the tag UID followed by the line ending.
//!
//! The session is checked once per accepted scan, not per character.

use embedded_hal_async::delay::DelayNs;

use crate::config::{DEBOUNCE_US, HID_INPUT_SUFFIX, KEYSTROKE_DELAY_MS};
use crate::hid::{type_text, ReportSink};
use crate::nfc::debounce::{Decision, Debouncer};
use crate::nfc::{ScanEvent, ScanString};
use crate::session::Session;

/// What a tick did, for the caller to log.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum ScanOutcome<E> {
    /// No tag in the field.
    Idle,
    /// Tag read inside the debounce window.
    Skipped,
    /// Accepted, but no host is ready to receive reports.
    Offline { uid: ScanString },
    /// Accepted and typed.
    Typed { uid: ScanString, reports: usize },
    /// Accepted, typing stopped at the first transport error.
    TransportFailed { uid: ScanString, error: E },
}

/// Scan loop state owned by the polling task.
pub struct ScanLoop {
    debouncer: Debouncer,
    pending: ScanString,
    keystroke_delay_ms: u32,
}

impl ScanLoop {
    pub const fn new() -> Self {
        Self::with_timing(DEBOUNCE_US, KEYSTROKE_DELAY_MS)
    }

    pub const fn with_timing(debounce_us: u64, keystroke_delay_ms: u32) -> Self {
        Self {
            debouncer: Debouncer::new(debounce_us),
            pending: ScanString::new(),
            keystroke_delay_ms,
        }
    }

    /// Text of the scan in progress. Empty between ticks.
    pub fn pending(&self) -> &str {
        &self.pending
    }

    /// Process one poll result observed at `now_us`.
    pub async fn tick<S, D>(
        &mut self,
        event: ScanEvent,
        now_us: u64,
        session: &Session,
        sink: &mut S,
        delay: &mut D,
    ) -> ScanOutcome<S::Error>
    where
        S: ReportSink,
        D: DelayNs,
    {
        let ScanEvent::TagDetected(uid) = event else {
            return ScanOutcome::Idle;
        };
        self.pending = uid;

        let outcome = match self.debouncer.on_tag(now_us) {
            Decision::Skipped => ScanOutcome::Skipped,
            Decision::Accepted if !session.can_transmit() => ScanOutcome::Offline {
                uid: self.pending.clone(),
            },
            Decision::Accepted => self.type_pending(sink, delay).await,
        };

        self.pending.clear();
        outcome
    }

    async fn type_pending<S, D>(&mut self, sink: &mut S, delay: &mut D) -> ScanOutcome<S::Error>
    where
        S: ReportSink,
        D: DelayNs,
    {
        let uid = self.pending.clone();
        // SCAN_STRING_CAPACITY reserves room for the suffix.
        let _ = self.pending.push_str(HID_INPUT_SUFFIX);

        match type_text(&self.pending, sink, delay, self.keystroke_delay_ms).await {
            Ok(reports) => ScanOutcome::Typed { uid, reports },
            Err(error) => ScanOutcome::TransportFailed { uid, error },
        }
    }
}

impl Default for ScanLoop {
    fn default() -> Self {
        Self::new()
    }
}
