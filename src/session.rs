//! BLE session state shared between transport callbacks and the scan loop.
//!
//! ```text
//!                 connect                      notifications on
//! Disconnected ────────────► ConnectedNotifyOff ───────────────► ConnectedNotifyOn
//!      ▲                                                               │
//!      └─────────────────────────── disconnect ────────────────────────┘
//! ```
//!
//! The whole state is a single atomic byte: the scan loop can never
//! observe "connected" together with a notification flag left over from
//! an earlier connection. Only `ConnectedNotifyOn` allows transmission.

use core::sync::atomic::{AtomicU8, Ordering};

use crate::hid::OutputReport;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[repr(u8)]
pub enum LinkState {
    Disconnected = 0,
    ConnectedNotifyOff = 1,
    ConnectedNotifyOn = 2,
}

impl LinkState {
    const fn from_raw(raw: u8) -> Self {
        match raw {
            1 => LinkState::ConnectedNotifyOff,
            2 => LinkState::ConnectedNotifyOn,
            _ => LinkState::Disconnected,
        }
    }
}

/// Control over notifications on the input report characteristic.
pub trait InputChannel {
    fn set_notifications(&self, enabled: bool);
}

/// Entry points the BLE transport calls from its own execution context.
pub trait SessionEvents {
    /// A central connected.
    fn on_connect(&self, channel: &impl InputChannel);

    /// The central disconnected.
    fn on_disconnect(&self, channel: &impl InputChannel);

    /// The central wrote the input report CCCD.
    fn on_input_cccd_write(&self, notifications: bool);

    /// The central wrote the output report (LED state). The parsed state
    /// is handed back to the transport; the session does not keep it.
    fn on_output_write(&self, data: &[u8]) -> Option<OutputReport>;
}

/// Process-wide session state.
pub struct Session {
    state: AtomicU8,
}

impl Session {
    pub const fn new() -> Self {
        Self {
            state: AtomicU8::new(LinkState::Disconnected as u8),
        }
    }

    pub fn state(&self) -> LinkState {
        LinkState::from_raw(self.state.load(Ordering::Acquire))
    }

    /// Reports may only be sent in this state.
    pub fn can_transmit(&self) -> bool {
        self.state() == LinkState::ConnectedNotifyOn
    }

    fn set(&self, state: LinkState) {
        self.state.store(state as u8, Ordering::Release);
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

impl SessionEvents for Session {
    fn on_connect(&self, channel: &impl InputChannel) {
        self.set(LinkState::ConnectedNotifyOff);
        channel.set_notifications(true);
        self.set(LinkState::ConnectedNotifyOn);
    }

    fn on_disconnect(&self, channel: &impl InputChannel) {
        self.set(LinkState::Disconnected);
        channel.set_notifications(false);
    }

    fn on_input_cccd_write(&self, notifications: bool) {
        let next = if notifications {
            LinkState::ConnectedNotifyOn
        } else {
            LinkState::ConnectedNotifyOff
        };
        // Ignored while disconnected.
        let _ = self
            .state
            .fetch_update(Ordering::AcqRel, Ordering::Acquire, |raw| {
                match LinkState::from_raw(raw) {
                    LinkState::Disconnected => None,
                    _ => Some(next as u8),
                }
            });
    }

    fn on_output_write(&self, data: &[u8]) -> Option<OutputReport> {
        OutputReport::from_bytes(data)
    }
}

#[cfg(test)]
mod tests {
    use core::cell::RefCell;

    use super::*;

    /// Records every notification toggle and the session state seen at
    /// that moment.
    struct RecordingChannel<'a> {
        session: &'a Session,
        calls: RefCell<heapless::Vec<(bool, LinkState), 8>>,
    }

    impl<'a> RecordingChannel<'a> {
        fn new(session: &'a Session) -> Self {
            Self {
                session,
                calls: RefCell::new(heapless::Vec::new()),
            }
        }
    }

    impl InputChannel for RecordingChannel<'_> {
        fn set_notifications(&self, enabled: bool) {
            let _ = self
                .calls
                .borrow_mut()
                .push((enabled, self.session.state()));
        }
    }

    #[test]
    fn starts_disconnected() {
        let session = Session::new();
        assert_eq!(session.state(), LinkState::Disconnected);
        assert!(!session.can_transmit());
    }

    #[test]
    fn connect_enables_notifications_before_transmitting() {
        let session = Session::new();
        let channel = RecordingChannel::new(&session);

        session.on_connect(&channel);

        assert_eq!(session.state(), LinkState::ConnectedNotifyOn);
        assert!(session.can_transmit());
        // Notifications were switched on while still in NotifyOff.
        assert_eq!(
            channel.calls.borrow().as_slice(),
            &[(true, LinkState::ConnectedNotifyOff)]
        );
    }

    #[test]
    fn disconnect_stops_transmission_first() {
        let session = Session::new();
        let channel = RecordingChannel::new(&session);

        session.on_connect(&channel);
        session.on_disconnect(&channel);

        assert_eq!(session.state(), LinkState::Disconnected);
        assert!(!session.can_transmit());
        assert_eq!(
            channel.calls.borrow()[1],
            (false, LinkState::Disconnected)
        );
    }

    #[test]
    fn host_can_toggle_notifications_while_connected() {
        let session = Session::new();
        let channel = RecordingChannel::new(&session);
        session.on_connect(&channel);

        session.on_input_cccd_write(false);
        assert_eq!(session.state(), LinkState::ConnectedNotifyOff);
        assert!(!session.can_transmit());

        session.on_input_cccd_write(true);
        assert!(session.can_transmit());
    }

    #[test]
    fn cccd_write_ignored_while_disconnected() {
        let session = Session::new();
        session.on_input_cccd_write(true);
        assert_eq!(session.state(), LinkState::Disconnected);
    }

    #[test]
    fn reconnect_starts_from_fresh_state() {
        let session = Session::new();
        let channel = RecordingChannel::new(&session);

        session.on_connect(&channel);
        session.on_input_cccd_write(false);
        session.on_disconnect(&channel);
        session.on_connect(&channel);

        assert!(session.can_transmit());
    }

    #[test]
    fn output_write_parses_led_state() {
        let session = Session::new();
        let leds = session.on_output_write(&[0x03]).unwrap();
        assert!(leds.num_lock());
        assert!(leds.caps_lock());
        assert!(!leds.scroll_lock());

        assert!(session.on_output_write(&[]).is_none());
        // Output writes never change the link state.
        assert_eq!(session.state(), LinkState::Disconnected);
    }

    #[test]
    fn unknown_raw_state_reads_as_disconnected() {
        assert_eq!(LinkState::from_raw(0xFF), LinkState::Disconnected);
    }
}
