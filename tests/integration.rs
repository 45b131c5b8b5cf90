//! Integration tests for nfc2ble host-testable logic.
//!
//! Drives the scan loop the way the firmware does: a tag reader feeds
//! poll results, the session is driven by transport callbacks and every
//! accepted scan ends up as keyboard reports in a recording sink.

use embassy_futures::block_on;
use embedded_hal_async::delay::DelayNs;
use nfc2ble::config::POLL_INTERVAL_MS;
use nfc2ble::hid::keyboard::INPUT_REPORT_SIZE;
use nfc2ble::hid::ReportSink;
use nfc2ble::nfc::{ScanEvent, TagReader, TagUid};
use nfc2ble::{InputChannel, ScanLoop, ScanOutcome, Session, SessionEvents};

type Report = [u8; INPUT_REPORT_SIZE];

struct Cccd;

impl InputChannel for Cccd {
    fn set_notifications(&self, _enabled: bool) {}
}

#[derive(Default)]
struct Host {
    reports: Vec<Report>,
}

impl Host {
    /// Keys pressed, in order, ignoring release reports.
    fn pressed_usages(&self) -> Vec<u8> {
        self.reports
            .iter()
            .filter(|r| r[2] != 0)
            .map(|r| r[2])
            .collect()
    }
}

impl ReportSink for Host {
    type Error = ();

    async fn send_input(&mut self, _report_id: u8, report: &Report) -> Result<(), ()> {
        self.reports.push(*report);
        Ok(())
    }
}

struct NoDelay;

impl DelayNs for NoDelay {
    async fn delay_ns(&mut self, _ns: u32) {}
}

/// Reader replaying one poll result per tick.
struct ScriptedReader {
    polls: std::vec::IntoIter<Option<TagUid>>,
}

impl ScriptedReader {
    fn new(polls: Vec<Option<TagUid>>) -> Self {
        Self {
            polls: polls.into_iter(),
        }
    }
}

fn tag(uid: &[u8]) -> Option<TagUid> {
    Some(TagUid::from_slice(uid).unwrap())
}

impl TagReader for ScriptedReader {
    type Error = ();

    async fn poll(&mut self) -> Result<Option<TagUid>, ()> {
        Ok(self.polls.next().flatten())
    }
}

/// Run every scripted poll, one tick per poll interval.
fn run(reader: &mut ScriptedReader, session: &Session, host: &mut Host) -> Vec<ScanOutcome<()>> {
    let mut scan = ScanLoop::new();
    let mut outcomes = Vec::new();
    let mut now_us = 0;
    for _ in 0..reader.polls.len() {
        let event = ScanEvent::from(block_on(reader.poll()).unwrap());
        outcomes.push(block_on(scan.tick(event, now_us, session, host, &mut NoDelay)));
        assert_eq!(scan.pending(), "");
        now_us += POLL_INTERVAL_MS * 1_000;
    }
    outcomes
}

fn connected() -> Session {
    let session = Session::new();
    session.on_connect(&Cccd);
    session
}

#[test]
fn scanned_uid_is_typed_with_enter() {
    let session = connected();
    let mut host = Host::default();
    let mut reader = ScriptedReader::new(vec![tag(&[1, 2, 3])]);

    let outcomes = run(&mut reader, &session, &mut host);

    assert!(matches!(outcomes[0], ScanOutcome::Typed { reports: 10, .. }));
    assert_eq!(host.reports.len(), 10);
    // '1' '2' '3' Enter
    assert_eq!(host.pressed_usages(), vec![0x1E, 0x1F, 0x20, 0x28]);
    assert!(host.reports.iter().skip(1).step_by(2).all(|r| *r == [0; 8]));
}

#[test]
fn held_tag_is_typed_once() {
    let session = connected();
    let mut host = Host::default();
    let mut reader = ScriptedReader::new(vec![tag(&[4, 24, 9, 2]); 20]);

    let outcomes = run(&mut reader, &session, &mut host);

    let typed = outcomes
        .iter()
        .filter(|o| matches!(o, ScanOutcome::Typed { .. }))
        .count();
    assert_eq!(typed, 1);
    assert_eq!(outcomes.len(), 20);
}

#[test]
fn tag_presented_again_after_window_is_typed_again() {
    let session = connected();
    let mut host = Host::default();
    // Present, remove for two ticks, present again 300 ms later.
    let mut reader = ScriptedReader::new(vec![tag(&[9]), None, None, tag(&[9])]);

    let outcomes = run(&mut reader, &session, &mut host);

    assert!(matches!(outcomes[1], ScanOutcome::Idle));
    assert!(matches!(outcomes[3], ScanOutcome::Typed { .. }));
    assert_eq!(host.pressed_usages(), vec![0x26, 0x28, 0x26, 0x28]);
}

#[test]
fn quick_re_presentation_is_suppressed() {
    let session = connected();
    let mut host = Host::default();
    // Held for two ticks, removed for one, presented again.
    let mut reader = ScriptedReader::new(vec![tag(&[9]), tag(&[9]), None, tag(&[9])]);

    let outcomes = run(&mut reader, &session, &mut host);

    assert!(matches!(outcomes[1], ScanOutcome::Skipped));
    // 200 ms after the skipped read at 100 ms: outside the window again.
    assert!(matches!(outcomes[3], ScanOutcome::Typed { .. }));
}

#[test]
fn scans_while_disconnected_are_lost() {
    let session = Session::new();
    let mut host = Host::default();
    let mut reader = ScriptedReader::new(vec![tag(&[1])]);

    let outcomes = run(&mut reader, &session, &mut host);

    assert!(matches!(outcomes[0], ScanOutcome::Offline { .. }));
    assert!(host.reports.is_empty());
}

#[test]
fn host_disabling_notifications_pauses_output() {
    let session = connected();
    session.on_input_cccd_write(false);
    let mut host = Host::default();
    let mut reader = ScriptedReader::new(vec![tag(&[1])]);

    run(&mut reader, &session, &mut host);
    assert!(host.reports.is_empty());

    session.on_input_cccd_write(true);
    let mut reader = ScriptedReader::new(vec![tag(&[1])]);
    run(&mut reader, &session, &mut host);
    assert_eq!(host.reports.len(), 6);
}

#[test]
fn disconnect_then_reconnect() {
    let session = connected();
    session.on_disconnect(&Cccd);
    assert!(!session.can_transmit());

    session.on_connect(&Cccd);
    let mut host = Host::default();
    let mut reader = ScriptedReader::new(vec![tag(&[7, 7])]);
    run(&mut reader, &session, &mut host);

    assert_eq!(host.pressed_usages(), vec![0x24, 0x24, 0x28]);
}
