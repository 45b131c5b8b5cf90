//! Keystroke synthesis - turns text into paced key-down / key-up reports.
//!
//! Every mapped character produces exactly two reports: the key (with
//! its modifier) pressed, then [`NO_KEY_PRESSED`]. Hosts detect key
//! presses on report transitions, so without the release report two
//! equal consecutive characters would collapse into one keystroke.
//! Each report is followed by a fixed delay.
//!
//! The typer does not check whether the link is ready; callers only
//! invoke it while the session can transmit.

use embedded_hal_async::delay::DelayNs;

use super::keyboard::{InputReport, INPUT_REPORT_SIZE, KEYBOARD_REPORT_ID, NO_KEY_PRESSED};
use super::keymap::KeyMapping;

/// Outbound report channel (BLE notification, test recorder, ...).
#[allow(async_fn_in_trait)]
pub trait ReportSink {
    type Error;

    /// Transmit one input report. Called strictly in order, never retried.
    async fn send_input(
        &mut self,
        report_id: u8,
        report: &[u8; INPUT_REPORT_SIZE],
    ) -> Result<(), Self::Error>;
}

/// Type `text` into `sink`, waiting `delay_ms` after every report.
///
/// Characters without a mapping are skipped without sending anything or
/// waiting. The first transport error aborts the rest of the text.
///
/// Returns the number of reports sent.
pub async fn type_text<S, D>(
    text: &str,
    sink: &mut S,
    delay: &mut D,
    delay_ms: u32,
) -> Result<usize, S::Error>
where
    S: ReportSink,
    D: DelayNs,
{
    let release = NO_KEY_PRESSED.to_bytes();
    let mut sent = 0;

    for c in text.chars() {
        let Some(mapping) = KeyMapping::for_char(c) else {
            continue;
        };

        let press = InputReport::single_key(mapping.modifier, mapping.usage).to_bytes();
        sink.send_input(KEYBOARD_REPORT_ID, &press).await?;
        sent += 1;
        delay.delay_ms(delay_ms).await;

        sink.send_input(KEYBOARD_REPORT_ID, &release).await?;
        sent += 1;
        delay.delay_ms(delay_ms).await;
    }

    Ok(sent)
}
