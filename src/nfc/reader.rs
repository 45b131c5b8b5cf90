//! PN532 driver over I²C.
//!
//! Every command follows the same exchange:
//!
//! 1. Write the command frame.
//! 2. Poll the status byte until ready, read and check the ACK frame.
//! 3. Poll the status byte until ready, read the response frame.
//!
//! If the PN532 does not become ready in time the command is aborted by
//! sending an ACK frame.

use embedded_hal_async::delay::DelayNs;
use embedded_hal_async::i2c::I2c;

use super::pn532::{self, commands, FirmwareVersion, FrameError, MAX_FRAME_LEN, STATUS_READY};
use super::{TagReader, TagUid};
use crate::config::{
    NFC_PASSIVE_ACTIVATION_RETRIES, NFC_READY_POLL_MS, NFC_RESPONSE_TIMEOUT_MS, PN532_I2C_ADDRESS,
};
use crate::error::NfcError;

/// PN532 on an async I²C bus.
pub struct Pn532<I2C, D> {
    i2c: I2C,
    delay: D,
    timeout_ms: u32,
}

impl<I2C, D> Pn532<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    pub fn new(i2c: I2C, delay: D) -> Self {
        Self {
            i2c,
            delay,
            timeout_ms: NFC_RESPONSE_TIMEOUT_MS,
        }
    }

    /// Override the ready timeout (ms).
    #[cfg(test)]
    pub fn with_timeout(mut self, timeout_ms: u32) -> Self {
        self.timeout_ms = timeout_ms;
        self
    }

    /// Query the chip and verify it is a PN532.
    pub async fn firmware_version(&mut self) -> Result<FirmwareVersion, NfcError> {
        let mut response = [0u8; MAX_FRAME_LEN];
        let data = self
            .command(commands::GET_FIRMWARE_VERSION, &[], &mut response)
            .await?;
        let version = FirmwareVersion::parse(data).ok_or(FrameError::Truncated)?;
        if version.ic != pn532::PN532_IC {
            return Err(NfcError::WrongChip(version.ic));
        }
        Ok(version)
    }

    /// Put the SAM in normal mode and bound passive activation retries.
    pub async fn configure(&mut self) -> Result<(), NfcError> {
        let mut response = [0u8; MAX_FRAME_LEN];
        self.command(commands::SAM_CONFIGURATION, &pn532::SAM_NORMAL_MODE, &mut response)
            .await?;

        // MxRtyATR, MxRtyPSL, MxRtyPassiveActivation
        let retries = [
            pn532::RF_CONFIG_MAX_RETRIES,
            0xFF,
            0x01,
            NFC_PASSIVE_ACTIVATION_RETRIES,
        ];
        self.command(commands::RF_CONFIGURATION, &retries, &mut response)
            .await?;
        Ok(())
    }

    /// Look for one ISO14443A target and return its UID.
    pub async fn read_passive_target(&mut self) -> Result<Option<TagUid>, NfcError> {
        let mut response = [0u8; MAX_FRAME_LEN];
        match self
            .command(
                commands::IN_LIST_PASSIVE_TARGET,
                &pn532::LIST_ONE_ISO14443A,
                &mut response,
            )
            .await
        {
            Ok(data) => Ok(pn532::parse_passive_target(data)?),
            // Retries exhausted without a target in the field.
            Err(NfcError::Timeout) => Ok(None),
            Err(e) => Err(e),
        }
    }

    /// Run one command and return the response data.
    async fn command<'r>(
        &mut self,
        command: u8,
        params: &[u8],
        response: &'r mut [u8; MAX_FRAME_LEN],
    ) -> Result<&'r [u8], NfcError> {
        let mut frame = [0u8; MAX_FRAME_LEN];
        let len = pn532::encode_command(command, params, &mut frame)?;
        self.i2c
            .write(PN532_I2C_ADDRESS, &frame[..len])
            .await
            .map_err(|_| NfcError::Bus)?;

        self.wait_ready().await?;
        let mut ack = [0u8; 1 + pn532::ACK_FRAME.len()];
        self.i2c
            .read(PN532_I2C_ADDRESS, &mut ack)
            .await
            .map_err(|_| NfcError::Bus)?;
        if !pn532::is_ack(&ack[1..]) {
            return Err(NfcError::NoAck);
        }

        if let Err(e) = self.wait_ready().await {
            self.abort().await;
            return Err(e);
        }
        self.i2c
            .read(PN532_I2C_ADDRESS, &mut response[..])
            .await
            .map_err(|_| NfcError::Bus)?;

        Ok(pn532::decode_response(command, &response[1..])?)
    }

    /// Poll the status byte until the PN532 has data for us.
    async fn wait_ready(&mut self) -> Result<(), NfcError> {
        let mut waited = 0;
        loop {
            let mut status = [0u8; 1];
            self.i2c
                .read(PN532_I2C_ADDRESS, &mut status)
                .await
                .map_err(|_| NfcError::Bus)?;
            if status[0] & STATUS_READY != 0 {
                return Ok(());
            }
            if waited >= self.timeout_ms {
                return Err(NfcError::Timeout);
            }
            self.delay.delay_ms(NFC_READY_POLL_MS).await;
            waited += NFC_READY_POLL_MS;
        }
    }

    /// Cancel the running command. Failures are irrelevant: the next
    /// command write resynchronises the chip.
    async fn abort(&mut self) {
        let _ = self.i2c.write(PN532_I2C_ADDRESS, &pn532::ACK_FRAME).await;
    }

    /// Hand back the bus so tests can inspect what was written.
    #[cfg(test)]
    pub fn release(self) -> (I2C, D) {
        (self.i2c, self.delay)
    }
}

impl<I2C, D> TagReader for Pn532<I2C, D>
where
    I2C: I2c,
    D: DelayNs,
{
    type Error = NfcError;

    async fn poll(&mut self) -> Result<Option<TagUid>, NfcError> {
        self.read_passive_target().await
    }
}

#[cfg(test)]
mod tests {
    use embassy_futures::block_on;
    use embedded_hal_async::i2c::{ErrorKind, ErrorType, Operation};
    use heapless::{Deque, Vec};

    use super::*;
    use crate::nfc::pn532::{ACK_FRAME, TFI_PN532_TO_HOST};

    type Bytes = Vec<u8, MAX_FRAME_LEN>;

    /// Scripted PN532: every read pops the next queued payload. Once the
    /// script runs out the chip reports "not ready" forever.
    #[derive(Default)]
    struct MockBus {
        reads: Deque<Bytes, 32>,
        writes: Vec<Bytes, 16>,
        fail_writes: bool,
    }

    impl MockBus {
        fn queue(&mut self, bytes: &[u8]) {
            self.reads
                .push_back(Bytes::from_slice(bytes).unwrap())
                .unwrap();
        }

        /// Queue a complete exchange: ready, ACK, ready, response.
        fn queue_exchange(&mut self, command: u8, data: &[u8]) {
            self.queue(&[STATUS_READY]);
            let mut ack = Bytes::new();
            ack.push(STATUS_READY).unwrap();
            ack.extend_from_slice(&ACK_FRAME).unwrap();
            self.queue(&ack);
            self.queue(&[STATUS_READY]);

            let mut frame = Bytes::new();
            let len = (data.len() + 2) as u8;
            frame
                .extend_from_slice(&[STATUS_READY, 0x00, 0x00, 0xFF, len, len.wrapping_neg()])
                .unwrap();
            frame.push(TFI_PN532_TO_HOST).unwrap();
            frame.push(command + 1).unwrap();
            frame.extend_from_slice(data).unwrap();
            let sum = frame[6..].iter().fold(0u8, |acc, b| acc.wrapping_add(*b));
            frame.push(sum.wrapping_neg()).unwrap();
            frame.push(0x00).unwrap();
            self.queue(&frame);
        }
    }

    impl ErrorType for MockBus {
        type Error = ErrorKind;
    }

    impl I2c for MockBus {
        async fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            assert_eq!(address, PN532_I2C_ADDRESS);
            for op in operations {
                match op {
                    Operation::Write(bytes) => {
                        if self.fail_writes {
                            return Err(ErrorKind::Other);
                        }
                        self.writes.push(Bytes::from_slice(bytes).unwrap()).unwrap();
                    }
                    Operation::Read(buf) => {
                        buf.fill(0);
                        if let Some(next) = self.reads.pop_front() {
                            let n = next.len().min(buf.len());
                            buf[..n].copy_from_slice(&next[..n]);
                        }
                    }
                }
            }
            Ok(())
        }
    }

    struct NoDelay;

    impl DelayNs for NoDelay {
        async fn delay_ns(&mut self, _ns: u32) {}
    }

    fn reader(bus: MockBus) -> Pn532<MockBus, NoDelay> {
        Pn532::new(bus, NoDelay).with_timeout(5)
    }

    #[test]
    fn firmware_version_accepts_pn532() {
        let mut bus = MockBus::default();
        bus.queue_exchange(commands::GET_FIRMWARE_VERSION, &[0x32, 0x01, 0x06, 0x07]);
        let mut nfc = reader(bus);

        let fw = block_on(nfc.firmware_version()).unwrap();
        assert_eq!((fw.ic, fw.version, fw.revision), (0x32, 1, 6));

        let (bus, _) = nfc.release();
        assert_eq!(
            bus.writes[0].as_slice(),
            &[0x00, 0x00, 0xFF, 0x02, 0xFE, 0xD4, 0x02, 0x2A, 0x00]
        );
    }

    #[test]
    fn firmware_version_rejects_other_chip() {
        let mut bus = MockBus::default();
        bus.queue_exchange(commands::GET_FIRMWARE_VERSION, &[0x31, 0x01, 0x06, 0x07]);
        let mut nfc = reader(bus);

        assert_eq!(block_on(nfc.firmware_version()), Err(NfcError::WrongChip(0x31)));
    }

    #[test]
    fn configure_sends_sam_and_retry_limits() {
        let mut bus = MockBus::default();
        bus.queue_exchange(commands::SAM_CONFIGURATION, &[]);
        bus.queue_exchange(commands::RF_CONFIGURATION, &[]);
        let mut nfc = reader(bus);

        block_on(nfc.configure()).unwrap();

        let (bus, _) = nfc.release();
        assert_eq!(bus.writes.len(), 2);
        assert_eq!(bus.writes[0][6], commands::SAM_CONFIGURATION);
        assert_eq!(bus.writes[1][6], commands::RF_CONFIGURATION);
        assert_eq!(
            &bus.writes[1][7..11],
            &[0x05, 0xFF, 0x01, NFC_PASSIVE_ACTIVATION_RETRIES]
        );
    }

    #[test]
    fn passive_target_returns_uid() {
        let mut bus = MockBus::default();
        bus.queue_exchange(
            commands::IN_LIST_PASSIVE_TARGET,
            &[0x01, 0x01, 0x00, 0x04, 0x08, 0x04, 0x04, 0x18, 0x09, 0x02],
        );
        let mut nfc = reader(bus);

        let uid = block_on(nfc.poll()).unwrap().unwrap();
        assert_eq!(uid.as_slice(), &[4, 24, 9, 2]);
    }

    #[test]
    fn passive_target_no_tag() {
        let mut bus = MockBus::default();
        bus.queue_exchange(commands::IN_LIST_PASSIVE_TARGET, &[0x00]);
        let mut nfc = reader(bus);

        assert_eq!(block_on(nfc.poll()), Ok(None));
    }

    #[test]
    fn response_timeout_aborts_command_and_reports_no_tag() {
        let mut bus = MockBus::default();
        bus.queue(&[STATUS_READY]);
        let mut ack = Bytes::new();
        ack.push(STATUS_READY).unwrap();
        ack.extend_from_slice(&ACK_FRAME).unwrap();
        bus.queue(&ack);
        let mut nfc = reader(bus);

        assert_eq!(block_on(nfc.read_passive_target()), Ok(None));

        let (bus, _) = nfc.release();
        assert_eq!(bus.writes.len(), 2);
        assert_eq!(bus.writes[1].as_slice(), &ACK_FRAME);
    }

    #[test]
    fn missing_ack_is_an_error() {
        let mut bus = MockBus::default();
        bus.queue(&[STATUS_READY]);
        bus.queue(&[STATUS_READY, 0x00, 0x00, 0xFF, 0x02, 0xFE, 0x00]);
        let mut nfc = reader(bus);

        assert_eq!(block_on(nfc.firmware_version()), Err(NfcError::NoAck));
    }

    #[test]
    fn bus_error_is_reported() {
        let bus = MockBus {
            fail_writes: true,
            ..Default::default()
        };
        let mut nfc = reader(bus);

        assert_eq!(block_on(nfc.poll()), Err(NfcError::Bus));
    }
}
