// src/session/io_helpers.rs

use super::Session;
use crate::common::{
    error::SensorError,
    frame::FrameDecoder,
    hal_traits::{SensorSerial, SensorTimer},
};
use core::time::Duration;

/// Whole milliseconds, rounded up so a delay never undershoots.
fn ceil_millis(duration: Duration) -> u32 {
    let ms = duration.as_micros().div_ceil(1000);
    u32::try_from(ms).unwrap_or(u32::MAX)
}

impl<IF, D> Session<IF, D>
where
    IF: SensorSerial + SensorTimer,
    D: FrameDecoder,
{
    /// Feeds every byte the transport has right now into the decoder.
    ///
    /// Stops right after a completed frame so the bytes behind it stay in the
    /// transport for the next call.
    pub(super) fn pump(&mut self) -> Result<Option<D::Frame>, SensorError<IF::Error>> {
        while self.interface.bytes_available() > 0 {
            match self.interface.read_byte() {
                Ok(byte) => {
                    if let Some(frame) = self.decoder.feed(byte) {
                        return Ok(Some(frame));
                    }
                }
                Err(nb::Error::WouldBlock) => break,
                Err(nb::Error::Other(e)) => return Err(SensorError::Io(e)),
            }
        }
        Ok(None)
    }

    /// Non-blocking read: one pass over the bytes available now.
    pub(super) fn poll(&mut self) -> Result<Option<D::Frame>, SensorError<IF::Error>> {
        self.pump()
    }

    /// Pumps until a frame is decoded or `timeout` has elapsed.
    ///
    /// Sleeps are clamped to the remaining budget, so `Timeout` is reported
    /// exactly when the budget runs out. A partial frame is dropped on timeout.
    pub(super) fn read_frame_blocking(&mut self, timeout: Duration) -> Result<D::Frame, SensorError<IF::Error>> {
        let deadline = self.interface.now() + timeout;
        loop {
            if let Some(frame) = self.pump()? {
                return Ok(frame);
            }
            let now = self.interface.now();
            if now >= deadline {
                self.decoder.reset();
                log::warn!("no valid frame within {} ms", timeout.as_millis());
                return Err(SensorError::Timeout);
            }
            let sleep = (deadline - now).min(self.config.poll_interval);
            self.interface.delay_ms(ceil_millis(sleep).max(1));
        }
    }

    /// Writes a complete command; a partial write is an error.
    pub(super) fn send_bytes(&mut self, bytes: &[u8]) -> Result<(), SensorError<IF::Error>> {
        let written = self.interface.write_bytes(bytes).map_err(SensorError::Io)?;
        if written != bytes.len() {
            log::warn!("short write: {} of {} bytes", written, bytes.len());
            return Err(SensorError::ShortWrite { written, expected: bytes.len() });
        }
        Ok(())
    }

    /// Sleeps for `duration` on the transport's timer.
    pub(super) fn pause(&mut self, duration: Duration) {
        if !duration.is_zero() {
            self.interface.delay_ms(ceil_millis(duration));
        }
    }
}
