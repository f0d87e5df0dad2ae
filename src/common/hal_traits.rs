// src/common/hal_traits.rs

use core::fmt::Debug;
use core::ops::{Add, Sub};
use core::time::Duration;

/// A point on the transport's monotonic clock.
///
/// Sessions only ever add a `Duration` to an instant and subtract two
/// instants, so any monotonic tick counter can implement this.
pub trait SensorInstant:
    Copy + Ord + Debug + Add<Duration, Output = Self> + Sub<Self, Output = Duration>
{
}

impl<T> SensorInstant for T where
    T: Copy + Ord + Debug + Add<Duration, Output = T> + Sub<T, Output = Duration>
{
}

/// Millisecond tick counter, usable as the `Instant` of most firmware clocks.
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub struct MillisInstant(pub u64);

impl Add<Duration> for MillisInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MillisInstant(self.0.saturating_add(rhs.as_millis() as u64))
    }
}

impl Sub<MillisInstant> for MillisInstant {
    type Output = Duration;
    fn sub(self, rhs: MillisInstant) -> Duration {
        Duration::from_millis(self.0.saturating_sub(rhs.0))
    }
}

/// Abstraction for the clock and delay operations the sessions need.
pub trait SensorTimer {
    /// Monotonic instant type.
    type Instant: SensorInstant;

    /// Delay for at least the specified number of milliseconds.
    fn delay_ms(&mut self, ms: u32);

    /// Current time on a monotonic clock.
    fn now(&self) -> Self::Instant;
}

/// Abstraction for the UART link to a sensor.
pub trait SensorSerial {
    /// Associated error type for communication errors.
    type Error: Debug;

    /// Number of received bytes that can be read right now.
    ///
    /// May under-report (an implementation that can only tell "something is
    /// there" returns 1), but must never over-report. A transport that hits
    /// an error here should return nonzero and report the error from
    /// `read_byte`.
    fn bytes_available(&mut self) -> usize;

    /// Attempts to read a single byte from the serial interface.
    ///
    /// Returns `Err(nb::Error::WouldBlock)` if no byte is available yet.
    fn read_byte(&mut self) -> nb::Result<u8, Self::Error>;

    /// Writes the whole buffer, returning the number of bytes accepted.
    fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, Self::Error>;

    /// Discards everything currently buffered on the receive side.
    fn flush_input(&mut self) -> Result<(), Self::Error>;
}

/// Bundles an `embedded-io` UART, an `embedded-hal` delay and a millisecond
/// clock into one transport usable by the sessions.
///
/// ```ignore
/// let port = NativeAdapter::new(uart, delay, || timer.now().ticks());
/// let mut pms = ParticulateSensor::new(port, SessionConfig::default());
/// ```
#[cfg(feature = "impl-native")]
pub struct NativeAdapter<U, D, C> {
    uart: U,
    delay: D,
    clock: C,
}

#[cfg(feature = "impl-native")]
impl<U, D, C> NativeAdapter<U, D, C>
where
    C: Fn() -> u64,
{
    /// `clock` must return milliseconds from any fixed, monotonic origin.
    pub fn new(uart: U, delay: D, clock: C) -> Self {
        NativeAdapter { uart, delay, clock }
    }

    pub fn release(self) -> (U, D, C) {
        (self.uart, self.delay, self.clock)
    }
}

#[cfg(feature = "impl-native")]
impl<U, D, C> SensorSerial for NativeAdapter<U, D, C>
where
    U: embedded_io::Read + embedded_io::ReadReady + embedded_io::Write,
    U::Error: Debug,
{
    type Error = U::Error;

    /// Reports 1 on a UART error so the following `read_byte` surfaces it.
    fn bytes_available(&mut self) -> usize {
        match self.uart.read_ready() {
            Ok(false) => 0,
            Ok(true) | Err(_) => 1,
        }
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if !self.uart.read_ready().map_err(nb::Error::Other)? {
            return Err(nb::Error::WouldBlock);
        }
        let mut byte = [0u8; 1];
        match self.uart.read(&mut byte).map_err(nb::Error::Other)? {
            0 => Err(nb::Error::WouldBlock),
            _ => Ok(byte[0]),
        }
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        self.uart.write_all(bytes)?;
        self.uart.flush()?;
        Ok(bytes.len())
    }

    fn flush_input(&mut self) -> Result<(), Self::Error> {
        let mut scratch = [0u8; 16];
        while self.uart.read_ready()? {
            if self.uart.read(&mut scratch)? == 0 {
                break;
            }
        }
        Ok(())
    }
}

#[cfg(feature = "impl-native")]
impl<U, D, C> SensorTimer for NativeAdapter<U, D, C>
where
    D: embedded_hal::delay::DelayNs,
    C: Fn() -> u64,
{
    type Instant = MillisInstant;

    fn delay_ms(&mut self, ms: u32) {
        self.delay.delay_ms(ms);
    }

    fn now(&self) -> Self::Instant {
        MillisInstant((self.clock)())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_millis_instant_arithmetic() {
        let start = MillisInstant(1_000);
        let later = start + Duration::from_millis(250);
        assert_eq!(later, MillisInstant(1_250));
        assert_eq!(later - start, Duration::from_millis(250));
        // Saturates instead of wrapping when the clock appears to go backwards
        assert_eq!(start - later, Duration::ZERO);
    }

    #[test]
    fn test_millis_instant_ordering() {
        assert!(MillisInstant(5) < MillisInstant(6));
        assert!(MillisInstant(u64::MAX) + Duration::from_millis(1) >= MillisInstant(u64::MAX));
    }
}
