// src/session/config.rs

use crate::common::{
    address::ModbusAddr,
    board::McuFamily,
    timing,
    types::PlausibleRange,
};
use core::time::Duration;

/// Tunables of a sensor session. `Default` gives the datasheet values.
///
/// ```ignore
/// let config = SessionConfig::default()
///     .with_mcu(McuFamily::Esp8266)
///     .with_warm_up(Duration::from_secs(30));
/// ```
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct SessionConfig {
    /// How long after `begin()` readings are considered unreliable.
    pub warm_up: Duration,
    /// Budget for one particulate frame in a blocking read.
    pub read_timeout: Duration,
    /// Budget for a Modbus reply once the request is written.
    pub response_timeout: Duration,
    /// Budget for the probe performed by `begin()`.
    pub init_timeout: Duration,
    /// Sleep between two polls of the transport.
    pub poll_interval: Duration,
    /// Pause between two samples of an averaging run.
    pub inter_sample_delay: Duration,
    /// Samples outside this range are dropped from averages.
    pub co2_range: PlausibleRange,
    pub device_address: ModbusAddr,
    /// Family the firmware runs on, checked against the board table.
    pub mcu: McuFamily,
}

impl Default for SessionConfig {
    fn default() -> Self {
        SessionConfig {
            warm_up: timing::WARM_UP_INTERVAL,
            read_timeout: timing::PM_SINGLE_RESPONSE_TIME,
            response_timeout: timing::CO2_RESPONSE_TIMEOUT,
            init_timeout: timing::INIT_PROBE_TIMEOUT,
            poll_interval: timing::POLL_INTERVAL,
            inter_sample_delay: timing::CO2_INTER_SAMPLE_DELAY,
            co2_range: PlausibleRange::CO2_PPM,
            device_address: ModbusAddr::DEFAULT_ADDRESS,
            mcu: McuFamily::Esp32,
        }
    }
}

impl SessionConfig {
    pub fn with_warm_up(mut self, warm_up: Duration) -> Self {
        self.warm_up = warm_up;
        self
    }

    pub fn with_read_timeout(mut self, timeout: Duration) -> Self {
        self.read_timeout = timeout;
        self
    }

    pub fn with_response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }

    pub fn with_init_timeout(mut self, timeout: Duration) -> Self {
        self.init_timeout = timeout;
        self
    }

    /// A zero interval is bumped to 1 ms so blocking reads still yield.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval.max(Duration::from_millis(1));
        self
    }

    pub fn with_inter_sample_delay(mut self, delay: Duration) -> Self {
        self.inter_sample_delay = delay;
        self
    }

    pub fn with_co2_range(mut self, range: PlausibleRange) -> Self {
        self.co2_range = range;
        self
    }

    pub fn with_device_address(mut self, address: ModbusAddr) -> Self {
        self.device_address = address;
        self
    }

    pub fn with_mcu(mut self, mcu: McuFamily) -> Self {
        self.mcu = mcu;
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.warm_up, Duration::from_secs(10));
        assert_eq!(config.read_timeout, Duration::from_millis(1000));
        assert_eq!(config.response_timeout, Duration::from_millis(500));
        assert_eq!(config.inter_sample_delay, Duration::from_millis(250));
        assert_eq!(config.poll_interval, Duration::from_millis(10));
        assert_eq!(config.co2_range, PlausibleRange::new(300, 10_000));
        assert!(config.device_address.is_any_sensor());
    }

    #[test]
    fn test_builders() {
        let config = SessionConfig::default()
            .with_warm_up(Duration::from_secs(30))
            .with_poll_interval(Duration::ZERO)
            .with_mcu(McuFamily::Esp8266)
            .with_device_address(ModbusAddr::new(1).unwrap());
        assert_eq!(config.warm_up, Duration::from_secs(30));
        assert_eq!(config.poll_interval, Duration::from_millis(1));
        assert_eq!(config.mcu, McuFamily::Esp8266);
        assert_eq!(config.device_address.as_u8(), 1);
    }
}
