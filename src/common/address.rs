// src/common/address.rs

use super::error::SensorError;
use core::convert::TryFrom;
use core::fmt;

/// A Modbus device address as used by the CO2 sensor.
///
/// Unicast addresses are 1..=247. The sensor additionally answers on 0xFE
/// ("any sensor"), which is what a single sensor on a dedicated UART uses.
#[derive(Copy, Clone, Eq, PartialEq, Ord, PartialOrd, Hash, Debug)]
pub struct ModbusAddr(u8);

impl ModbusAddr {
    pub const ANY_SENSOR: ModbusAddr = ModbusAddr(0xFE);
    pub const DEFAULT_ADDRESS: ModbusAddr = Self::ANY_SENSOR;

    /// Creates a new `ModbusAddr` if the given byte is a usable address.
    /// Broadcast (0) is rejected: a broadcast request never gets a reply.
    pub fn new(address: u8) -> Result<Self, SensorError<()>> {
        if Self::is_valid_address(address) {
            Ok(ModbusAddr(address))
        } else {
            Err(SensorError::InvalidAddress(address))
        }
    }

    #[inline]
    pub const fn as_u8(&self) -> u8 {
        self.0
    }

    #[inline]
    pub const fn is_any_sensor(&self) -> bool {
        self.0 == 0xFE
    }

    #[inline]
    pub const fn is_valid_address(address: u8) -> bool {
        matches!(address, 1..=247 | 0xFE)
    }
}

impl Default for ModbusAddr {
    fn default() -> Self {
        Self::DEFAULT_ADDRESS
    }
}

impl TryFrom<u8> for ModbusAddr {
    type Error = SensorError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<ModbusAddr> for u8 {
    fn from(value: ModbusAddr) -> Self {
        value.0
    }
}

impl fmt::Display for ModbusAddr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:#04x}", self.0)
    }
}
