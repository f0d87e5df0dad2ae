// src/lib.rs

#![cfg_attr(not(test), no_std)] // no_std outside of unit tests

pub mod common;
pub mod modbus;
pub mod pm;
pub mod session;

#[cfg(test)]
mod test_support;

// Re-export key types for convenience
pub use common::{BoardType, ModbusAddr, SensorError};
pub use session::{Co2Sensor, ParticulateSensor, SessionConfig, SessionState};
