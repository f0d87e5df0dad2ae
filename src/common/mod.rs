// src/common/mod.rs

// --- Declare all public modules within common ---
pub mod address;
pub mod board;
pub mod crc;
pub mod error;
pub mod frame;
pub mod hal_traits;
pub mod timing;
pub mod types;

// --- Re-export key types/traits/functions for easier access ---

// From address.rs
pub use address::ModbusAddr;

// From board.rs
pub use board::{BoardDef, BoardType, McuFamily, SensorKind, UartSensorDef};

// From crc.rs
pub use crc::{calculate_crc16, checksum16, decode_crc16, encode_crc16, verify_frame_crc16};

// From error.rs
pub use error::SensorError;

// From frame.rs
pub use frame::{DecoderStats, FrameDecoder};

// From hal_traits.rs
pub use hal_traits::{MillisInstant, SensorInstant, SensorSerial, SensorTimer};

// From types.rs
pub use types::{PlausibleRange, SampleAccumulator};

// Timing constants stay under common::timing::*

// --- Feature-gated re-exports ---

// Native HAL integration (from hal_traits.rs)
#[cfg(feature = "impl-native")]
pub use hal_traits::NativeAdapter;
