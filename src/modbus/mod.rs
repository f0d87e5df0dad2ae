// src/modbus/mod.rs

//! Modbus RTU framing for the CO2 sensor: request encoding, reply
//! validation and the incremental reply decoder.

pub mod codec;
pub mod decoder;

pub use codec::{FunctionCode, ModbusRequest, ModbusResponse, MAX_READ_REGISTERS};
pub use decoder::{ModbusReply, ModbusResponseDecoder, OutstandingRequest};
