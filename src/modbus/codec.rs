// src/modbus/codec.rs

use crate::common::address::ModbusAddr;
use crate::common::crc::{calculate_crc16, encode_crc16, verify_frame_crc16};
use crate::common::error::SensorError;
use arrayvec::ArrayVec;
use core::convert::TryFrom;
use core::fmt::Debug;

/// Every request frame is exactly this long.
pub const REQUEST_LEN: usize = 8;
/// `[addr][func|0x80][code][crc:2]`
pub const EXCEPTION_LEN: usize = 5;
/// Upper bound on registers per read. Keeps replies inside the fixed buffers.
pub const MAX_READ_REGISTERS: u16 = 16;
/// Register bytes in the largest reply.
pub const MAX_DATA_LEN: usize = 2 * MAX_READ_REGISTERS as usize;
/// Largest reply this codec accepts.
pub const MAX_RESPONSE_LEN: usize = 5 + MAX_DATA_LEN;

/// Bit set on the function code of an exception reply.
const EXCEPTION_FLAG: u8 = 0x80;

/// Function codes used with the CO2 sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
#[repr(u8)]
pub enum FunctionCode {
    ReadHoldingRegisters = 0x03,
    ReadInputRegisters = 0x04,
    WriteSingleRegister = 0x06,
}

impl FunctionCode {
    #[inline]
    pub const fn code(self) -> u8 {
        self as u8
    }

    #[inline]
    pub const fn is_read(self) -> bool {
        matches!(self, FunctionCode::ReadHoldingRegisters | FunctionCode::ReadInputRegisters)
    }

    #[inline]
    pub const fn exception_code(self) -> u8 {
        self as u8 | EXCEPTION_FLAG
    }
}

impl TryFrom<u8> for FunctionCode {
    type Error = SensorError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0x03 => Ok(FunctionCode::ReadHoldingRegisters),
            0x04 => Ok(FunctionCode::ReadInputRegisters),
            0x06 => Ok(FunctionCode::WriteSingleRegister),
            _ => Err(SensorError::InvalidRequest),
        }
    }
}

/// One request to the device, before encoding.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ModbusRequest {
    pub address: ModbusAddr,
    pub function: FunctionCode,
    pub register: u16,
    /// Register count for reads, the value to store for writes.
    pub value: u16,
}

impl ModbusRequest {
    pub fn read_input_registers(address: ModbusAddr, register: u16, count: u16) -> Self {
        ModbusRequest { address, function: FunctionCode::ReadInputRegisters, register, value: count }
    }

    pub fn read_holding_registers(address: ModbusAddr, register: u16, count: u16) -> Self {
        ModbusRequest { address, function: FunctionCode::ReadHoldingRegisters, register, value: count }
    }

    pub fn write_single_register(address: ModbusAddr, register: u16, value: u16) -> Self {
        ModbusRequest { address, function: FunctionCode::WriteSingleRegister, register, value }
    }

    /// Builds the 8-byte wire frame.
    ///
    /// Reads must ask for 1..=`MAX_READ_REGISTERS` registers; nothing is
    /// produced otherwise.
    pub fn encode<E: Debug>(&self) -> Result<[u8; REQUEST_LEN], SensorError<E>> {
        if !self.is_well_formed() {
            return Err(SensorError::InvalidRequest);
        }
        let [reg_hi, reg_lo] = self.register.to_be_bytes();
        let [val_hi, val_lo] = self.value.to_be_bytes();
        let mut frame = [self.address.as_u8(), self.function.code(), reg_hi, reg_lo, val_hi, val_lo, 0, 0];
        let crc = encode_crc16(calculate_crc16(&frame[..6]));
        frame[6..].copy_from_slice(&crc);
        Ok(frame)
    }

    #[inline]
    fn is_well_formed(&self) -> bool {
        !self.function.is_read() || (1..=MAX_READ_REGISTERS).contains(&self.value)
    }

    /// Length of a successful reply: `5 + 2 * count` for reads, an echo of
    /// the request for writes.
    pub fn expected_response_len(&self) -> usize {
        if self.function.is_read() {
            5 + 2 * usize::from(self.value)
        } else {
            REQUEST_LEN
        }
    }

    /// True if `function_byte` is the exception form of this request's code.
    #[inline]
    pub fn is_exception_function(&self, function_byte: u8) -> bool {
        function_byte == self.function.exception_code()
    }

    /// Validates a complete read reply of exactly the expected length.
    pub fn validate_response<E: Debug>(&self, frame: &[u8]) -> Result<ModbusResponse, SensorError<E>> {
        if !self.function.is_read() || !self.is_well_formed() {
            return Err(SensorError::InvalidRequest);
        }
        let expected = self.expected_response_len();
        if frame.len() != expected {
            return Err(SensorError::InvalidLength { expected, got: frame.len() });
        }
        verify_frame_crc16::<E>(frame)?;
        self.check_header::<E>(frame)?;
        let declared = usize::from(frame[2]);
        let actual = frame.len() - 5;
        if declared != actual {
            return Err(SensorError::ByteCountMismatch { declared, actual });
        }

        let mut data = ArrayVec::new();
        if data.try_extend_from_slice(&frame[3..3 + actual]).is_err() {
            return Err(SensorError::InvalidLength { expected: MAX_RESPONSE_LEN, got: frame.len() });
        }
        Ok(ModbusResponse { address: self.address, function: self.function, data })
    }

    /// Validates a write acknowledgement, which must echo the request exactly.
    pub fn validate_echo<E: Debug>(&self, frame: &[u8]) -> Result<(), SensorError<E>> {
        if frame.len() != REQUEST_LEN {
            return Err(SensorError::InvalidLength { expected: REQUEST_LEN, got: frame.len() });
        }
        verify_frame_crc16::<E>(frame)?;
        self.check_header::<E>(frame)?;
        if frame != self.encode::<E>()?.as_slice() {
            return Err(SensorError::EchoMismatch);
        }
        Ok(())
    }

    /// Decodes an exception reply to this request into its exception code.
    pub fn parse_exception<E: Debug>(&self, frame: &[u8]) -> Result<u8, SensorError<E>> {
        if frame.len() != EXCEPTION_LEN {
            return Err(SensorError::InvalidLength { expected: EXCEPTION_LEN, got: frame.len() });
        }
        verify_frame_crc16::<E>(frame)?;
        if frame[0] != self.address.as_u8() {
            return Err(SensorError::UnexpectedAddress { expected: self.address.as_u8(), got: frame[0] });
        }
        if !self.is_exception_function(frame[1]) {
            return Err(SensorError::UnexpectedFunction { expected: self.function.exception_code(), got: frame[1] });
        }
        Ok(frame[2])
    }

    fn check_header<E: Debug>(&self, frame: &[u8]) -> Result<(), SensorError<E>> {
        if frame[0] != self.address.as_u8() {
            return Err(SensorError::UnexpectedAddress { expected: self.address.as_u8(), got: frame[0] });
        }
        if frame[1] != self.function.code() {
            return Err(SensorError::UnexpectedFunction { expected: self.function.code(), got: frame[1] });
        }
        Ok(())
    }
}

/// Register payload of a validated read reply.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct ModbusResponse {
    pub address: ModbusAddr,
    pub function: FunctionCode,
    data: ArrayVec<u8, MAX_DATA_LEN>,
}

impl ModbusResponse {
    /// Raw data bytes (the byte-count field already checked).
    pub fn data(&self) -> &[u8] {
        &self.data
    }

    pub fn register_count(&self) -> usize {
        self.data.len() / 2
    }

    /// Big-endian register value at `index`, if the reply carried it.
    pub fn register(&self, index: usize) -> Option<u16> {
        let hi = *self.data.get(2 * index)?;
        let lo = *self.data.get(2 * index + 1)?;
        Some(u16::from_be_bytes([hi, lo]))
    }

    pub fn registers(&self) -> impl Iterator<Item = u16> + '_ {
        self.data.chunks_exact(2).map(|w| u16::from_be_bytes([w[0], w[1]]))
    }
}
