// src/modbus/decoder.rs

use super::codec::{ModbusRequest, ModbusResponse, EXCEPTION_LEN, MAX_RESPONSE_LEN};
use crate::common::error::SensorError;
use crate::common::frame::{DecoderStats, FrameDecoder};
use arrayvec::ArrayVec;

/// The request a reply is being waited for, with its expected shape.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct OutstandingRequest {
    pub request: ModbusRequest,
    pub expected_len: usize,
}

impl OutstandingRequest {
    pub fn new(request: ModbusRequest) -> Self {
        OutstandingRequest { request, expected_len: request.expected_response_len() }
    }
}

/// A validated reply to the outstanding request.
#[derive(Debug, Clone, Eq, PartialEq)]
pub enum ModbusReply {
    /// Register data of a read.
    Registers(ModbusResponse),
    /// Exact echo of a write.
    WriteAck,
    /// The device refused the request with this exception code.
    Exception(u8),
}

/// Turns the byte stream coming back from the device into the reply for the
/// single outstanding request.
///
/// While disarmed every byte is skipped. Once armed, bytes before the device
/// address are skipped. When a collected frame fails validation its first
/// byte is dropped and the rest is scanned again from the next address byte,
/// so a stray address byte ahead of the reply does not cost the reply.
#[derive(Debug, Clone, Default)]
pub struct ModbusResponseDecoder {
    outstanding: Option<OutstandingRequest>,
    buffer: ArrayVec<u8, MAX_RESPONSE_LEN>,
    target_len: usize,
    stats: DecoderStats,
}

impl ModbusResponseDecoder {
    pub fn new() -> Self {
        Self::default()
    }

    /// Starts waiting for the reply to `request`, replacing any previous one.
    pub fn arm(&mut self, request: ModbusRequest) {
        let outstanding = OutstandingRequest::new(request);
        self.target_len = outstanding.expected_len;
        self.outstanding = Some(outstanding);
        self.buffer.clear();
    }

    /// Gives up on the outstanding request (timeout).
    pub fn disarm(&mut self) {
        self.outstanding = None;
        self.buffer.clear();
    }

    pub fn outstanding(&self) -> Option<&OutstandingRequest> {
        self.outstanding.as_ref()
    }

    /// Replays the tail of a rejected window. Each replay is shorter than the
    /// window it came from, so the recursion through `feed` is bounded.
    fn resync(&mut self, bytes: &[u8]) -> Option<ModbusReply> {
        let mut reply = None;
        for &byte in bytes {
            if let Some(found) = self.feed(byte) {
                reply.get_or_insert(found);
            }
        }
        reply
    }

    fn validate(&self, request: &ModbusRequest) -> Result<ModbusReply, SensorError<()>> {
        let frame = self.buffer.as_slice();
        if frame.len() == EXCEPTION_LEN && request.is_exception_function(frame[1]) {
            return request.parse_exception(frame).map(ModbusReply::Exception);
        }
        if request.function.is_read() {
            request.validate_response(frame).map(ModbusReply::Registers)
        } else {
            request.validate_echo(frame).map(|_| ModbusReply::WriteAck)
        }
    }
}

impl FrameDecoder for ModbusResponseDecoder {
    type Frame = ModbusReply;

    fn feed(&mut self, byte: u8) -> Option<ModbusReply> {
        let Some(outstanding) = self.outstanding else {
            self.stats.skipped();
            return None;
        };
        let request = outstanding.request;

        if self.buffer.is_empty() {
            if byte != request.address.as_u8() {
                self.stats.skipped();
                return None;
            }
            self.target_len = outstanding.expected_len;
        } else if self.buffer.len() == 1 && request.is_exception_function(byte) {
            self.target_len = EXCEPTION_LEN;
        }

        if self.buffer.try_push(byte).is_err() {
            // target_len never exceeds the capacity, so this is a corrupted state
            self.buffer.clear();
            self.stats.discarded();
            return None;
        }
        if self.buffer.len() < self.target_len {
            return None;
        }

        let result = self.validate(&request);
        let window = core::mem::take(&mut self.buffer);
        match result {
            Ok(reply) => {
                self.outstanding = None;
                self.stats.decoded();
                Some(reply)
            }
            Err(e) => {
                log::trace!("modbus: discarding reply: {:?}", e);
                self.stats.discarded();
                self.resync(&window[1..])
            }
        }
    }

    fn reset(&mut self) {
        self.buffer.clear();
    }

    fn is_idle(&self) -> bool {
        self.buffer.is_empty()
    }

    fn stats(&self) -> DecoderStats {
        self.stats
    }
}
