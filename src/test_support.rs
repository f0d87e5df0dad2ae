// src/test_support.rs

//! Scripted transport shared by the unit tests.

use crate::common::crc::{calculate_crc16, checksum16, encode_crc16};
use crate::common::hal_traits::{SensorSerial, SensorTimer};
use crate::pm::frame::{TelemetryLayout, FRAME_START_0, FRAME_START_1, MAX_PAYLOAD_LEN};
use core::ops::{Add, Sub};
use core::time::Duration;
use heapless::Deque;
use std::collections::VecDeque;
use std::vec::Vec;

// Mock Instant type (microseconds)
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct MockInstant(pub u64);

impl Add<Duration> for MockInstant {
    type Output = Self;
    fn add(self, rhs: Duration) -> Self {
        MockInstant(self.0.saturating_add(rhs.as_micros() as u64))
    }
}

impl Sub<MockInstant> for MockInstant {
    type Output = Duration;
    fn sub(self, rhs: MockInstant) -> Duration {
        Duration::from_micros(self.0.saturating_sub(rhs.0))
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MockCommError;

const READ_QUEUE_CAPACITY: usize = 256;

/// Mock serial transport.
///
/// * `read_queue` holds bytes the sensor has already sent.
/// * Each write pops one entry of `replies` into the read queue, so a reply
///   survives the input flush that precedes a request.
/// * `scheduled` bytes become readable once the clock reaches their time.
/// * The clock only moves through `delay_ms` (or by hand).
#[derive(Debug)]
pub struct MockInterface {
    pub read_queue: Deque<u8, READ_QUEUE_CAPACITY>,
    pub replies: VecDeque<Vec<u8>>,
    pub scheduled: Vec<(u64, Vec<u8>)>,
    pub write_log: Vec<Vec<u8>>,
    pub current_time_us: u64,
    /// Accept only this many bytes per write.
    pub short_write: Option<usize>,
    pub fail_reads: bool,
    pub write_calls: usize,
    pub flush_calls: usize,
    pub delay_calls: usize,
}

impl MockInterface {
    pub fn new() -> Self {
        MockInterface {
            read_queue: Deque::new(),
            replies: VecDeque::new(),
            scheduled: Vec::new(),
            write_log: Vec::new(),
            current_time_us: 0,
            short_write: None,
            fail_reads: false,
            write_calls: 0,
            flush_calls: 0,
            delay_calls: 0,
        }
    }

    /// Bytes readable right away.
    pub fn stage_read_data(&mut self, data: &[u8]) {
        for byte in data {
            self.read_queue.push_back(*byte).expect("mock read queue full");
        }
    }

    /// Reply delivered on the next write.
    pub fn stage_reply(&mut self, data: Vec<u8>) {
        self.replies.push_back(data);
    }

    /// Bytes that arrive once the clock reaches `at_ms`.
    pub fn schedule(&mut self, at_ms: u64, data: Vec<u8>) {
        self.scheduled.push((at_ms * 1000, data));
    }

    pub fn advance_ms(&mut self, ms: u64) {
        self.current_time_us += ms * 1000;
    }

    pub fn elapsed_ms(&self) -> u64 {
        self.current_time_us / 1000
    }

    fn deliver_scheduled(&mut self) {
        let now = self.current_time_us;
        let (due, pending): (Vec<_>, Vec<_>) = self.scheduled.drain(..).partition(|(at, _)| *at <= now);
        self.scheduled = pending;
        for (_, data) in due {
            self.stage_read_data(&data);
        }
    }
}

impl SensorTimer for MockInterface {
    type Instant = MockInstant;

    fn delay_ms(&mut self, ms: u32) {
        self.delay_calls += 1;
        self.current_time_us += u64::from(ms) * 1000;
    }

    fn now(&self) -> Self::Instant {
        MockInstant(self.current_time_us)
    }
}

impl SensorSerial for MockInterface {
    type Error = MockCommError;

    fn bytes_available(&mut self) -> usize {
        self.deliver_scheduled();
        self.read_queue.len()
    }

    fn read_byte(&mut self) -> nb::Result<u8, Self::Error> {
        if self.fail_reads {
            return Err(nb::Error::Other(MockCommError));
        }
        self.deliver_scheduled();
        self.read_queue.pop_front().ok_or(nb::Error::WouldBlock)
    }

    fn write_bytes(&mut self, bytes: &[u8]) -> Result<usize, Self::Error> {
        self.write_calls += 1;
        let accepted = self.short_write.map_or(bytes.len(), |n| n.min(bytes.len()));
        self.write_log.push(bytes[..accepted].to_vec());
        if let Some(reply) = self.replies.pop_front() {
            self.stage_read_data(&reply);
        }
        Ok(accepted)
    }

    fn flush_input(&mut self) -> Result<(), Self::Error> {
        self.flush_calls += 1;
        self.read_queue.clear();
        Ok(())
    }
}

/// A complete telemetry frame with a correct checksum. Missing words are zero.
pub fn pms_frame(layout: TelemetryLayout, words: &[u16]) -> Vec<u8> {
    let mut frame = Vec::new();
    frame.extend_from_slice(&[FRAME_START_0, FRAME_START_1]);
    frame.extend_from_slice(&layout.length_field().to_be_bytes());
    let mut payload = [0u8; MAX_PAYLOAD_LEN];
    for (i, w) in words.iter().enumerate() {
        payload[2 * i..2 * i + 2].copy_from_slice(&w.to_be_bytes());
    }
    frame.extend_from_slice(&payload[..layout.payload_len()]);
    let sum = checksum16(&frame);
    frame.extend_from_slice(&sum.to_be_bytes());
    frame
}

/// A long-layout frame whose atmospheric PM2.5 is `pm2_5`.
pub fn pms_frame_with_pm25(pm2_5: u16) -> Vec<u8> {
    pms_frame(TelemetryLayout::Long, &[1, pm2_5, 3, 1, pm2_5, 3, 100, 50, 10, 2, 1, 0, 0])
}

/// `[addr][func][bytecount][data][crc]` with a correct CRC.
pub fn modbus_reply(address: u8, function: u8, data: &[u8]) -> Vec<u8> {
    let mut frame = std::vec![address, function, data.len() as u8];
    frame.extend_from_slice(data);
    let crc = encode_crc16(calculate_crc16(&frame));
    frame.extend_from_slice(&crc);
    frame
}

/// Reply to the CO2 read, carrying `ppm`.
pub fn co2_reply(ppm: u16) -> Vec<u8> {
    modbus_reply(0xFE, 0x04, &ppm.to_be_bytes())
}
