// src/pm/decoder.rs

use super::frame::{ParticulateFrame, TelemetryLayout, FRAME_START_0, FRAME_START_1, MAX_PAYLOAD_LEN};
use crate::common::frame::{DecoderStats, FrameDecoder};

#[derive(Debug, Copy, Clone, Eq, PartialEq)]
enum DecodeState {
    SeekHeader0,
    SeekHeader1,
    LenHi,
    LenLo { hi: u8 },
    Payload { layout: TelemetryLayout, index: usize },
    ChecksumHi { layout: TelemetryLayout },
    ChecksumLo { layout: TelemetryLayout, hi: u8 },
}

/// Incremental decoder for the `42 4D <len> <payload> <checksum>` telemetry
/// frame.
///
/// Garbage before a header, unknown lengths and checksum mismatches are
/// dropped silently; the decoder then hunts for the next `0x42`.
#[derive(Debug, Clone)]
pub struct ChecksumFrameDecoder {
    state: DecodeState,
    checksum: u16,
    payload: [u8; MAX_PAYLOAD_LEN],
    stats: DecoderStats,
}

impl Default for ChecksumFrameDecoder {
    fn default() -> Self {
        Self::new()
    }
}

impl ChecksumFrameDecoder {
    pub const fn new() -> Self {
        ChecksumFrameDecoder {
            state: DecodeState::SeekHeader0,
            checksum: 0,
            payload: [0; MAX_PAYLOAD_LEN],
            stats: DecoderStats { frames_decoded: 0, frames_discarded: 0, bytes_skipped: 0 },
        }
    }

    fn discard(&mut self) {
        self.stats.discarded();
        self.state = DecodeState::SeekHeader0;
    }

    #[inline]
    fn accumulate(&mut self, byte: u8) {
        self.checksum = self.checksum.wrapping_add(u16::from(byte));
    }
}

impl FrameDecoder for ChecksumFrameDecoder {
    type Frame = ParticulateFrame;

    fn feed(&mut self, byte: u8) -> Option<ParticulateFrame> {
        match self.state {
            DecodeState::SeekHeader0 => {
                if byte == FRAME_START_0 {
                    self.checksum = u16::from(byte);
                    self.state = DecodeState::SeekHeader1;
                } else {
                    self.stats.skipped();
                }
            }
            DecodeState::SeekHeader1 => {
                if byte == FRAME_START_1 {
                    self.accumulate(byte);
                    self.state = DecodeState::LenHi;
                } else if byte == FRAME_START_0 {
                    // The earlier 0x42 was noise; this one may start a frame.
                    self.stats.skipped();
                    self.checksum = u16::from(byte);
                } else {
                    // The lone 0x42 and this byte were noise.
                    self.stats.skipped();
                    self.stats.skipped();
                    self.state = DecodeState::SeekHeader0;
                }
            }
            DecodeState::LenHi => {
                self.accumulate(byte);
                self.state = DecodeState::LenLo { hi: byte };
            }
            DecodeState::LenLo { hi } => {
                let len = u16::from_be_bytes([hi, byte]);
                match TelemetryLayout::from_length_field(len) {
                    Some(layout) => {
                        self.accumulate(byte);
                        self.state = DecodeState::Payload { layout, index: 0 };
                    }
                    None => {
                        log::trace!("pms: unsupported frame length {}", len);
                        self.discard();
                    }
                }
            }
            DecodeState::Payload { layout, index } => {
                self.accumulate(byte);
                self.payload[index] = byte;
                let next = index + 1;
                self.state = if next == layout.payload_len() {
                    DecodeState::ChecksumHi { layout }
                } else {
                    DecodeState::Payload { layout, index: next }
                };
            }
            DecodeState::ChecksumHi { layout } => {
                self.state = DecodeState::ChecksumLo { layout, hi: byte };
            }
            DecodeState::ChecksumLo { layout, hi } => {
                let received = u16::from_be_bytes([hi, byte]);
                if received == self.checksum {
                    self.state = DecodeState::SeekHeader0;
                    self.stats.decoded();
                    return Some(ParticulateFrame::from_payload(layout, &self.payload[..layout.payload_len()]));
                }
                log::trace!("pms: checksum mismatch, received {:#06x} calculated {:#06x}", received, self.checksum);
                self.discard();
            }
        }
        None
    }

    fn reset(&mut self) {
        self.state = DecodeState::SeekHeader0;
        self.checksum = 0;
    }

    fn is_idle(&self) -> bool {
        self.state == DecodeState::SeekHeader0
    }

    fn stats(&self) -> DecoderStats {
        self.stats
    }
}
