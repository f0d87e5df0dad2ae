// src/pm/command.rs

use super::frame::{FRAME_START_0, FRAME_START_1};
use crate::common::crc::checksum16;

/// Length of every host-to-sensor command frame.
pub const COMMAND_LEN: usize = 7;

/// Reporting mode of the particulate sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Default)]
pub enum PmMode {
    /// The sensor streams a frame roughly every second (power-on default).
    #[default]
    Active,
    /// The sensor only answers an explicit read request.
    Passive,
}

/// Commands understood by the particulate sensor.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PmsCommand {
    Sleep,
    WakeUp,
    ActiveMode,
    PassiveMode,
    /// Asks for one frame; only meaningful in passive mode.
    RequestRead,
}

impl PmsCommand {
    const fn command_and_data(self) -> (u8, u16) {
        match self {
            PmsCommand::Sleep => (0xE4, 0x0000),
            PmsCommand::WakeUp => (0xE4, 0x0001),
            PmsCommand::ActiveMode => (0xE1, 0x0001),
            PmsCommand::PassiveMode => (0xE1, 0x0000),
            PmsCommand::RequestRead => (0xE2, 0x0000),
        }
    }

    /// `42 4D <cmd> <data BE> <checksum BE>`, the checksum being the sum of
    /// the five preceding bytes.
    pub fn encode(self) -> [u8; COMMAND_LEN] {
        let (cmd, data) = self.command_and_data();
        let [data_hi, data_lo] = data.to_be_bytes();
        let mut frame = [FRAME_START_0, FRAME_START_1, cmd, data_hi, data_lo, 0, 0];
        let [sum_hi, sum_lo] = checksum16(&frame[..5]).to_be_bytes();
        frame[5] = sum_hi;
        frame[6] = sum_lo;
        frame
    }
}

impl From<PmMode> for PmsCommand {
    fn from(mode: PmMode) -> Self {
        match mode {
            PmMode::Active => PmsCommand::ActiveMode,
            PmMode::Passive => PmsCommand::PassiveMode,
        }
    }
}
