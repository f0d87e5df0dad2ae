// src/session/particulate.rs

use super::{Session, SessionConfig, SessionState};
use crate::common::{
    board::{BoardType, SensorKind},
    error::SensorError,
    frame::{DecoderStats, FrameDecoder},
    hal_traits::{SensorSerial, SensorTimer},
};
use crate::pm::{ChecksumFrameDecoder, ParticulateFrame, PmMode, PmsCommand};

/// Driver for a Plantower-style particulate sensor.
#[derive(Debug)]
pub struct ParticulateSensor<IF>
where
    IF: SensorSerial + SensorTimer,
{
    session: Session<IF, ChecksumFrameDecoder>,
    mode: PmMode,
    asleep: bool,
}

impl<IF> ParticulateSensor<IF>
where
    IF: SensorSerial + SensorTimer,
{
    pub fn new(interface: IF, config: SessionConfig) -> Self {
        ParticulateSensor {
            session: Session::new(interface, ChecksumFrameDecoder::new(), config),
            mode: PmMode::Active,
            asleep: false,
        }
    }

    /// Checks that `board` wires the sensor for this MCU and waits for one
    /// valid frame. The warm-up interval starts once that frame arrived.
    pub fn begin(&mut self, board: BoardType) -> Result<(), SensorError<IF::Error>> {
        // A fresh sensor streams in active mode, so no read request is needed
        let timeout = self.session.config.init_timeout;
        self.session.begin_with(board, SensorKind::Particulate, |session| {
            session.read_frame_blocking(timeout).map(|_| ())
        })
    }

    pub fn end(&mut self) {
        self.session.end();
    }

    pub fn is_ready(&mut self) -> bool {
        self.session.is_ready()
    }

    pub fn state(&self) -> SessionState {
        self.session.state()
    }

    pub fn mode(&self) -> PmMode {
        self.mode
    }

    pub fn is_asleep(&self) -> bool {
        self.asleep
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.session.decoder_stats()
    }

    pub fn release(self) -> IF {
        self.session.release()
    }

    fn send_command(&mut self, command: PmsCommand) -> Result<(), SensorError<IF::Error>> {
        self.session.send_bytes(&command.encode())
    }

    /// Puts the sensor to sleep (fan off).
    pub fn sleep(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        if self.asleep {
            log::info!("pms: already asleep");
            return Ok(());
        }
        self.send_command(PmsCommand::Sleep)?;
        self.asleep = true;
        self.session.decoder.reset();
        log::info!("pms: sleeping");
        Ok(())
    }

    pub fn wake_up(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        if !self.asleep {
            log::info!("pms: already awake");
            return Ok(());
        }
        self.send_command(PmsCommand::WakeUp)?;
        self.asleep = false;
        log::info!("pms: woken up");
        Ok(())
    }

    /// The sensor streams frames on its own.
    pub fn set_active_mode(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.set_mode(PmMode::Active)
    }

    /// The sensor only answers read requests.
    pub fn set_passive_mode(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.set_mode(PmMode::Passive)
    }

    fn set_mode(&mut self, mode: PmMode) -> Result<(), SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        self.send_command(mode.into())?;
        self.mode = mode;
        log::info!("pms: {:?} mode", mode);
        Ok(())
    }

    /// Asks for one frame. Only sent in passive mode; in active mode the
    /// sensor streams anyway and this does nothing.
    pub fn request_read(&mut self) -> Result<(), SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        if self.mode != PmMode::Passive {
            return Ok(());
        }
        self.send_command(PmsCommand::RequestRead)
    }

    /// Waits up to the configured read timeout for the next valid frame,
    /// sending a read request first in passive mode.
    pub fn read_blocking(&mut self) -> Result<ParticulateFrame, SensorError<IF::Error>> {
        self.request_read()?;
        let timeout = self.session.config.read_timeout;
        let frame = self.session.read_frame_blocking(timeout)?;
        log::debug!(
            "pms: PM1.0 {} PM2.5 {} PM10 {} ug/m3",
            frame.atmospheric.pm1_0,
            frame.atmospheric.pm2_5,
            frame.atmospheric.pm10_0
        );
        Ok(frame)
    }

    /// Decodes whatever has arrived so far without waiting.
    pub fn read(&mut self) -> Result<Option<ParticulateFrame>, SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        self.session.poll()
    }
}
