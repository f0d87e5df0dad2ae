// src/session/mod.rs

//! Request/response sessions over a UART transport.
//!
//! [`Session`] is the protocol-neutral engine: it owns the transport, one
//! frame decoder, the lifecycle state and the warm-up latch. The sensor
//! front-ends in [`particulate`] and [`co2`] put their commands on top.

use crate::common::{
    board::{BoardType, SensorKind},
    error::SensorError,
    frame::{DecoderStats, FrameDecoder},
    hal_traits::{SensorSerial, SensorTimer},
};

pub mod co2;
pub mod config;
mod io_helpers;
pub mod particulate;

pub use co2::Co2Sensor;
pub use config::SessionConfig;
pub use particulate::ParticulateSensor;

/// Lifecycle of a session.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum SessionState {
    /// Created, `begin()` not called yet.
    Uninitialized,
    /// Board check and probe in progress.
    Initializing,
    /// Probe succeeded, nothing served yet.
    Ready,
    /// At least one operation served.
    Operating,
    /// Ended, or initialization failed. Terminal.
    Closed,
}

/// Transport plus decoder plus lifecycle bookkeeping.
#[derive(Debug)]
pub struct Session<IF, D>
where
    IF: SensorSerial + SensorTimer,
    D: FrameDecoder,
{
    interface: IF,
    decoder: D,
    config: SessionConfig,
    state: SessionState,
    init_time: Option<IF::Instant>,
    ready: bool,
}

impl<IF, D> Session<IF, D>
where
    IF: SensorSerial + SensorTimer,
    D: FrameDecoder,
{
    pub fn new(interface: IF, decoder: D, config: SessionConfig) -> Self {
        Session {
            interface,
            decoder,
            config,
            state: SessionState::Uninitialized,
            init_time: None,
            ready: false,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn decoder_stats(&self) -> DecoderStats {
        self.decoder.stats()
    }

    /// Hands the transport back, dropping the session.
    pub fn release(self) -> IF {
        self.interface
    }

    /// Runs the board capability check and then `probe`.
    ///
    /// A second call on an initialized session succeeds without doing
    /// anything. Any failure closes the session for good.
    pub(crate) fn begin_with<F>(
        &mut self,
        board: BoardType,
        kind: SensorKind,
        probe: F,
    ) -> Result<(), SensorError<IF::Error>>
    where
        F: FnOnce(&mut Self) -> Result<(), SensorError<IF::Error>>,
    {
        match self.state {
            SessionState::Ready | SessionState::Operating => {
                log::info!("{:?} sensor already initialized", kind);
                return Ok(());
            }
            SessionState::Closed => return Err(SensorError::Closed),
            SessionState::Uninitialized | SessionState::Initializing => {}
        }
        self.state = SessionState::Initializing;

        let def = board.def();
        if !def.supports(kind, self.config.mcu) {
            log::warn!("board {} does not support the {:?} sensor on {:?}", def, kind, self.config.mcu);
            self.state = SessionState::Closed;
            return Err(SensorError::SensorNotSupported);
        }

        if let Err(e) = probe(self) {
            log::warn!("{:?} sensor probe failed: {:?}", kind, e);
            self.decoder.reset();
            self.state = SessionState::Closed;
            return Err(match e {
                SensorError::Io(io) => SensorError::Io(io),
                _ => SensorError::ProbeFailed,
            });
        }

        self.init_time = Some(self.interface.now());
        self.ready = false;
        self.state = SessionState::Ready;
        log::info!(
            "{:?} sensor initialized on {}, warming up for {} ms",
            kind,
            def,
            self.config.warm_up.as_millis()
        );
        Ok(())
    }

    /// Closes the session. Later operations fail with `Closed`.
    pub fn end(&mut self) {
        if self.state == SessionState::Closed {
            return;
        }
        self.decoder.reset();
        self.state = SessionState::Closed;
        log::info!("session closed");
    }

    /// Gate for every served operation: moves READY to OPERATING.
    pub(crate) fn ensure_operational(&mut self) -> Result<(), SensorError<IF::Error>> {
        match self.state {
            SessionState::Ready | SessionState::Operating => {
                self.state = SessionState::Operating;
                Ok(())
            }
            SessionState::Closed => Err(SensorError::Closed),
            SessionState::Uninitialized | SessionState::Initializing => Err(SensorError::NotInitialized),
        }
    }

    /// False until the warm-up interval has passed since `begin()`, then
    /// true for the rest of the session.
    pub fn is_ready(&mut self) -> bool {
        if !matches!(self.state, SessionState::Ready | SessionState::Operating) {
            return false;
        }
        if self.ready {
            return true;
        }
        if let Some(init_time) = self.init_time {
            if self.interface.now() - init_time >= self.config.warm_up {
                log::info!("sensor warm-up complete");
                self.ready = true;
            }
        }
        self.ready
    }
}
