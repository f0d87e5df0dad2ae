// src/session/co2.rs

use super::{Session, SessionConfig, SessionState};
use crate::common::{
    board::{BoardType, SensorKind},
    error::SensorError,
    frame::DecoderStats,
    hal_traits::{SensorSerial, SensorTimer},
    types::SampleAccumulator,
};
use crate::modbus::{ModbusReply, ModbusRequest, ModbusResponse, ModbusResponseDecoder};

/// Input register holding the filtered CO2 reading in ppm.
pub const CO2_REGISTER: u16 = 0x0003;

/// Driver for a SenseAir S8 style NDIR CO2 sensor speaking Modbus RTU.
#[derive(Debug)]
pub struct Co2Sensor<IF>
where
    IF: SensorSerial + SensorTimer,
{
    session: Session<IF, ModbusResponseDecoder>,
}

impl<IF> Co2Sensor<IF>
where
    IF: SensorSerial + SensorTimer,
{
    pub fn new(interface: IF, config: SessionConfig) -> Self {
        Co2Sensor { session: Session::new(interface, ModbusResponseDecoder::new(), config) }
    }

    /// Checks that `board` wires the sensor for this MCU and probes it with
    /// one CO2 read. Any well-formed reply counts, whatever its value.
    pub fn begin(&mut self, board: BoardType) -> Result<(), SensorError<IF::Error>> {
        self.session.begin_with(board, SensorKind::Co2, |session| {
            let request = ModbusRequest::read_input_registers(session.config.device_address, CO2_REGISTER, 1);
            let timeout = session.config.init_timeout;
            Self::round_trip(session, request, timeout).map(|_| ())
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

    pub fn decoder_stats(&self) -> DecoderStats {
        self.session.decoder_stats()
    }

    pub fn release(self) -> IF {
        self.session.release()
    }

    /// Flush, send, wait for the matching reply. No retry.
    fn round_trip(
        session: &mut Session<IF, ModbusResponseDecoder>,
        request: ModbusRequest,
        timeout: core::time::Duration,
    ) -> Result<ModbusReply, SensorError<IF::Error>> {
        let frame = request.encode::<IF::Error>()?;
        session.interface.flush_input().map_err(SensorError::Io)?;
        session.decoder.arm(request);
        if let Err(e) = session.send_bytes(&frame) {
            session.decoder.disarm();
            return Err(e);
        }
        match session.read_frame_blocking(timeout) {
            Ok(ModbusReply::Exception(code)) => {
                log::warn!("s8: exception {:#04x} for function {:#04x}", code, request.function.code());
                Err(SensorError::ModbusException(code))
            }
            Ok(reply) => {
                log::debug!("s8: reply to function {:#04x} register {:#06x}", request.function.code(), request.register);
                Ok(reply)
            }
            Err(e) => {
                session.decoder.disarm();
                Err(e)
            }
        }
    }

    fn read_registers(&mut self, request: ModbusRequest) -> Result<ModbusResponse, SensorError<IF::Error>> {
        let timeout = self.session.config.response_timeout;
        match Self::round_trip(&mut self.session, request, timeout)? {
            ModbusReply::Registers(response) => Ok(response),
            // The decoder only yields register data for read requests
            ModbusReply::WriteAck | ModbusReply::Exception(_) => Err(SensorError::InvalidRequest),
        }
    }

    pub fn read_input_registers(&mut self, register: u16, count: u16) -> Result<ModbusResponse, SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        let request = ModbusRequest::read_input_registers(self.session.config.device_address, register, count);
        self.read_registers(request)
    }

    pub fn read_holding_registers(&mut self, register: u16, count: u16) -> Result<ModbusResponse, SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        let request = ModbusRequest::read_holding_registers(self.session.config.device_address, register, count);
        self.read_registers(request)
    }

    /// Writes one holding register. Succeeds once the device echoed the request.
    pub fn write_register(&mut self, register: u16, value: u16) -> Result<(), SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        let request = ModbusRequest::write_single_register(self.session.config.device_address, register, value);
        let timeout = self.session.config.response_timeout;
        match Self::round_trip(&mut self.session, request, timeout)? {
            ModbusReply::WriteAck => {
                log::info!("s8: register {:#06x} set to {}", register, value);
                Ok(())
            }
            ModbusReply::Registers(_) | ModbusReply::Exception(_) => Err(SensorError::InvalidRequest),
        }
    }

    /// One unfiltered CO2 reading in ppm. Out-of-range values are returned
    /// as they are.
    pub fn read_co2_raw(&mut self) -> Result<u16, SensorError<IF::Error>> {
        self.session.ensure_operational()?;
        self.read_co2_once()
    }

    fn read_co2_once(&mut self) -> Result<u16, SensorError<IF::Error>> {
        let request = ModbusRequest::read_input_registers(self.session.config.device_address, CO2_REGISTER, 1);
        let response = self.read_registers(request)?;
        response
            .register(0)
            .ok_or(SensorError::ByteCountMismatch { declared: 2, actual: response.data().len() })
    }

    /// Mean of `samples` readings taken `inter_sample_delay` apart.
    ///
    /// Readings outside the plausible range and failed reads are left out.
    /// Fails with `NoValidSamples` when nothing was left.
    pub fn read_co2_averaged(&mut self, samples: u16) -> Result<u16, SensorError<IF::Error>> {
        if samples == 0 {
            return Err(SensorError::InvalidSampleCount);
        }
        self.session.ensure_operational()?;

        let delay = self.session.config.inter_sample_delay;
        let mut acc = SampleAccumulator::new(self.session.config.co2_range);
        for i in 0..samples {
            if i > 0 {
                self.session.pause(delay);
            }
            match self.read_co2_once() {
                Ok(ppm) => {
                    if acc.push(ppm) {
                        log::debug!("s8: sample {} = {} ppm", i, ppm);
                    } else {
                        log::warn!("s8: sample {} = {} ppm outside {}, dropped", i, ppm, self.session.config.co2_range);
                    }
                }
                Err(e) => {
                    log::warn!("s8: sample {} failed: {:?}", i, e);
                    acc.reject();
                }
            }
        }

        acc.mean().ok_or(SensorError::NoValidSamples { taken: acc.taken() })
    }
}
