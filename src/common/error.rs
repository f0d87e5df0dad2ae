// src/common/error.rs

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SensorError<E = ()>
where
    E: core::fmt::Debug, // Still need Debug for the generic Io error
{
    /// Underlying I/O error from the transport implementation.
    #[error("I/O error: {0:?}")]
    Io(E),

    /// No valid frame or reply arrived within the time budget.
    #[error("Operation timed out")]
    Timeout,

    /// Fewer bytes were accepted by the transport than the command needs.
    #[error("Short write: wrote {written} of {expected} bytes")]
    ShortWrite { written: usize, expected: usize },

    /// Operation requires `begin()` to have succeeded first.
    #[error("Sensor not initialized")]
    NotInitialized,

    /// The session was ended or failed to initialize; it cannot be reused.
    #[error("Session closed")]
    Closed,

    /// Board identifier has no entry in the board table.
    #[error("Unsupported board type: {0}")]
    UnsupportedBoard(u8),

    /// The board has no connection for the requested sensor.
    #[error("Board does not support this sensor")]
    SensorNotSupported,

    /// No valid frame was observed while probing the sensor during `begin()`.
    #[error("Sensor probe failed")]
    ProbeFailed,

    /// Provided byte is not a usable Modbus device address.
    #[error("Invalid Modbus device address: {0:#04x}")]
    InvalidAddress(u8),

    /// The request cannot be encoded (unknown function code or register count out of range).
    #[error("Invalid request")]
    InvalidRequest,

    /// Received buffer length differs from the length the request implies.
    #[error("Invalid frame length: expected {expected}, got {got}")]
    InvalidLength { expected: usize, got: usize },

    /// Received CRC does not match calculated CRC.
    #[error("CRC mismatch: expected {expected:#06x}, calculated {calculated:#06x}")]
    CrcMismatch { expected: u16, calculated: u16 },

    /// Reply came from a different device address.
    #[error("Unexpected address: expected {expected:#04x}, got {got:#04x}")]
    UnexpectedAddress { expected: u8, got: u8 },

    /// Reply carries a function code other than the one requested.
    #[error("Unexpected function code: expected {expected:#04x}, got {got:#04x}")]
    UnexpectedFunction { expected: u8, got: u8 },

    /// Declared byte count disagrees with the received payload length.
    #[error("Byte count mismatch: declared {declared}, actual {actual}")]
    ByteCountMismatch { declared: usize, actual: usize },

    /// Write acknowledgement is not an exact echo of the request.
    #[error("Write acknowledgement does not echo the request")]
    EchoMismatch,

    /// Device answered with a Modbus exception response.
    #[error("Modbus exception code {0:#04x}")]
    ModbusException(u8),

    /// Averaging was asked for zero samples.
    #[error("Sample count must be at least 1")]
    InvalidSampleCount,

    /// Every sample of an averaging run was rejected.
    #[error("No valid samples out of {taken}")]
    NoValidSamples { taken: u16 },
}

// Allow mapping from underlying transport error
impl<E: core::fmt::Debug> From<E> for SensorError<E> {
    fn from(e: E) -> Self {
        SensorError::Io(e)
    }
}
