// src/common/timing.rs

use core::time::Duration;

// Nominal values from the sensor datasheets. Sessions read them through
// `SessionConfig`.

// === Link ===

/// Both sensors talk 9600 baud, 8N1. Open the UART with this before
/// handing it to a session.
pub const BAUD_RATE: u32 = 9600;

// === Particulate sensor ===

/// Longest gap between two telemetry frames in active mode.
pub const PM_SINGLE_RESPONSE_TIME: Duration = Duration::from_millis(1000);

// === CO2 sensor ===

/// Budget for a Modbus reply after the request has been written.
pub const CO2_RESPONSE_TIMEOUT: Duration = Duration::from_millis(500);
/// Pause between two samples of an averaging run.
pub const CO2_INTER_SAMPLE_DELAY: Duration = Duration::from_millis(250);

// === Session ===

/// Readings are unreliable until this long after initialization.
pub const WARM_UP_INTERVAL: Duration = Duration::from_secs(10);
/// Budget for the probe frame during `begin()`.
pub const INIT_PROBE_TIMEOUT: Duration = Duration::from_millis(1000);
/// Sleep between two polls of the transport inside a blocking read.
pub const POLL_INTERVAL: Duration = Duration::from_millis(10);
