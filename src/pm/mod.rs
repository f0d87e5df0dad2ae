// src/pm/mod.rs

//! Plantower-style particulate sensor protocol: the checksum-trailer
//! telemetry frame, its incremental decoder and the host command frames.

pub mod aqi;
pub mod command;
pub mod decoder;
pub mod frame;

pub use aqi::pm25_to_us_aqi;
pub use command::{PmMode, PmsCommand};
pub use decoder::ChecksumFrameDecoder;
pub use frame::{ParticleCounts, ParticulateFrame, PmConcentrations, TelemetryLayout};
