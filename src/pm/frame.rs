// src/pm/frame.rs

/// First header byte of every particulate frame ('B').
pub const FRAME_START_0: u8 = 0x42;
/// Second header byte of every particulate frame ('M').
pub const FRAME_START_1: u8 = 0x4D;

/// Largest payload (long layout) the decoder has to hold.
pub const MAX_PAYLOAD_LEN: usize = 26;

/// Telemetry layouts, told apart by the frame's length field.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum TelemetryLayout {
    /// Length field 20: 9 data words, concentrations only.
    Short,
    /// Length field 28: 13 data words with particle counts and the
    /// formaldehyde word.
    Long,
}

impl TelemetryLayout {
    /// Maps a received length field to a layout. Any other length belongs to
    /// a sensor this crate doesn't understand, or to line noise.
    pub const fn from_length_field(len: u16) -> Option<Self> {
        match len {
            20 => Some(TelemetryLayout::Short),
            28 => Some(TelemetryLayout::Long),
            _ => None,
        }
    }

    pub const fn length_field(self) -> u16 {
        match self {
            TelemetryLayout::Short => 20,
            TelemetryLayout::Long => 28,
        }
    }

    /// Data bytes between the length field and the checksum.
    pub const fn payload_len(self) -> usize {
        self.length_field() as usize - 2
    }
}

/// PM1.0 / PM2.5 / PM10 mass concentrations in ug/m^3.
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct PmConcentrations {
    pub pm1_0: u16,
    pub pm2_5: u16,
    pub pm10_0: u16,
}

/// Particles per 0.1 L of air with a diameter above the given size (um).
#[derive(Debug, Default, Copy, Clone, Eq, PartialEq)]
pub struct ParticleCounts {
    pub over_0_3: u16,
    pub over_0_5: u16,
    pub over_1_0: u16,
    pub over_2_5: u16,
    pub over_5_0: u16,
    pub over_10_0: u16,
}

/// One checksum-verified telemetry frame.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct ParticulateFrame {
    pub layout: TelemetryLayout,
    /// Concentrations under standard particle conditions (CF=1).
    pub standard: PmConcentrations,
    /// Concentrations under atmospheric conditions.
    pub atmospheric: PmConcentrations,
    /// Only present in the long layout.
    pub particle_counts: Option<ParticleCounts>,
    /// Raw formaldehyde word, only present in the long layout.
    pub formaldehyde_raw: Option<u16>,
}

#[inline]
fn word(payload: &[u8], index: usize) -> u16 {
    u16::from_be_bytes([payload[2 * index], payload[2 * index + 1]])
}

impl ParticulateFrame {
    /// Interprets the payload of a frame whose checksum already matched.
    /// `payload` must hold at least `layout.payload_len()` bytes.
    pub(crate) fn from_payload(layout: TelemetryLayout, payload: &[u8]) -> Self {
        let standard = PmConcentrations {
            pm1_0: word(payload, 0),
            pm2_5: word(payload, 1),
            pm10_0: word(payload, 2),
        };
        let atmospheric = PmConcentrations {
            pm1_0: word(payload, 3),
            pm2_5: word(payload, 4),
            pm10_0: word(payload, 5),
        };
        let (particle_counts, formaldehyde_raw) = match layout {
            TelemetryLayout::Short => (None, None),
            TelemetryLayout::Long => (
                Some(ParticleCounts {
                    over_0_3: word(payload, 6),
                    over_0_5: word(payload, 7),
                    over_1_0: word(payload, 8),
                    over_2_5: word(payload, 9),
                    over_5_0: word(payload, 10),
                    over_10_0: word(payload, 11),
                }),
                Some(word(payload, 12)),
            ),
        };
        ParticulateFrame { layout, standard, atmospheric, particle_counts, formaldehyde_raw }
    }

    /// Temperature in degrees Celsius, for T-variant sensors which report it
    /// in place of the >5.0 um bin.
    pub fn temperature_celsius(&self) -> Option<f32> {
        self.particle_counts.map(|c| f32::from(c.over_5_0 as i16) / 10.0)
    }

    /// Relative humidity in percent, for T-variant sensors which report it in
    /// place of the >10 um bin.
    pub fn relative_humidity(&self) -> Option<f32> {
        self.particle_counts.map(|c| f32::from(c.over_10_0) / 10.0)
    }

    /// Formaldehyde in mg/m^3 (S-variant sensors).
    pub fn formaldehyde_mg_m3(&self) -> Option<f32> {
        self.formaldehyde_raw.map(|raw| f32::from(raw) / 1000.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn long_payload() -> [u8; 26] {
        let words: [u16; 13] = [5, 12, 15, 6, 13, 17, 900, 300, 80, 9, 0xFFEC, 455, 25];
        let mut payload = [0u8; 26];
        for (i, w) in words.iter().enumerate() {
            payload[2 * i..2 * i + 2].copy_from_slice(&w.to_be_bytes());
        }
        payload
    }

    #[test]
    fn test_layout_lengths() {
        assert_eq!(TelemetryLayout::from_length_field(20), Some(TelemetryLayout::Short));
        assert_eq!(TelemetryLayout::from_length_field(28), Some(TelemetryLayout::Long));
        assert_eq!(TelemetryLayout::from_length_field(0), None);
        assert_eq!(TelemetryLayout::from_length_field(21), None);
        assert_eq!(TelemetryLayout::Short.payload_len(), 18);
        assert_eq!(TelemetryLayout::Long.payload_len(), MAX_PAYLOAD_LEN);
    }

    #[test]
    fn test_long_payload_fields() {
        let frame = ParticulateFrame::from_payload(TelemetryLayout::Long, &long_payload());
        assert_eq!(frame.standard, PmConcentrations { pm1_0: 5, pm2_5: 12, pm10_0: 15 });
        assert_eq!(frame.atmospheric, PmConcentrations { pm1_0: 6, pm2_5: 13, pm10_0: 17 });
        let counts = frame.particle_counts.unwrap();
        assert_eq!(counts.over_0_3, 900);
        assert_eq!(counts.over_2_5, 9);
        assert_eq!(frame.formaldehyde_raw, Some(25));
    }

    #[test]
    fn test_t_variant_accessors() {
        let frame = ParticulateFrame::from_payload(TelemetryLayout::Long, &long_payload());
        // 0xFFEC = -20 tenths
        assert_eq!(frame.temperature_celsius(), Some(-2.0));
        assert_eq!(frame.relative_humidity(), Some(45.5));
        assert_eq!(frame.formaldehyde_mg_m3(), Some(0.025));
    }

    #[test]
    fn test_short_payload_has_no_extras() {
        let payload = long_payload();
        let frame = ParticulateFrame::from_payload(TelemetryLayout::Short, &payload[..18]);
        assert_eq!(frame.atmospheric.pm2_5, 13);
        assert!(frame.particle_counts.is_none());
        assert!(frame.temperature_celsius().is_none());
        assert!(frame.formaldehyde_mg_m3().is_none());
    }
}
