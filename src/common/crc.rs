// src/common/crc.rs

use super::error::SensorError;
use crc::{Algorithm, Crc};

/// CRC algorithm used by Modbus RTU (CRC-16/MODBUS).
/// Polynomial: 0x8005 (normal representation of 0xA001 reversed)
/// Initial Value: 0xFFFF
/// Input Reflected: true
/// Output Reflected: true
/// Final XOR: 0x0000
/// Check Value: 0x4B37 (for "123456789")
/// Residue: 0x0000
pub const MODBUS_CRC: Algorithm<u16> = Algorithm {
    width: 16,
    poly: 0x8005,
    init: 0xFFFF,
    refin: true,
    refout: true,
    xorout: 0x0000,
    check: 0x4B37,
    residue: 0x0000,
};

// Create a Crc instance for the Modbus algorithm for reuse.
const CRC_COMPUTER: Crc<u16> = Crc::<u16>::new(&MODBUS_CRC);

/// Calculates the Modbus CRC-16 over `data`.
///
/// The calculation covers every byte from the device address up to the byte
/// *before* the CRC itself.
#[inline]
pub fn calculate_crc16(data: &[u8]) -> u16 {
    CRC_COMPUTER.checksum(data)
}

/// Encodes a 16-bit CRC value into two bytes (LSB first), as Modbus sends it.
pub fn encode_crc16(crc_value: u16) -> [u8; 2] {
    crc_value.to_le_bytes()
}

/// Decodes the two trailing CRC bytes (LSB first) of a Modbus frame.
pub fn decode_crc16(crc_bytes: [u8; 2]) -> u16 {
    u16::from_le_bytes(crc_bytes)
}

/// Verifies a complete Modbus frame whose last two bytes are its CRC.
///
/// * `Err(SensorError::InvalidLength)` if the buffer cannot hold a CRC.
/// * `Err(SensorError::CrcMismatch)` if the CRCs don't match.
pub fn verify_frame_crc16<E>(frame_with_crc: &[u8]) -> Result<(), SensorError<E>>
where
    E: core::fmt::Debug,
{
    if frame_with_crc.len() < 3 {
        return Err(SensorError::InvalidLength { expected: 3, got: frame_with_crc.len() });
    }
    let data_len = frame_with_crc.len() - 2;
    let calculated_crc = calculate_crc16(&frame_with_crc[..data_len]);
    let received_crc = decode_crc16([frame_with_crc[data_len], frame_with_crc[data_len + 1]]);

    if calculated_crc == received_crc {
        Ok(())
    } else {
        Err(SensorError::CrcMismatch { expected: received_crc, calculated: calculated_crc })
    }
}

/// Additive checksum of the particulate telemetry and command frames:
/// the sum of all bytes, modulo 2^16.
#[inline]
pub fn checksum16(data: &[u8]) -> u16 {
    data.iter().fold(0u16, |sum, b| sum.wrapping_add(u16::from(*b)))
}

// --- Unit Tests ---
#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Debug, Clone, PartialEq, Eq)]
    struct MockIoError;

    #[test]
    fn test_algorithm_check_value() {
        assert_eq!(calculate_crc16(b"123456789"), 0x4B37);
    }

    #[test]
    fn test_co2_read_command_vector() {
        // Read input register 0x0003 (CO2) from the "any sensor" address
        let data = [0xFE, 0x04, 0x00, 0x03, 0x00, 0x01];
        let crc = calculate_crc16(&data);
        assert_eq!(encode_crc16(crc), [0xD5, 0xC5]);

        let frame = [0xFE, 0x04, 0x00, 0x03, 0x00, 0x01, 0xD5, 0xC5];
        assert!(verify_frame_crc16::<MockIoError>(&frame).is_ok());
    }

    #[test]
    fn test_co2_reply_vector() {
        // 0x01F4 = 500 ppm
        let mut frame = [0xFE, 0x04, 0x02, 0x01, 0xF4, 0x00, 0x00];
        let crc = encode_crc16(calculate_crc16(&frame[..5]));
        frame[5..].copy_from_slice(&crc);
        assert!(verify_frame_crc16::<MockIoError>(&frame).is_ok());
    }

    #[test]
    fn test_verify_crc_invalid_cases() {
        // Correct data, wrong CRC bytes
        let bad_crc = [0xFE, 0x04, 0x00, 0x03, 0x00, 0x01, 0xD5, 0xC4];
        assert!(matches!(
            verify_frame_crc16::<MockIoError>(&bad_crc),
            Err(SensorError::CrcMismatch { expected: 0xC4D5, calculated: 0xC5D5 })
        ));

        // Corrupted data, original CRC bytes
        let bad_data = [0xFE, 0x04, 0x00, 0x04, 0x00, 0x01, 0xD5, 0xC5];
        assert!(matches!(verify_frame_crc16::<MockIoError>(&bad_data), Err(SensorError::CrcMismatch { .. })));

        // Buffer genuinely too short
        assert!(matches!(
            verify_frame_crc16::<MockIoError>(&[0xD5, 0xC5]),
            Err(SensorError::InvalidLength { expected: 3, got: 2 })
        ));
        assert!(matches!(verify_frame_crc16::<MockIoError>(b""), Err(SensorError::InvalidLength { .. })));
    }

    #[test]
    fn test_crc_byte_order() {
        assert_eq!(encode_crc16(0xC5D5), [0xD5, 0xC5]);
        assert_eq!(decode_crc16([0xD5, 0xC5]), 0xC5D5);
        assert_eq!(decode_crc16(encode_crc16(0x1234)), 0x1234);
    }

    #[test]
    fn test_checksum16() {
        // Sleep command header: 42 4D E4 00 00 -> 0x0173
        assert_eq!(checksum16(&[0x42, 0x4D, 0xE4, 0x00, 0x00]), 0x0173);
        assert_eq!(checksum16(&[]), 0);
        // Wraps at 2^16
        let big = [0xFFu8; 300];
        assert_eq!(checksum16(&big), ((0xFFu32 * 300) % 0x1_0000) as u16);
    }
}
