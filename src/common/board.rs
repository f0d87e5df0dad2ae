// src/common/board.rs

use super::error::SensorError;
use core::convert::TryFrom;
use core::fmt;

/// Microcontroller family the firmware is built for.
///
/// Each board routes its sensor UARTs for exactly one family, so a board
/// definition is only usable when the running firmware targets that family.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum McuFamily {
    Esp8266,
    Esp32,
}

/// Which UART sensor a session drives.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
pub enum SensorKind {
    Particulate,
    Co2,
}

/// Known monitor boards. The discriminants are the board identifiers stored
/// in device configuration.
#[derive(Debug, Copy, Clone, Eq, PartialEq, Hash)]
#[repr(u8)]
pub enum BoardType {
    DiyBasicKit = 0x00,
    DiyProIndoorV4_2 = 0x01,
    OneIndoorMonitorV9_0 = 0x02,
    OutdoorMonitorV1_3 = 0x03,
}

impl BoardType {
    pub const ALL: [BoardType; 4] = [
        BoardType::DiyBasicKit,
        BoardType::DiyProIndoorV4_2,
        BoardType::OneIndoorMonitorV9_0,
        BoardType::OutdoorMonitorV1_3,
    ];

    /// The board's entry in the capability table.
    pub fn def(self) -> &'static BoardDef {
        &BOARD_DEFS[self as usize]
    }
}

impl TryFrom<u8> for BoardType {
    type Error = SensorError<()>;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        BoardType::ALL
            .iter()
            .copied()
            .find(|b| *b as u8 == value)
            .ok_or(SensorError::UnsupportedBoard(value))
    }
}

/// UART wiring of one sensor on one board.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct UartSensorDef {
    /// `None` means the sensor sits on the MCU's default UART pins.
    pub tx_pin: Option<u8>,
    pub rx_pin: Option<u8>,
    /// Family whose firmware can reach the sensor on this board.
    pub mcu: McuFamily,
}

impl UartSensorDef {
    #[inline]
    pub fn is_supported_on(&self, mcu: McuFamily) -> bool {
        self.mcu == mcu
    }
}

/// Sensor wiring of a board. Peripherals other than the two UART sensors
/// are the firmware's business.
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub struct BoardDef {
    pub name: &'static str,
    pub particulate: UartSensorDef,
    pub co2: UartSensorDef,
}

impl BoardDef {
    pub fn sensor(&self, kind: SensorKind) -> &UartSensorDef {
        match kind {
            SensorKind::Particulate => &self.particulate,
            SensorKind::Co2 => &self.co2,
        }
    }

    /// True if `kind` is reachable on this board from firmware built for `mcu`.
    pub fn supports(&self, kind: SensorKind, mcu: McuFamily) -> bool {
        self.sensor(kind).is_supported_on(mcu)
    }
}

impl fmt::Display for BoardDef {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name)
    }
}

const ESP8266_PMS: UartSensorDef = UartSensorDef { tx_pin: Some(14), rx_pin: Some(12), mcu: McuFamily::Esp8266 };
const ESP8266_S8: UartSensorDef = UartSensorDef { tx_pin: Some(2), rx_pin: Some(0), mcu: McuFamily::Esp8266 };
// PMS on UART0
const ESP32_PMS: UartSensorDef = UartSensorDef { tx_pin: None, rx_pin: None, mcu: McuFamily::Esp32 };
const ESP32_S8: UartSensorDef = UartSensorDef { tx_pin: Some(1), rx_pin: Some(0), mcu: McuFamily::Esp32 };

/// Indexed by `BoardType` discriminant.
pub static BOARD_DEFS: [BoardDef; 4] = [
    BoardDef { name: "DIY_BASIC_KIT", particulate: ESP8266_PMS, co2: ESP8266_S8 },
    BoardDef { name: "DIY_PRO_INDOOR_V4_2", particulate: ESP8266_PMS, co2: ESP8266_S8 },
    BoardDef { name: "ONE_INDOOR_MONITOR_V9_0", particulate: ESP32_PMS, co2: ESP32_S8 },
    BoardDef { name: "OUTDOOR_MONITOR_V1_3", particulate: ESP32_PMS, co2: ESP32_S8 },
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_board_type_try_from() {
        assert_eq!(BoardType::try_from(0x00), Ok(BoardType::DiyBasicKit));
        assert_eq!(BoardType::try_from(0x03), Ok(BoardType::OutdoorMonitorV1_3));
        assert_eq!(BoardType::try_from(0x04), Err(SensorError::UnsupportedBoard(0x04)));
        assert_eq!(BoardType::try_from(0xFF), Err(SensorError::UnsupportedBoard(0xFF)));
    }

    #[test]
    fn test_table_is_indexed_by_discriminant() {
        assert_eq!(BoardType::DiyProIndoorV4_2.def().name, "DIY_PRO_INDOOR_V4_2");
        assert_eq!(BoardType::OneIndoorMonitorV9_0.def().name, "ONE_INDOOR_MONITOR_V9_0");
    }

    #[test]
    fn test_pins() {
        let basic = BoardType::DiyBasicKit.def();
        assert_eq!(basic.particulate.tx_pin, Some(14));
        assert_eq!(basic.particulate.rx_pin, Some(12));
        assert_eq!(basic.co2.tx_pin, Some(2));
        assert_eq!(basic.co2.rx_pin, Some(0));

        let one = BoardType::OneIndoorMonitorV9_0.def();
        assert_eq!(one.particulate.tx_pin, None);
        assert_eq!(one.co2.tx_pin, Some(1));
    }

    #[test]
    fn test_support_depends_on_mcu() {
        let basic = BoardType::DiyBasicKit.def();
        assert!(basic.supports(SensorKind::Particulate, McuFamily::Esp8266));
        assert!(basic.supports(SensorKind::Co2, McuFamily::Esp8266));
        assert!(!basic.supports(SensorKind::Co2, McuFamily::Esp32));

        let outdoor = BoardType::OutdoorMonitorV1_3.def();
        assert!(outdoor.supports(SensorKind::Particulate, McuFamily::Esp32));
        assert!(!outdoor.supports(SensorKind::Particulate, McuFamily::Esp8266));
    }
}
