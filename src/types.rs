use std::time::Duration;

use crate::{FobError, Result};

/// Output format the bird reports in, selected with [`Fob::set_data_format`].
///
/// The discriminants are the device's own format codes (code 6 is reserved
/// for factory use and never valid). The format decides which slots of the
/// data frame a refresh overwrites; everything else keeps its previous value.
///
/// [`Fob::set_data_format`]: crate::Fob::set_data_format
#[repr(u8)]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DataFormat {
    /// No data is sent between the bird and the host.
    NoData = 0,
    /// Position only.
    Position = 1,
    /// Azimuth/elevation/roll angles only.
    Angles = 2,
    /// 3x3 rotation matrix only.
    Matrix = 3,
    /// Position and angles.
    PositionAngles = 4,
    /// Position and rotation matrix.
    PositionMatrix = 5,
    /// Quaternion only.
    Quaternion = 7,
    /// Position and quaternion.
    PositionQuaternion = 8,
}

impl DataFormat {
    /// The device format code for this variant.
    pub fn code(self) -> u8 {
        self as u8
    }

    /// Look up a variant by device format code.
    pub fn from_code(code: u8) -> Result<DataFormat> {
        match code {
            0 => Ok(DataFormat::NoData),
            1 => Ok(DataFormat::Position),
            2 => Ok(DataFormat::Angles),
            3 => Ok(DataFormat::Matrix),
            4 => Ok(DataFormat::PositionAngles),
            5 => Ok(DataFormat::PositionMatrix),
            7 => Ok(DataFormat::Quaternion),
            8 => Ok(DataFormat::PositionQuaternion),
            other => Err(FobError::UnknownFormat(other)),
        }
    }
}

/// Serial session settings, captured once at open time.
///
/// The defaults mirror the unit's factory setup: 115200 bps with 2 second
/// read/write timeouts on the first serial port.
#[derive(Debug, Clone)]
pub struct SessionConfig {
    /// Serial port name, e.g. `/dev/ttyUSB0` or `COM1`.
    pub port: String,
    /// Baud rate in bps.
    pub baud_rate: u32,
    /// Maximum time the driver waits during a read transmission attempt.
    pub read_timeout: Duration,
    /// Maximum time the driver waits during a write transmission attempt.
    pub write_timeout: Duration,
}

impl SessionConfig {
    pub const DEFAULT_BAUD_RATE: u32 = 115_200;
    pub const DEFAULT_TIMEOUT: Duration = Duration::from_millis(2000);

    #[cfg(windows)]
    pub const DEFAULT_PORT: &'static str = "COM1";
    #[cfg(not(windows))]
    pub const DEFAULT_PORT: &'static str = "/dev/ttyS0";

    /// Config for the given port with default baud rate and timeouts.
    pub fn for_port(port: impl Into<String>) -> SessionConfig {
        SessionConfig {
            port: port.into(),
            ..SessionConfig::default()
        }
    }
}

impl Default for SessionConfig {
    fn default() -> SessionConfig {
        SessionConfig {
            port: SessionConfig::DEFAULT_PORT.to_string(),
            baud_rate: SessionConfig::DEFAULT_BAUD_RATE,
            read_timeout: SessionConfig::DEFAULT_TIMEOUT,
            write_timeout: SessionConfig::DEFAULT_TIMEOUT,
        }
    }
}

bitflags::bitflags! {
    /// Bird status word (examine-value parameter 0).
    ///
    /// Bits 1..=4 are not flags: they hold the code of the active output
    /// format, extracted with [`BirdStatus::data_format`].
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct BirdStatus: u16 {
        const MASTER              = 1 << 15;
        const INITIALIZED         = 1 << 14;
        const ERROR_DETECTED      = 1 << 13;
        const NOT_RUNNING         = 1 << 12;
        const HOST_SYNC           = 1 << 11;
        const EXPANDED_ADDRESSING = 1 << 10;
        const CRT_SYNC            = 1 << 9;
        const NO_SYNC             = 1 << 8;
        const FACTORY_TEST        = 1 << 7;
        const XOFF                = 1 << 6;
        const SLEEPING            = 1 << 5;
        const STREAMING           = 1 << 0;

        // Retain the data-format field bits on from_bits_retain.
        const _ = !0;
    }
}

impl BirdStatus {
    /// Active output format encoded in bits 1..=4 of the status word.
    pub fn data_format(self) -> Result<DataFormat> {
        DataFormat::from_code(((self.bits() >> 1) & 0x0F) as u8)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_format_code_round_trip() {
        for format in [
            DataFormat::NoData,
            DataFormat::Position,
            DataFormat::Angles,
            DataFormat::Matrix,
            DataFormat::PositionAngles,
            DataFormat::PositionMatrix,
            DataFormat::Quaternion,
            DataFormat::PositionQuaternion,
        ] {
            assert_eq!(DataFormat::from_code(format.code()).unwrap(), format);
        }
        // Code 6 is reserved for factory use.
        assert!(matches!(
            DataFormat::from_code(6),
            Err(FobError::UnknownFormat(6))
        ));
        assert!(DataFormat::from_code(9).is_err());
    }

    #[test]
    fn test_status_word_carries_format() {
        // Initialized, running, position/angles format in bits 1..=4.
        let status = BirdStatus::from_bits_retain(1 << 14 | (4 << 1));
        assert!(status.contains(BirdStatus::INITIALIZED));
        assert!(!status.contains(BirdStatus::SLEEPING));
        assert_eq!(status.data_format().unwrap(), DataFormat::PositionAngles);

        let asleep = BirdStatus::from_bits_retain((1 << 5) | (1 << 1));
        assert!(asleep.contains(BirdStatus::SLEEPING));
        assert_eq!(asleep.data_format().unwrap(), DataFormat::Position);
    }
}
