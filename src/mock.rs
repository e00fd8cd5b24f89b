//! In-memory bird for tests and hardware-free development.

use std::io;

use crate::driver::BirdDriver;
use crate::protocol::{self, FRAME_WORDS};
use crate::types::{DataFormat, SessionConfig};
use crate::Result;

/// [`BirdDriver`] backed by a scripted sensor state instead of hardware.
///
/// `set_sensor_frame` stages the values the simulated bird would report;
/// `request_frame` then copies exactly the slots the active data format
/// covers, so format-subset and stale-slot behavior match the real device.
pub struct MockDriver {
    sensor: [i16; FRAME_WORDS],
    scale: f64,
    format: DataFormat,
    opened: bool,
    streaming: bool,
    fail_next: bool,
}

impl MockDriver {
    pub fn new() -> MockDriver {
        MockDriver {
            sensor: [0; FRAME_WORDS],
            scale: protocol::RANGE_36_INCHES,
            format: DataFormat::Position,
            opened: false,
            streaming: false,
            fail_next: false,
        }
    }

    /// Stage the full sensor state the next refresh draws from.
    pub fn set_sensor_frame(&mut self, values: [i16; FRAME_WORDS]) {
        self.sensor = values;
    }

    /// Stage the position scaling factor the next refresh reports.
    pub fn set_scaling(&mut self, scale: f64) {
        self.scale = scale;
    }

    /// Make the next driver operation fail with an I/O error.
    pub fn inject_failure(&mut self) {
        self.fail_next = true;
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn check_failure(&mut self) -> Result<()> {
        if self.fail_next {
            self.fail_next = false;
            return Err(io::Error::from(io::ErrorKind::BrokenPipe).into());
        }
        Ok(())
    }
}

impl Default for MockDriver {
    fn default() -> MockDriver {
        MockDriver::new()
    }
}

impl BirdDriver for MockDriver {
    fn open(&mut self, _config: &SessionConfig) -> Result<()> {
        self.check_failure()?;
        self.opened = true;
        self.streaming = false;
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        self.check_failure()?;
        self.opened = false;
        self.streaming = false;
        Ok(())
    }

    fn request_frame(&mut self, frame: &mut [i16; FRAME_WORDS]) -> Result<f64> {
        self.check_failure()?;
        let mut words = [0i16; FRAME_WORDS];
        let n = protocol::record_words(self.format);
        protocol::extract_record(&self.sensor, self.format, &mut words[..n]);
        protocol::apply_record(frame, self.format, &words[..n]);
        Ok(self.scale)
    }

    fn start_streaming(&mut self) -> Result<()> {
        self.check_failure()?;
        self.streaming = true;
        Ok(())
    }

    fn stop_streaming(&mut self) -> Result<()> {
        self.check_failure()?;
        self.streaming = false;
        Ok(())
    }

    fn set_data_format(&mut self, format: DataFormat) -> Result<()> {
        self.check_failure()?;
        self.format = format;
        Ok(())
    }

    fn data_format(&self) -> DataFormat {
        self.format
    }
}
