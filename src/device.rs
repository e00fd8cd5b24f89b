use std::time::Duration;

use crate::driver::BirdDriver;
use crate::frame::FrameStore;
use crate::serial::SerialTransport;
use crate::types::{DataFormat, SessionConfig};
use crate::{FobError, Result};

/// A Flock of Birds unit in standalone mode.
///
/// The session starts closed. `open` establishes the connection and
/// `close` tears it down; the cycle is repeatable. While open, streaming
/// can be toggled independently. Session state only changes when the
/// underlying driver call succeeds, so a failed operation leaves the
/// session where it was.
///
/// All sensor values are read through [`frame`](Fob::frame); they change
/// only when [`refresh`](Fob::refresh) is called.
pub struct Fob<D = SerialTransport> {
    driver: D,
    frame: FrameStore,
    config: SessionConfig,
    opened: bool,
    streaming: bool,
}

impl Fob<SerialTransport> {
    /// Session over a real serial connection, initially closed.
    pub fn standalone() -> Fob<SerialTransport> {
        Fob::new(SerialTransport::new())
    }
}

impl<D: BirdDriver> Fob<D> {
    /// Session over any driver, initially closed.
    pub fn new(driver: D) -> Fob<D> {
        Fob {
            driver,
            frame: FrameStore::new(),
            config: SessionConfig::default(),
            opened: false,
            streaming: false,
        }
    }

    /// Open the connection to the bird.
    ///
    /// Fails with [`FobError::AlreadyOpen`] if the session is already open.
    pub fn open(&mut self, config: SessionConfig) -> Result<()> {
        if self.opened {
            return Err(FobError::AlreadyOpen);
        }
        self.driver.open(&config)?;
        self.opened = true;
        self.streaming = false;
        self.config = config;
        Ok(())
    }

    /// Open with the default port, baud rate, and timeouts.
    pub fn open_default(&mut self) -> Result<()> {
        self.open(SessionConfig::default())
    }

    /// Close the connection to the bird.
    ///
    /// Fails with [`FobError::NotOpen`] if the session was never opened.
    /// The configuration accessors keep reporting the values from the last
    /// open.
    pub fn close(&mut self) -> Result<()> {
        if !self.opened {
            return Err(FobError::NotOpen);
        }
        self.driver.close()?;
        self.opened = false;
        self.streaming = false;
        Ok(())
    }

    pub fn is_open(&self) -> bool {
        self.opened
    }

    pub fn is_streaming(&self) -> bool {
        self.streaming
    }

    fn require_open(&self) -> Result<()> {
        if self.opened {
            Ok(())
        } else {
            Err(FobError::NotOpen)
        }
    }

    /// Ask the bird to emit records continuously. The device takes a
    /// noticeable moment to spin up, so toggle streaming sparingly.
    /// No-op when already streaming.
    pub fn start_streaming(&mut self) -> Result<()> {
        self.require_open()?;
        if self.streaming {
            return Ok(());
        }
        self.driver.start_streaming()?;
        self.streaming = true;
        Ok(())
    }

    /// Return the bird to one-record-per-request operation. No-op when
    /// idle.
    pub fn stop_streaming(&mut self) -> Result<()> {
        self.require_open()?;
        if !self.streaming {
            return Ok(());
        }
        self.driver.stop_streaming()?;
        self.streaming = false;
        Ok(())
    }

    /// Select which quantities a refresh updates. Slots outside the chosen
    /// format keep their last-known values.
    pub fn set_data_format(&mut self, format: DataFormat) -> Result<()> {
        self.require_open()?;
        self.driver.set_data_format(format)
    }

    /// The data format currently in effect.
    pub fn data_format(&self) -> DataFormat {
        self.driver.data_format()
    }

    /// Request a new data frame from the bird.
    ///
    /// Overwrites the slots covered by the active data format and updates
    /// the position scaling factor. Accessors keep returning the previous
    /// frame until this succeeds.
    pub fn refresh(&mut self) -> Result<()> {
        self.require_open()?;
        let scale = self.driver.request_frame(self.frame.slots_mut())?;
        self.frame.set_scaling(scale);
        Ok(())
    }

    /// The stored frame and its accessors.
    pub fn frame(&self) -> &FrameStore {
        &self.frame
    }

    pub fn driver(&self) -> &D {
        &self.driver
    }

    /// Direct access to the driver, e.g. to script a [`MockDriver`].
    ///
    /// [`MockDriver`]: crate::MockDriver
    pub fn driver_mut(&mut self) -> &mut D {
        &mut self.driver
    }

    /// Port name captured at the most recent successful open.
    pub fn port(&self) -> &str {
        &self.config.port
    }

    /// Baud rate captured at the most recent successful open.
    pub fn baud_rate(&self) -> u32 {
        self.config.baud_rate
    }

    /// Read timeout captured at the most recent successful open.
    pub fn read_timeout(&self) -> Duration {
        self.config.read_timeout
    }

    /// Write timeout captured at the most recent successful open.
    pub fn write_timeout(&self) -> Duration {
        self.config.write_timeout
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::mock::MockDriver;
    use crate::protocol::FRAME_WORDS;

    fn open_bird() -> Fob<MockDriver> {
        let mut bird = Fob::new(MockDriver::new());
        bird.open_default().unwrap();
        bird
    }

    #[test]
    fn test_double_open_fails_and_stays_open() {
        let mut bird = open_bird();
        assert!(matches!(
            bird.open(SessionConfig::default()),
            Err(FobError::AlreadyOpen)
        ));
        assert!(bird.is_open());
    }

    #[test]
    fn test_close_without_open_fails() {
        let mut bird = Fob::new(MockDriver::new());
        assert!(matches!(bird.close(), Err(FobError::NotOpen)));
        assert!(!bird.is_open());
    }

    #[test]
    fn test_open_close_cycle_repeats() {
        let mut bird = Fob::new(MockDriver::new());
        bird.open_default().unwrap();
        bird.close().unwrap();
        bird.open_default().unwrap();
        assert!(bird.is_open());
        bird.close().unwrap();
    }

    #[test]
    fn test_failed_open_leaves_session_closed() {
        let mut bird = Fob::new(MockDriver::new());
        bird.driver_mut().inject_failure();
        assert!(matches!(bird.open_default(), Err(FobError::Io(_))));
        assert!(!bird.is_open());

        bird.open_default().unwrap();
        assert!(bird.is_open());
    }

    #[test]
    fn test_operations_require_open() {
        let mut bird = Fob::new(MockDriver::new());
        assert!(matches!(bird.refresh(), Err(FobError::NotOpen)));
        assert!(matches!(bird.start_streaming(), Err(FobError::NotOpen)));
        assert!(matches!(
            bird.set_data_format(DataFormat::Angles),
            Err(FobError::NotOpen)
        ));
    }

    #[test]
    fn test_accessors_zero_before_first_refresh() {
        let bird = open_bird();
        assert_eq!(bird.frame().position(), [0.0; 3]);
        assert_eq!(bird.frame().azimuth_degrees(), 0.0);
        assert_eq!(bird.frame().scaling(), 0.0);
    }

    #[test]
    fn test_refresh_updates_active_format_only() {
        let mut bird = open_bird();
        let mut sensor = [0i16; FRAME_WORDS];
        sensor[0] = 100; // x
        sensor[3] = 200; // azimuth
        bird.driver_mut().set_sensor_frame(sensor);

        bird.set_data_format(DataFormat::Position).unwrap();
        bird.refresh().unwrap();
        assert_eq!(bird.frame().raw_x(), 100);
        assert_eq!(bird.frame().raw_azimuth(), 0);

        // Switch formats and move the sensor: position slots go stale.
        sensor[0] = 999;
        sensor[3] = 300;
        bird.driver_mut().set_sensor_frame(sensor);
        bird.set_data_format(DataFormat::Angles).unwrap();
        bird.refresh().unwrap();
        assert_eq!(bird.frame().raw_azimuth(), 300);
        assert_eq!(bird.frame().raw_x(), 100);
    }

    #[test]
    fn test_refresh_updates_scaling() {
        let mut bird = open_bird();
        bird.driver_mut().set_scaling(72.0);
        bird.refresh().unwrap();
        assert_eq!(bird.frame().scaling(), 72.0);
    }

    #[test]
    fn test_streaming_toggle() {
        let mut bird = open_bird();
        assert!(!bird.is_streaming());

        bird.start_streaming().unwrap();
        assert!(bird.is_streaming());
        assert!(bird.driver().is_streaming());

        // Idempotent in both directions.
        bird.start_streaming().unwrap();
        bird.stop_streaming().unwrap();
        assert!(!bird.is_streaming());
        bird.stop_streaming().unwrap();
    }

    #[test]
    fn test_failed_stream_start_stays_idle() {
        let mut bird = open_bird();
        bird.driver_mut().inject_failure();
        assert!(bird.start_streaming().is_err());
        assert!(!bird.is_streaming());
    }

    #[test]
    fn test_config_persists_after_close() {
        let mut bird = Fob::new(MockDriver::new());
        let config = SessionConfig {
            port: "/dev/ttyUSB7".to_string(),
            baud_rate: 38_400,
            read_timeout: Duration::from_millis(250),
            write_timeout: Duration::from_millis(125),
        };
        bird.open(config).unwrap();
        bird.close().unwrap();

        assert_eq!(bird.port(), "/dev/ttyUSB7");
        assert_eq!(bird.baud_rate(), 38_400);
        assert_eq!(bird.read_timeout(), Duration::from_millis(250));
        assert_eq!(bird.write_timeout(), Duration::from_millis(125));
    }
}
