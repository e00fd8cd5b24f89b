use crate::protocol::FRAME_WORDS;
use crate::types::{DataFormat, SessionConfig};
use crate::Result;

/// Transport-level operations the session layer needs from a bird.
///
/// [`SerialTransport`] implements this over a real RS-232 connection;
/// [`MockDriver`] implements it in memory for tests and hardware-free use.
/// Implementations own their connection state; the [`Fob`] session object
/// owns the open/closed/streaming state machine on top.
///
/// [`SerialTransport`]: crate::SerialTransport
/// [`MockDriver`]: crate::MockDriver
/// [`Fob`]: crate::Fob
pub trait BirdDriver {
    /// Establish the connection described by `config` and wake the bird.
    fn open(&mut self, config: &SessionConfig) -> Result<()>;

    /// Put the bird to sleep and tear the connection down.
    fn close(&mut self) -> Result<()>;

    /// Retrieve one record and write it into the frame slots the active
    /// data format covers, leaving the rest untouched. Returns the position
    /// scaling factor in effect.
    fn request_frame(&mut self, frame: &mut [i16; FRAME_WORDS]) -> Result<f64>;

    /// Ask the bird to emit records continuously.
    fn start_streaming(&mut self) -> Result<()>;

    /// Return the bird to one-record-per-request operation.
    fn stop_streaming(&mut self) -> Result<()>;

    /// Select which quantities a record carries.
    fn set_data_format(&mut self, format: DataFormat) -> Result<()>;

    /// The data format currently in effect.
    fn data_format(&self) -> DataFormat;
}
