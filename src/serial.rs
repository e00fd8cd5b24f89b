//! Serial transport speaking the bird's RS-232 protocol.
//!
//! The wire format is plain 8N1 with no flow control. Commands are single
//! bytes (plus a parameter byte for examine-value); records come back as
//! little-endian word pairs framed only by the phasing bit on the first
//! byte. See [`crate::protocol`] for the byte-level details.

use std::io::{self, Read, Write};
use std::thread;
use std::time::Duration;

use serialport::{ClearBuffer, DataBits, FlowControl, Parity, SerialPort, StopBits};

use crate::driver::BirdDriver;
use crate::protocol::{self, FRAME_WORDS, PHASING_BIT};
use crate::types::{BirdStatus, DataFormat, SessionConfig};
use crate::{FobError, Result};

/// How long the RTS line is held high to reset the bird.
const RESET_PULSE: Duration = Duration::from_millis(250);
/// Settle time after the reset pulse before the bird accepts commands.
const RESET_SETTLE: Duration = Duration::from_millis(500);
/// Wait for the final stream-mode record before flushing it.
const STREAM_FLUSH_DELAY: Duration = Duration::from_millis(50);
/// Bytes to skip while hunting for a phasing bit before giving up.
const MAX_SYNC_SKIP: usize = 4 * FRAME_WORDS;

/// [`BirdDriver`] implementation over a real serial connection.
pub struct SerialTransport {
    port: Option<Box<dyn SerialPort>>,
    format: DataFormat,
    pos_scale: f64,
    read_timeout: Duration,
    write_timeout: Duration,
    streaming: bool,
}

impl SerialTransport {
    pub fn new() -> SerialTransport {
        SerialTransport {
            port: None,
            format: DataFormat::Position,
            pos_scale: 0.0,
            read_timeout: SessionConfig::DEFAULT_TIMEOUT,
            write_timeout: SessionConfig::DEFAULT_TIMEOUT,
            streaming: false,
        }
    }

    fn port_mut(&mut self) -> Result<&mut Box<dyn SerialPort>> {
        self.port.as_mut().ok_or(FobError::NotOpen)
    }

    /// Send a command under the write timeout, then restore the read timeout.
    fn send(&mut self, bytes: &[u8]) -> Result<()> {
        let read_timeout = self.read_timeout;
        let write_timeout = self.write_timeout;
        let port = self.port_mut()?;
        port.set_timeout(write_timeout)?;
        let mut written = port.write_all(bytes);
        if written.is_ok() {
            written = port.flush();
        }
        port.set_timeout(read_timeout)?;
        written?;
        Ok(())
    }

    /// Examine-value transaction: command `O` plus a parameter number,
    /// answered with a 2-byte little-endian parameter block.
    fn examine_u16(&mut self, parameter: u8) -> Result<u16> {
        self.send(&[protocol::CMD_EXAMINE, parameter])?;
        let mut reply = [0u8; 2];
        read_full(self.port_mut()?, &mut reply)?;
        Ok(u16::from_le_bytes(reply))
    }

    /// Wake the bird and sync host-side state from it.
    fn wake_and_sync(&mut self) -> Result<()> {
        self.send(&[protocol::CMD_RUN])?;

        // The status read doubles as a liveness check, and the status word
        // carries whatever format the bird was left in.
        let status = BirdStatus::from_bits_retain(self.examine_u16(protocol::PARAM_BIRD_STATUS)?);
        self.format = status.data_format()?;

        let scale_code = self.examine_u16(protocol::PARAM_POSITION_SCALING)?;
        self.pos_scale = protocol::position_scale(scale_code);

        log::debug!(
            "bird awake: status {:?}, format {:?}, position range {} in",
            status,
            self.format,
            self.pos_scale
        );
        Ok(())
    }

    /// Read one record, resynchronizing on the phasing bit if the stream is
    /// mid-record when the read starts.
    fn read_record(&mut self, record: &mut [u8]) -> Result<()> {
        let port = self.port_mut()?;
        let mut first = [0u8; 1];
        let mut skipped = 0;
        loop {
            read_full(port, &mut first)?;
            if first[0] & PHASING_BIT != 0 {
                break;
            }
            skipped += 1;
            if skipped > MAX_SYNC_SKIP {
                return Err(FobError::OutOfPhase(first[0]));
            }
        }
        record[0] = first[0];
        read_full(port, &mut record[1..])?;
        Ok(())
    }
}

impl Default for SerialTransport {
    fn default() -> SerialTransport {
        SerialTransport::new()
    }
}

impl BirdDriver for SerialTransport {
    fn open(&mut self, config: &SessionConfig) -> Result<()> {
        let mut port = serialport::new(&config.port, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .timeout(config.read_timeout)
            .open()?;

        // Holding RTS high resets the bird; it powers up asleep afterwards.
        port.write_request_to_send(true)?;
        thread::sleep(RESET_PULSE);
        port.write_request_to_send(false)?;
        thread::sleep(RESET_SETTLE);
        port.clear(ClearBuffer::All)?;

        self.read_timeout = config.read_timeout;
        self.write_timeout = config.write_timeout;
        self.port = Some(port);
        self.streaming = false;

        if let Err(err) = self.wake_and_sync() {
            self.port = None;
            return Err(err);
        }
        log::info!("opened bird on {} at {} bps", config.port, config.baud_rate);
        Ok(())
    }

    fn close(&mut self) -> Result<()> {
        // Sleep is best-effort; the port goes away regardless.
        if self.port.is_some() {
            if let Err(err) = self.send(&[protocol::CMD_SLEEP]) {
                log::warn!("failed to put the bird to sleep: {err}");
            }
        }
        self.port = None;
        self.streaming = false;
        Ok(())
    }

    fn request_frame(&mut self, frame: &mut [i16; FRAME_WORDS]) -> Result<f64> {
        let format = self.format;
        let words = protocol::record_words(format);
        if words == 0 {
            return Ok(self.pos_scale);
        }

        if !self.streaming {
            self.send(&[protocol::CMD_POINT])?;
        }

        let mut bytes = [0u8; 2 * FRAME_WORDS];
        let record = &mut bytes[..2 * words];
        self.read_record(record)?;

        let mut decoded = [0i16; FRAME_WORDS];
        protocol::decode_record(record, &mut decoded[..words])?;
        protocol::apply_record(frame, format, &decoded[..words]);
        Ok(self.pos_scale)
    }

    fn start_streaming(&mut self) -> Result<()> {
        self.port_mut()?.clear(ClearBuffer::Input)?;
        self.send(&[protocol::CMD_STREAM])?;
        self.streaming = true;
        log::info!("stream mode on");
        Ok(())
    }

    fn stop_streaming(&mut self) -> Result<()> {
        // Any non-stream command ends stream mode; Point is the
        // conventional one. The bird answers with a final record, flushed
        // here so the next point read starts clean.
        self.send(&[protocol::CMD_POINT])?;
        thread::sleep(STREAM_FLUSH_DELAY);
        self.port_mut()?.clear(ClearBuffer::Input)?;
        self.streaming = false;
        log::info!("stream mode off");
        Ok(())
    }

    fn set_data_format(&mut self, format: DataFormat) -> Result<()> {
        // NoData has no selector: the bird keeps its last format and the
        // host simply stops requesting records.
        if let Some(cmd) = protocol::format_command(format) {
            self.send(&[cmd])?;
        }
        self.format = format;
        log::debug!("data format set to {:?}", format);
        Ok(())
    }

    fn data_format(&self) -> DataFormat {
        self.format
    }
}

/// Fill `buf` completely, distinguishing a dead line (timeout with nothing
/// read, surfaced as the I/O error) from a truncated reply.
fn read_full<R: Read + ?Sized>(reader: &mut R, buf: &mut [u8]) -> Result<()> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => return Err(FobError::ShortResponse(filled)),
            Ok(n) => filled += n,
            Err(err) if err.kind() == io::ErrorKind::TimedOut && filled > 0 => {
                return Err(FobError::ShortResponse(filled));
            }
            Err(err) => return Err(err.into()),
        }
    }
    Ok(())
}
