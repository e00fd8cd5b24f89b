/// Errors that can occur when interacting with the Flock of Birds unit.
#[derive(Debug, thiserror::Error)]
pub enum FobError {
    #[error("the bird is already open")]
    AlreadyOpen,

    #[error("the bird was never opened")]
    NotOpen,

    #[error("serial port error: {0}")]
    Serial(#[from] serialport::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("record out of phase: no phasing bit in 0x{0:02x}")]
    OutOfPhase(u8),

    #[error("device reported unknown data format code {0}")]
    UnknownFormat(u8),

    #[error("short examine response: got {0} bytes")]
    ShortResponse(usize),
}
