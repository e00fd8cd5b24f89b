//! # flockbird - Rust driver for the Ascension Flock of Birds
//!
//! Talks to a Flock of Birds 6DOF tracking sensor in standalone mode over
//! RS-232. In standalone mode only one sensor is used and its address is
//! fixed at zero; the unit factory defaults are 115200 bps with 2 second
//! read/write timeouts. Provides:
//! - Session lifecycle (open/close) and stream-mode control
//! - Frame retrieval decoded into position, angles, quaternion, and
//!   rotation-matrix values, scaled or raw
//! - A [`BirdDriver`] trait with a serial implementation and an in-memory
//!   mock for running without hardware
//!
//! ## Quick Start
//! ```no_run
//! use flockbird::{DataFormat, Fob, SessionConfig};
//!
//! let mut bird = Fob::standalone();
//! bird.open(SessionConfig::for_port("/dev/ttyUSB0")).unwrap();
//! bird.set_data_format(DataFormat::PositionAngles).unwrap();
//! bird.start_streaming().unwrap();
//! for _ in 0..100 {
//!     bird.refresh().unwrap();
//!     let [x, y, z] = bird.frame().position();
//!     println!("pos: [{x:.3}, {y:.3}, {z:.3}] az: {:.1}", bird.frame().azimuth_degrees());
//! }
//! bird.stop_streaming().unwrap();
//! bird.close().unwrap();
//! ```

pub mod error;
pub mod types;
pub mod protocol;
pub mod frame;
pub mod driver;
pub mod serial;
pub mod mock;
pub mod device;

pub use device::Fob;
pub use driver::BirdDriver;
pub use error::FobError;
pub use frame::FrameStore;
pub use mock::MockDriver;
pub use serial::SerialTransport;
pub use types::*;

/// Result type alias for flockbird operations.
pub type Result<T> = std::result::Result<T, FobError>;
