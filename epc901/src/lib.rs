//! Driver for the EPC901 line sensor breakout board.
//!
//! The board speaks a line based ASCII protocol over a serial port: commands start with `@`,
//! every command is answered with an acknowledgment line and captured frames are pulled with
//! `@transfer` as a metadata line followed by pixels encoded as one long hex string.
//!
//! ```no_run
//! use epc901::{BurstController, CaptureMode, SerialConfig};
//!
//! # fn main() -> epc901::error::Result<()> {
//! let mut camera = BurstController::open_serial("/dev/ttyACM0", &SerialConfig::default())?;
//! camera.configure_exposure(1000)?;
//! camera.configure_burst(10, 0)?;
//! camera.capture_burst(CaptureMode::Normal)?;
//! let session = camera.transfer_all()?;
//! camera.close();
//! println!("Got {} frames", session.frames.len());
//! # Ok(())
//! # }
//! ```

pub mod burst;
pub mod command;
pub mod config;
pub mod error;
pub mod io_adapter;
pub mod protocol;
pub mod response;


pub use burst::{BurstController, BurstState, Session};
pub use config::{AcquisitionConfig, BurstConfig, CaptureMode, SerialConfig};
pub use io_adapter::{std_io::StdIoAdapter, Transport};
#[cfg(feature = "serial")]
pub use io_adapter::serial::{list_ports, open_serial, SerialAdapter};
pub use protocol::Protocol;
pub use response::{Frame, FrameMeta, Transfer, SENSOR_PIXEL_COUNT};
