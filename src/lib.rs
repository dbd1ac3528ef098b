//! # powermon
//!
//! A Rust client for serial power-monitoring devices speaking a fixed
//! 7-byte request/response protocol.
//!
//! The crate performs exactly one transaction per device handle: build a
//! checksummed request frame, write it to the serial line, wait a bounded
//! time for the response, and decode it into a physical quantity.
//!
//! ## Quick Start
//!
//! ```no_run
//! use powermon::{Device, SensorKind, SerialConfig};
//!
//! #[tokio::main(flavor = "current_thread")]
//! async fn main() -> powermon::Result<()> {
//!     let mut device = Device::open(&SerialConfig::new("/dev/ttyUSB0"))?;
//!
//!     let volts = device.transact(SensorKind::Voltage).await?;
//!     println!("{volts} V");
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Architecture
//!
//! - [`protocol`] - Frame codec: request construction, response
//!   validation, per-sensor decoding
//! - [`transport`] - Serial line configuration and the single
//!   request/response transaction
//! - [`error`] - Error types

pub mod error;
pub mod protocol;
pub mod transport;

// Re-exports for convenience
pub use error::{Error, ProtocolError, Result};
pub use protocol::{Frame, SensorKind};
pub use transport::{Device, SerialConfig};
