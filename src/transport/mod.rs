//! Transport layer for powermon communication.
//!
//! This module owns the serial device handle and the transaction logic.
//! [`Device`] is generic over the underlying stream, so the transaction
//! path also runs against in-memory pipes in tests.

pub mod serial;

pub use serial::{BAUD_RATE, Device, RESPONSE_TIMEOUT, SerialConfig};
