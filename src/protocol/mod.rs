//! Protocol definitions for powermon devices.
//!
//! This module contains the low-level protocol types:
//! - Frame encoding, validation and measurement decoding
//! - Sensor kind definitions and opcodes

pub mod frame;
pub mod sensor;

pub use frame::{DEVICE_ADDRESS, FRAME_LEN, Frame, REQUEST_TAG, RESPONSE_TAG};
pub use sensor::SensorKind;
