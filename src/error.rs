//! Error types for the powermon library.

use thiserror::Error;

use crate::protocol::SensorKind;

/// The main error type for powermon operations.
#[derive(Debug, Error)]
pub enum Error {
    /// Serial port error (open or line configuration).
    #[error("serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    /// I/O error while talking to the device, tagged with the failed operation.
    #[error("failed to {op}: {source}")]
    Io {
        /// The operation that failed ("send request", "read response").
        op: &'static str,
        /// The underlying system error.
        source: std::io::Error,
    },

    /// No response arrived before the deadline.
    #[error("timeout while reading: no response after {timeout_ms}ms")]
    Timeout { timeout_ms: u64 },

    /// Response frame validation or decoding error.
    #[error("protocol error: {0}")]
    Protocol(#[from] ProtocolError),
}

impl Error {
    /// Wraps an I/O error with the name of the operation that failed.
    pub(crate) fn io(op: &'static str, source: std::io::Error) -> Self {
        Self::Io { op, source }
    }
}

/// Frame validation and decoding errors.
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum ProtocolError {
    /// Response tag byte does not match the requested sensor.
    #[error("invalid response type: expected {expected:#04x}, got {got:#04x}")]
    InvalidResponseType { expected: u8, got: u8 },

    /// Stored checksum does not match the sum of the frame body.
    #[error("checksum mismatch: computed {computed:#04x}, frame carries {stored:#04x}")]
    ChecksumMismatch { computed: u8, stored: u8 },

    /// A payload byte that must be zero for this sensor kind is not.
    #[error("{sensor} response has non-zero payload byte {index} ({value:#04x})")]
    UnexpectedPayload {
        sensor: SensorKind,
        index: usize,
        value: u8,
    },
}

/// Result type alias for powermon operations.
pub type Result<T> = std::result::Result<T, Error>;
