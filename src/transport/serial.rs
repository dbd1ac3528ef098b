//! Serial/USB transport implementation.
//!
//! This module opens the device's character device in raw mode and runs
//! the single request/response transaction against it.

use std::time::Duration;

use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};

use crate::error::{Error, Result};
use crate::protocol::{FRAME_LEN, Frame, SensorKind};

/// Baud rate the device speaks; fixed by its firmware.
pub const BAUD_RATE: u32 = 9_600;

/// Ceiling on the wait for a response frame.
pub const RESPONSE_TIMEOUT: Duration = Duration::from_secs(1);

/// Configuration for the serial transport.
#[derive(Debug, Clone)]
pub struct SerialConfig {
    /// Serial port path (e.g., "/dev/ttyUSB0" or "COM3").
    pub path: String,
    /// Baud rate.
    pub baud_rate: u32,
    /// How long to wait for the response frame.
    pub response_timeout: Duration,
}

impl SerialConfig {
    /// Creates a new serial configuration with default settings.
    #[must_use]
    pub fn new(path: impl Into<String>) -> Self {
        Self {
            path: path.into(),
            baud_rate: BAUD_RATE,
            response_timeout: RESPONSE_TIMEOUT,
        }
    }

    /// Sets the baud rate.
    #[must_use]
    pub const fn baud_rate(mut self, rate: u32) -> Self {
        self.baud_rate = rate;
        self
    }

    /// Sets the response timeout.
    #[must_use]
    pub const fn response_timeout(mut self, timeout: Duration) -> Self {
        self.response_timeout = timeout;
        self
    }
}

/// Exclusive handle to a power-monitoring device.
///
/// Owns the underlying stream for the life of the process and releases
/// it on drop, on success and failure paths alike. Generic over the
/// stream so transactions can run against in-memory pipes in tests.
pub struct Device<S> {
    stream: S,
    response_timeout: Duration,
}

impl Device<SerialStream> {
    /// Opens the serial device and configures the line.
    ///
    /// The port is opened read/write in raw (non-canonical) mode with
    /// 8 data bits, no parity, one stop bit and no flow control, both
    /// speeds set from the configuration.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Serial`] with the underlying system error if the
    /// port cannot be opened or the line cannot be configured.
    pub fn open(config: &SerialConfig) -> Result<Self> {
        tracing::debug!("opening serial port: {}", config.path);

        let stream = tokio_serial::new(&config.path, config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open_native_async()
            .map_err(Error::Serial)?;

        Ok(Self {
            stream,
            response_timeout: config.response_timeout,
        })
    }
}

impl<S: AsyncRead + AsyncWrite + Unpin> Device<S> {
    /// Wraps an already-open stream with the default response timeout.
    #[must_use]
    pub const fn new(stream: S) -> Self {
        Self {
            stream,
            response_timeout: RESPONSE_TIMEOUT,
        }
    }

    /// Performs one request/response transaction.
    ///
    /// Writes the request frame, waits up to the response timeout for
    /// exactly one response frame, and decodes it for the requested
    /// sensor. Any failure aborts the transaction; nothing is retried
    /// and no partial frame is reused.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Io`] if the request cannot be written or the
    /// response read falls short, [`Error::Timeout`] if no response
    /// arrives in time, or [`Error::Protocol`] if the response frame
    /// fails validation.
    pub async fn transact(&mut self, kind: SensorKind) -> Result<f64> {
        let request = Frame::request(kind);
        tracing::trace!("sending {} request: {:02x?}", kind, request.as_bytes());

        self.stream
            .write_all(request.as_bytes())
            .await
            .map_err(|e| Error::io("send request", e))?;
        self.stream
            .flush()
            .await
            .map_err(|e| Error::io("send request", e))?;

        let mut buf = [0u8; FRAME_LEN];
        match timeout(self.response_timeout, self.stream.read_exact(&mut buf)).await {
            Err(_) => {
                return Err(Error::Timeout {
                    timeout_ms: u64::try_from(self.response_timeout.as_millis())
                        .unwrap_or(u64::MAX),
                });
            }
            Ok(Err(e)) => return Err(Error::io("read response", e)),
            Ok(Ok(_)) => {}
        }
        tracing::trace!("received response: {:02x?}", buf);

        let value = Frame::from_bytes(buf).decode(kind)?;
        tracing::debug!("decoded {}: {}{}", kind, value, kind.unit());
        Ok(value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::ProtocolError;
    use crate::protocol::RESPONSE_TAG;

    /// Assembles a checksummed response frame for test peers.
    fn response_bytes(kind: SensorKind, payload: [u8; 5]) -> [u8; FRAME_LEN] {
        let mut body = [0u8; FRAME_LEN];
        body[0] = RESPONSE_TAG | kind.opcode();
        body[1..6].copy_from_slice(&payload);
        body[6] = body[..6].iter().fold(0u8, |sum, &b| sum.wrapping_add(b));
        body
    }

    #[test]
    fn test_serial_config_defaults() {
        let config = SerialConfig::new("/dev/ttyUSB0");
        assert_eq!(config.path, "/dev/ttyUSB0");
        assert_eq!(config.baud_rate, BAUD_RATE);
        assert_eq!(config.response_timeout, RESPONSE_TIMEOUT);
    }

    #[test]
    fn test_serial_config_builder() {
        let config = SerialConfig::new("/dev/ttyUSB0")
            .baud_rate(115_200)
            .response_timeout(Duration::from_millis(250));
        assert_eq!(config.baud_rate, 115_200);
        assert_eq!(config.response_timeout, Duration::from_millis(250));
    }

    #[tokio::test]
    async fn test_transact_decodes_scripted_response() {
        let (stream, mut peer) = tokio::io::duplex(64);
        let mut device = Device::new(stream);

        peer.write_all(&response_bytes(
            SensorKind::Voltage,
            [0x00, 0xE6, 0x05, 0x00, 0x00],
        ))
        .await
        .unwrap();

        let value = device.transact(SensorKind::Voltage).await.unwrap();
        assert_eq!(value, 230.5);

        // The peer must have seen exactly the 7-byte request frame.
        let mut seen = [0u8; FRAME_LEN];
        peer.read_exact(&mut seen).await.unwrap();
        assert_eq!(&seen, Frame::request(SensorKind::Voltage).as_bytes());
    }

    #[tokio::test]
    async fn test_transact_test_mode_succeeds_on_zero_payload() {
        let (stream, mut peer) = tokio::io::duplex(64);
        let mut device = Device::new(stream);

        peer.write_all(&response_bytes(SensorKind::Test, [0u8; 5]))
            .await
            .unwrap();

        let value = device.transact(SensorKind::Test).await.unwrap();
        assert_eq!(value, 0.0);
    }

    #[tokio::test]
    async fn test_transact_propagates_protocol_error() {
        let (stream, mut peer) = tokio::io::duplex(64);
        let mut device = Device::new(stream);

        // Device answers for power when voltage was requested.
        peer.write_all(&response_bytes(
            SensorKind::Power,
            [0x03, 0xE8, 0x00, 0x00, 0x00],
        ))
        .await
        .unwrap();

        let err = device.transact(SensorKind::Voltage).await.unwrap_err();
        assert!(matches!(
            err,
            Error::Protocol(ProtocolError::InvalidResponseType { .. })
        ));
    }

    #[tokio::test(start_paused = true)]
    async fn test_transact_times_out_without_response() {
        let (stream, peer) = tokio::io::duplex(64);
        let mut device = Device::new(stream);

        let err = device.transact(SensorKind::Test).await.unwrap_err();
        assert!(matches!(err, Error::Timeout { timeout_ms: 1000 }));

        // Keep the peer alive so the read waits on silence, not EOF.
        drop(peer);
    }

    #[tokio::test]
    async fn test_transact_fails_on_short_response() {
        let (stream, mut peer) = tokio::io::duplex(64);
        let mut device = Device::new(stream);

        peer.write_all(&[0xA4, 0x00, 0x00]).await.unwrap();
        drop(peer);

        let err = device.transact(SensorKind::Test).await.unwrap_err();
        assert!(matches!(err, Error::Io { op: "read response", .. }));
    }
}
