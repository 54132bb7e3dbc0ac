use crate::command::Command;
use crate::constants::{DEFAULT_BAUD_RATE, DEFAULT_PORT};
use crate::error::LedError;
use crate::packet::{Frame, FrameParser};
use bytes::{Buf, Bytes, BytesMut};
use std::io;
use std::path::PathBuf;
use std::time::Duration;
use tokio::io::{AsyncRead, AsyncReadExt, AsyncWrite, AsyncWriteExt};
use tokio::time::timeout;
use tokio_serial::{DataBits, FlowControl, Parity, SerialPortBuilderExt, SerialStream, StopBits};
use tracing::{debug, info, warn};

// Default timeout for reading a response
const DEFAULT_TIMEOUT: Duration = Duration::from_millis(500);

// Size of a single read from the transport
const READ_CHUNK: usize = 1024;

/// Connection settings for a display controller
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeviceConfig {
    /// Serial device the controller is attached to
    pub port: PathBuf,
    /// Line rate in bits per second, applied when the port is opened
    pub baud_rate: u32,
    /// Upper bound on waiting for a response
    pub response_timeout: Duration,
    /// Screen addressed when the caller does not pick one
    pub screen_id: u8,
}

impl Default for DeviceConfig {
    fn default() -> Self {
        Self {
            port: PathBuf::from(DEFAULT_PORT),
            baud_rate: DEFAULT_BAUD_RATE,
            response_timeout: DEFAULT_TIMEOUT,
            screen_id: 1,
        }
    }
}

impl DeviceConfig {
    pub fn new(port: impl Into<PathBuf>) -> Self {
        Self {
            port: port.into(),
            ..Self::default()
        }
    }

    pub fn with_baud_rate(mut self, baud_rate: u32) -> Self {
        self.baud_rate = baud_rate;
        self
    }

    pub fn with_response_timeout(mut self, response_timeout: Duration) -> Self {
        self.response_timeout = response_timeout;
        self
    }

    pub fn with_screen_id(mut self, screen_id: u8) -> Self {
        self.screen_id = screen_id;
        self
    }
}

/// A session with one display controller over an ordered byte stream.
///
/// Owns the transport; `close` shuts it down, dropping the session releases it.
pub struct Controller<T> {
    io: T,
    config: DeviceConfig,
    parser: FrameParser,
    // bytes read past the end of the last returned frame
    rx: BytesMut,
}

impl Controller<SerialStream> {
    /// Open the configured serial port at `baud_rate`, 8N1, no flow control
    pub fn open(config: DeviceConfig) -> Result<Self, LedError> {
        info!("Opening {} at {} bps", config.port.display(), config.baud_rate);
        let port = tokio_serial::new(config.port.to_string_lossy(), config.baud_rate)
            .data_bits(DataBits::Eight)
            .parity(Parity::None)
            .stop_bits(StopBits::One)
            .flow_control(FlowControl::None)
            .open_native_async()?;
        info!("Port opened successfully.");
        Ok(Self::new(port, config))
    }
}

impl<T: AsyncRead + AsyncWrite + Unpin> Controller<T> {
    pub fn new(io: T, config: DeviceConfig) -> Self {
        Self {
            io,
            config,
            parser: FrameParser::new(),
            rx: BytesMut::new(),
        }
    }

    pub fn config(&self) -> &DeviceConfig {
        &self.config
    }

    /// Build, frame and write `command` for `screen_id`
    pub async fn send(&mut self, screen_id: u8, command: &Command) -> Result<(), LedError> {
        let frame = command.to_frame(screen_id)?;
        debug!("Sending {:?} to screen {}", command, screen_id);
        self.send_frame(&frame).await
    }

    /// Send `command` to the configured default screen
    pub async fn send_default(&mut self, command: &Command) -> Result<(), LedError> {
        self.send(self.config.screen_id, command).await
    }

    /// Write a pre-built frame
    pub async fn send_frame(&mut self, frame: &Frame) -> Result<(), LedError> {
        let bytes = frame.to_bytes();
        debug!("TX {} bytes: {}", bytes.len(), hex::encode(&bytes));
        self.io.write_all(&bytes).await?;
        self.io.flush().await?;
        info!("Sent {} bytes", bytes.len());
        Ok(())
    }

    /// Read whatever the controller sends back within the timeout, uninterpreted.
    ///
    /// Bytes left over from a previous `read_frame` are returned first, and any
    /// frame the parser had half assembled is dropped.
    pub async fn read_response(&mut self) -> Result<Bytes, LedError> {
        self.parser.reset();
        if !self.rx.is_empty() {
            return Ok(self.rx.split().freeze());
        }

        let mut buf = vec![0u8; READ_CHUNK];
        let n = timeout(self.config.response_timeout, self.io.read(&mut buf)).await??;
        if n == 0 {
            return Err(closed());
        }
        buf.truncate(n);
        debug!("RX {} bytes: {}", n, hex::encode(&buf));
        Ok(Bytes::from(buf))
    }

    /// Read until one complete, valid frame arrives or the timeout elapses.
    ///
    /// Garbage and malformed frames in between are logged and skipped.
    pub async fn read_frame(&mut self) -> Result<Frame, LedError> {
        let limit = self.config.response_timeout;
        timeout(limit, self.next_frame()).await?
    }

    /// Send `command` and read the raw response
    pub async fn request(&mut self, screen_id: u8, command: &Command) -> Result<Bytes, LedError> {
        self.send(screen_id, command).await?;
        self.read_response().await
    }

    /// Flush and shut down the transport
    pub async fn close(mut self) -> Result<(), LedError> {
        info!("Closing controller session");
        self.io.flush().await?;
        self.io.shutdown().await?;
        Ok(())
    }

    async fn next_frame(&mut self) -> Result<Frame, LedError> {
        loop {
            while self.rx.has_remaining() {
                let byte = self.rx.get_u8();
                match self.parser.feed(byte) {
                    Ok(Some(frame)) => {
                        debug!("RX frame {:?}", frame);
                        return Ok(frame);
                    }
                    Ok(None) => {}
                    Err(e) if e.is_frame_error() => warn!("Skipping malformed frame: {}", e),
                    Err(e) => return Err(e),
                }
            }

            let mut buf = [0u8; READ_CHUNK];
            let n = self.io.read(&mut buf).await?;
            if n == 0 {
                return Err(closed());
            }
            debug!("RX {} bytes: {}", n, hex::encode(&buf[..n]));
            self.rx.extend_from_slice(&buf[..n]);
        }
    }
}

fn closed() -> LedError {
    LedError::Io(io::Error::new(io::ErrorKind::UnexpectedEof, "controller closed the stream"))
}
