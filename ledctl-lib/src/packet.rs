//! Frame encoding and decoding for the display controller's serial link.
//!
//! Frame format:
//! - SOF (1 byte): 0xAA
//! - SCREEN (1 byte): target screen id
//! - COMMAND (1 byte): opcode
//! - LENGTH (1 byte): payload length (0-255)
//! - PAYLOAD (0-255 bytes): command-specific data, itself starting with SCREEN and COMMAND
//! - CHECKSUM (1 byte): XOR of the PAYLOAD bytes only
//! - EOF (1 byte): 0x55

use crate::constants::{EOF, FRAME_HEADER_SIZE, MAX_PAYLOAD_SIZE, MIN_FRAME_SIZE, SOF};
use crate::error::LedError;
use bytes::{BufMut, Bytes, BytesMut};
use num_enum::{FromPrimitive, IntoPrimitive};
use serde::{Deserialize, Serialize};
use strum_macros::Display;
use tracing::{trace, warn};

/// Command opcodes carried in the frame header and repeated in the payload.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Display, IntoPrimitive, FromPrimitive, Serialize, Deserialize)]
#[repr(u8)]
pub enum CommandType {
    LoadGif = 0x01,
    DisplayText = 0x02,
    ClearScreen = 0x03,
    SetBrightness = 0x04,
    GetStatus = 0x05,
    /// Sent by the controller, never by the host
    Response = 0x80,

    #[num_enum(catch_all)]
    Unknown(u8),
}

impl CommandType {
    /// Whether the host is allowed to send this opcode
    pub fn is_request(&self) -> bool {
        matches!(
            self,
            CommandType::LoadGif
                | CommandType::DisplayText
                | CommandType::ClearScreen
                | CommandType::SetBrightness
                | CommandType::GetStatus
        )
    }
}

/// XOR-fold of every byte in `data`.
pub fn xor_checksum(data: &[u8]) -> u8 {
    data.iter().fold(0, |acc, byte| acc ^ byte)
}

/// A validated frame. The payload is guaranteed to fit the single length byte.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Frame {
    screen_id: u8,
    command: CommandType,
    payload: Bytes,
}

impl Frame {
    /// Create a new frame, rejecting payloads longer than 255 bytes
    pub fn new(screen_id: u8, command: impl Into<CommandType>, payload: impl Into<Bytes>) -> Result<Self, LedError> {
        let payload = payload.into();
        if payload.len() > MAX_PAYLOAD_SIZE {
            return Err(LedError::PayloadTooLarge { len: payload.len() });
        }
        Ok(Self {
            screen_id,
            command: command.into(),
            payload,
        })
    }

    pub fn screen_id(&self) -> u8 {
        self.screen_id
    }

    pub fn command(&self) -> CommandType {
        self.command
    }

    pub fn payload(&self) -> &Bytes {
        &self.payload
    }

    pub fn checksum(&self) -> u8 {
        xor_checksum(&self.payload)
    }

    /// Size of the frame on the wire
    pub fn encoded_len(&self) -> usize {
        MIN_FRAME_SIZE + self.payload.len()
    }

    /// Serialize the frame, header and trailer included
    pub fn to_bytes(&self) -> Bytes {
        let mut buf = BytesMut::with_capacity(self.encoded_len());
        buf.put_u8(SOF);
        buf.put_u8(self.screen_id);
        buf.put_u8(self.command.into());
        // Frame::new guarantees the length fits
        buf.put_u8(self.payload.len() as u8);
        buf.put_slice(&self.payload);
        buf.put_u8(self.checksum());
        buf.put_u8(EOF);
        buf.freeze()
    }
}

impl From<Frame> for Bytes {
    fn from(frame: Frame) -> Self {
        frame.to_bytes()
    }
}

impl TryFrom<&[u8]> for Frame {
    type Error = LedError;

    fn try_from(bytes: &[u8]) -> Result<Self, Self::Error> {
        decode(bytes)
    }
}

impl TryFrom<Bytes> for Frame {
    type Error = LedError;

    fn try_from(bytes: Bytes) -> Result<Self, Self::Error> {
        decode(&bytes)
    }
}

/// Frame `payload` for `screen_id` under the raw opcode `command`.
///
/// Fails before producing any byte if the payload does not fit the length field.
pub fn encode(screen_id: u8, command: u8, payload: &[u8]) -> Result<Bytes, LedError> {
    let frame = Frame::new(screen_id, command, Bytes::copy_from_slice(payload))?;
    Ok(frame.to_bytes())
}

/// Validate and parse one complete frame.
///
/// `bytes` must hold exactly one frame: SOF first and EOF last.
pub fn decode(bytes: &[u8]) -> Result<Frame, LedError> {
    let first = bytes.first().copied();
    if first != Some(SOF) {
        return Err(LedError::BadStartMarker { found: first });
    }

    // first byte exists, so last does too
    let last = bytes[bytes.len() - 1];
    if bytes.len() < 2 || last != EOF {
        return Err(LedError::BadEndMarker { found: last });
    }

    // Too short to hold a checksum: no payload byte fits, whatever the header says
    if bytes.len() < MIN_FRAME_SIZE {
        let declared = if bytes.len() > FRAME_HEADER_SIZE { bytes[3] as usize } else { 0 };
        return Err(LedError::LengthMismatch { declared, actual: 0 });
    }

    let screen_id = bytes[1];
    let command = CommandType::from_primitive(bytes[2]);
    let declared = bytes[3] as usize;
    let actual = bytes.len() - MIN_FRAME_SIZE;
    if declared != actual {
        return Err(LedError::LengthMismatch { declared, actual });
    }

    let payload = &bytes[FRAME_HEADER_SIZE..FRAME_HEADER_SIZE + actual];
    let received = bytes[FRAME_HEADER_SIZE + actual];
    let expected = xor_checksum(payload);
    if received != expected {
        return Err(LedError::ChecksumMismatch {
            expected,
            actual: received,
        });
    }

    Ok(Frame {
        screen_id,
        command,
        payload: Bytes::copy_from_slice(payload),
    })
}

/// State machine for pulling frames out of an unframed byte stream
#[derive(Debug, Clone)]
pub struct FrameParser {
    state: ParseState,
    screen_id: u8,
    command: u8,
    expected_length: usize,
    payload: BytesMut,
    checksum: u8,
    skipped: usize,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum ParseState {
    WaitingForStart,
    WaitingForScreen,
    WaitingForCommand,
    WaitingForLength,
    ReadingPayload,
    WaitingForChecksum,
    WaitingForEnd,
}

impl Default for FrameParser {
    fn default() -> Self {
        Self::new()
    }
}

impl FrameParser {
    pub fn new() -> Self {
        Self {
            state: ParseState::WaitingForStart,
            screen_id: 0,
            command: 0,
            expected_length: 0,
            payload: BytesMut::with_capacity(MAX_PAYLOAD_SIZE),
            checksum: 0,
            skipped: 0,
        }
    }

    /// Drop any partially received frame
    pub fn reset(&mut self) {
        self.state = ParseState::WaitingForStart;
        self.screen_id = 0;
        self.command = 0;
        self.expected_length = 0;
        self.payload.clear();
        self.checksum = 0;
    }

    /// Bytes discarded so far while hunting for a start marker
    pub fn skipped(&self) -> usize {
        self.skipped
    }

    /// True when no frame is partially buffered
    pub fn is_idle(&self) -> bool {
        self.state == ParseState::WaitingForStart
    }

    /// Feed a single byte.
    ///
    /// Returns `Ok(Some(frame))` when a frame completes, `Ok(None)` when more
    /// bytes are needed, or the frame error; after an error the parser is
    /// already hunting for the next start marker.
    pub fn feed(&mut self, byte: u8) -> Result<Option<Frame>, LedError> {
        match self.state {
            ParseState::WaitingForStart => {
                if byte == SOF {
                    self.state = ParseState::WaitingForScreen;
                } else {
                    self.skipped += 1;
                    trace!("Skipping {:#04x} outside of a frame", byte);
                }
                Ok(None)
            }
            ParseState::WaitingForScreen => {
                self.screen_id = byte;
                self.state = ParseState::WaitingForCommand;
                Ok(None)
            }
            ParseState::WaitingForCommand => {
                self.command = byte;
                self.state = ParseState::WaitingForLength;
                Ok(None)
            }
            ParseState::WaitingForLength => {
                self.expected_length = byte as usize;
                self.payload.clear();
                self.state = if self.expected_length == 0 {
                    ParseState::WaitingForChecksum
                } else {
                    ParseState::ReadingPayload
                };
                Ok(None)
            }
            ParseState::ReadingPayload => {
                self.payload.put_u8(byte);
                if self.payload.len() == self.expected_length {
                    self.state = ParseState::WaitingForChecksum;
                }
                Ok(None)
            }
            ParseState::WaitingForChecksum => {
                self.checksum = byte;
                self.state = ParseState::WaitingForEnd;
                Ok(None)
            }
            ParseState::WaitingForEnd => {
                let result = self.finish(byte);
                self.reset();
                if let Err(ref e) = result {
                    warn!("Dropping malformed frame: {}", e);
                }
                result.map(Some)
            }
        }
    }

    /// Feed a slice, collecting every completed frame and every frame error in order
    pub fn feed_bytes(&mut self, bytes: &[u8]) -> Vec<Result<Frame, LedError>> {
        bytes.iter().filter_map(|&byte| self.feed(byte).transpose()).collect()
    }

    fn finish(&mut self, end: u8) -> Result<Frame, LedError> {
        if end != EOF {
            return Err(LedError::BadEndMarker { found: end });
        }
        let expected = xor_checksum(&self.payload);
        if self.checksum != expected {
            return Err(LedError::ChecksumMismatch {
                expected,
                actual: self.checksum,
            });
        }
        Ok(Frame {
            screen_id: self.screen_id,
            command: CommandType::from_primitive(self.command),
            payload: self.payload.split().freeze(),
        })
    }
}
