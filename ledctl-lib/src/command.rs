use crate::constants::{
    FILENAME_SIZE, FONT_NAME_SIZE, MAX_BRIGHTNESS, MAX_FONT_SIZE, MAX_POSITION, MIN_FONT_SIZE, PAYLOAD_HEADER_SIZE,
    TEXT_SIZE,
};
use crate::error::LedError;
use crate::packet::{CommandType, Frame};
use crate::palette::Rgb;
use bytes::Bytes;
use num_enum::FromPrimitive;
use serde::{Deserialize, Serialize};
use zerocopy::byteorder::little_endian::U16;
use zerocopy::{FromBytes, Immutable, IntoBytes, KnownLayout, Unaligned};

/// LoadGif payload as laid out on the wire (74 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct GifCommandRaw {
    pub screen_id: u8,
    pub command: u8,
    pub x: U16,      // Left edge, pixels
    pub y: U16,      // Top edge, pixels
    pub width: U16,  // Pixels
    pub height: U16, // Pixels
    pub filename: [u8; FILENAME_SIZE],
}

/// DisplayText payload as laid out on the wire (75 bytes)
#[derive(Debug, Clone, Copy, FromBytes, IntoBytes, KnownLayout, Immutable, Unaligned)]
#[repr(C)]
pub struct TextCommandRaw {
    pub screen_id: u8,
    pub command: u8,
    pub x: U16,
    pub y: U16,
    pub font_size: u8,
    pub color_r: u8,
    pub color_g: u8,
    pub color_b: u8,
    /// Byte length of `text` after truncation, before padding
    pub text_length: u8,
    pub text: [u8; TEXT_SIZE],
    pub font_name: [u8; FONT_NAME_SIZE],
}

pub const GIF_PAYLOAD_SIZE: usize = size_of::<GifCommandRaw>();
pub const TEXT_PAYLOAD_SIZE: usize = size_of::<TextCommandRaw>();
pub const BRIGHTNESS_PAYLOAD_SIZE: usize = PAYLOAD_HEADER_SIZE + 1;

/// A command the host can send to the display controller
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum Command {
    ClearScreen,
    /// Percent, 0-100. Larger values are sent unchanged and left to the controller.
    SetBrightness { level: u8 },
    LoadGif {
        x: u16,
        y: u16,
        width: u16,
        height: u16,
        /// Path on the controller, truncated to 64 bytes on the wire
        filename: String,
    },
    DisplayText {
        x: u16,
        y: u16,
        font_size: u8,
        color: Rgb,
        /// Truncated to 32 bytes on the wire
        text: String,
        /// Empty selects the controller's default font
        font_name: String,
    },
    GetStatus,
}

impl Command {
    pub fn command_type(&self) -> CommandType {
        match self {
            Command::ClearScreen => CommandType::ClearScreen,
            Command::SetBrightness { .. } => CommandType::SetBrightness,
            Command::LoadGif { .. } => CommandType::LoadGif,
            Command::DisplayText { .. } => CommandType::DisplayText,
            Command::GetStatus => CommandType::GetStatus,
        }
    }

    /// Build the payload, starting with `screen_id` and the opcode.
    ///
    /// String fields are truncated and NUL-padded to their fixed width, never rejected.
    pub fn to_payload(&self, screen_id: u8) -> Bytes {
        let command: u8 = self.command_type().into();
        match self {
            Command::ClearScreen | Command::GetStatus => Bytes::copy_from_slice(&[screen_id, command]),
            Command::SetBrightness { level } => Bytes::copy_from_slice(&[screen_id, command, *level]),
            Command::LoadGif {
                x,
                y,
                width,
                height,
                filename,
            } => {
                let raw = GifCommandRaw {
                    screen_id,
                    command,
                    x: U16::new(*x),
                    y: U16::new(*y),
                    width: U16::new(*width),
                    height: U16::new(*height),
                    filename: fixed_field(filename),
                };
                Bytes::copy_from_slice(raw.as_bytes())
            }
            Command::DisplayText {
                x,
                y,
                font_size,
                color,
                text,
                font_name,
            } => {
                let raw = TextCommandRaw {
                    screen_id,
                    command,
                    x: U16::new(*x),
                    y: U16::new(*y),
                    font_size: *font_size,
                    color_r: color.r,
                    color_g: color.g,
                    color_b: color.b,
                    text_length: text.len().min(TEXT_SIZE) as u8,
                    text: fixed_field(text),
                    font_name: fixed_field(font_name),
                };
                Bytes::copy_from_slice(raw.as_bytes())
            }
        }
    }

    /// Build the complete frame addressed to `screen_id`
    pub fn to_frame(&self, screen_id: u8) -> Result<Frame, LedError> {
        Frame::new(screen_id, self.command_type(), self.to_payload(screen_id))
    }

    /// Parse a payload as the controller would, returning the embedded screen id.
    ///
    /// The opcode is taken from the payload itself.
    pub fn from_payload(payload: &[u8]) -> Result<(u8, Command), LedError> {
        match payload {
            [screen_id, opcode, ..] => {
                let command = Self::parse_body(CommandType::from_primitive(*opcode), payload)?;
                Ok((*screen_id, command))
            }
            _ => Err(LedError::Truncated {
                expected: PAYLOAD_HEADER_SIZE,
                actual: payload.len(),
            }),
        }
    }

    fn parse_body(command_type: CommandType, payload: &[u8]) -> Result<Command, LedError> {
        let required = match command_type {
            CommandType::ClearScreen | CommandType::GetStatus => PAYLOAD_HEADER_SIZE,
            CommandType::SetBrightness => BRIGHTNESS_PAYLOAD_SIZE,
            CommandType::LoadGif => GIF_PAYLOAD_SIZE,
            CommandType::DisplayText => TEXT_PAYLOAD_SIZE,
            other => return Err(LedError::UnknownCommand(other.into())),
        };
        if payload.len() < required {
            return Err(LedError::InvalidPayload {
                command: command_type,
                expected: required,
                actual: payload.len(),
            });
        }

        let command = match command_type {
            CommandType::ClearScreen => Command::ClearScreen,
            CommandType::GetStatus => Command::GetStatus,
            CommandType::SetBrightness => Command::SetBrightness { level: payload[2] },
            CommandType::LoadGif => {
                let (raw, _) = GifCommandRaw::read_from_prefix(payload)
                    .map_err(|_| LedError::Protocol("Failed to parse LoadGif payload".to_string()))?;
                Command::LoadGif {
                    x: raw.x.get(),
                    y: raw.y.get(),
                    width: raw.width.get(),
                    height: raw.height.get(),
                    filename: field_to_string(&raw.filename),
                }
            }
            CommandType::DisplayText => {
                let (raw, _) = TextCommandRaw::read_from_prefix(payload)
                    .map_err(|_| LedError::Protocol("Failed to parse DisplayText payload".to_string()))?;
                let text_len = (raw.text_length as usize).min(TEXT_SIZE);
                Command::DisplayText {
                    x: raw.x.get(),
                    y: raw.y.get(),
                    font_size: raw.font_size,
                    color: Rgb::new(raw.color_r, raw.color_g, raw.color_b),
                    text: field_to_string(&raw.text[..text_len]),
                    font_name: field_to_string(&raw.font_name),
                }
            }
            other => return Err(LedError::UnknownCommand(other.into())),
        };
        Ok(command)
    }

    /// Check the command against the limits the controller enforces.
    ///
    /// Payload building never calls this; it is for callers that want to fail early.
    pub fn validate(&self) -> Result<(), LedError> {
        match self {
            Command::ClearScreen | Command::GetStatus => Ok(()),
            Command::SetBrightness { level } if *level > MAX_BRIGHTNESS => Err(LedError::Protocol(format!(
                "Brightness {} is above {}",
                level, MAX_BRIGHTNESS
            ))),
            Command::SetBrightness { .. } => Ok(()),
            Command::LoadGif { x, y, .. } => check_position(*x, *y),
            Command::DisplayText { x, y, font_size, .. } => {
                check_position(*x, *y)?;
                if !(MIN_FONT_SIZE..=MAX_FONT_SIZE).contains(font_size) {
                    return Err(LedError::Protocol(format!(
                        "Font size {} is outside {}-{}",
                        font_size, MIN_FONT_SIZE, MAX_FONT_SIZE
                    )));
                }
                Ok(())
            }
        }
    }
}

impl TryFrom<&Frame> for Command {
    type Error = LedError;

    /// Dispatches on the header opcode, like the controller does.
    ///
    /// Opcodes the host never sends, responses included, are rejected.
    fn try_from(frame: &Frame) -> Result<Self, Self::Error> {
        let command_type = frame.command();
        if !command_type.is_request() {
            return Err(LedError::UnknownCommand(command_type.into()));
        }
        Command::parse_body(command_type, frame.payload())
    }
}

fn check_position(x: u16, y: u16) -> Result<(), LedError> {
    if x >= MAX_POSITION || y >= MAX_POSITION {
        return Err(LedError::Protocol(format!(
            "Position ({}, {}) is outside the {}x{} canvas",
            x, y, MAX_POSITION, MAX_POSITION
        )));
    }
    Ok(())
}

/// Copy `value` into a fixed-width field: truncated to `N` bytes, NUL-padded otherwise
pub fn fixed_field<const N: usize>(value: &str) -> [u8; N] {
    let mut field = [0u8; N];
    let bytes = value.as_bytes();
    let len = bytes.len().min(N);
    field[..len].copy_from_slice(&bytes[..len]);
    field
}

/// Read a NUL-padded field back into a string, stopping at the first NUL
pub fn field_to_string(field: &[u8]) -> String {
    let end = field.iter().position(|&b| b == 0).unwrap_or(field.len());
    String::from_utf8_lossy(&field[..end]).into_owned()
}
