use crate::packet::CommandType;
use std::io;
use thiserror::Error;

/// The primary error type for the `ledctl` library.
#[derive(Error, Debug)]
pub enum LedError {
    #[error("Payload too large: {len} bytes (maximum is 255)")]
    PayloadTooLarge { len: usize },

    #[error("Bad start marker: expected 0xAA, got {}", fmt_marker(.found))]
    BadStartMarker { found: Option<u8> },

    #[error("Bad end marker: expected 0x55, got {found:#04x}")]
    BadEndMarker { found: u8 },

    #[error("Length mismatch: header declares {declared} payload bytes, frame carries {actual}")]
    LengthMismatch { declared: usize, actual: usize },

    #[error("Checksum mismatch: frame carries {actual:#04x}, payload folds to {expected:#04x}")]
    ChecksumMismatch { expected: u8, actual: u8 },

    #[error("Truncated frame: expected at least {expected} bytes, got {actual}")]
    Truncated { expected: usize, actual: usize },

    #[error("Invalid {command} payload: expected at least {expected} bytes, got {actual}")]
    InvalidPayload {
        command: CommandType,
        expected: usize,
        actual: usize,
    },

    #[error("Unknown command opcode {0:#04x}")]
    UnknownCommand(u8),

    #[error("I/O error: {0}")]
    Io(#[from] io::Error),

    #[error("Serial port error: {0}")]
    Serial(#[from] tokio_serial::Error),

    #[error("Timeout waiting for the controller: {0}")]
    Timeout(#[from] tokio::time::error::Elapsed),

    #[error("Protocol error: {0}")]
    Protocol(String),
}

impl LedError {
    /// True for errors produced while validating an inbound frame.
    ///
    /// These leave the stream usable: the next start marker may begin a good frame.
    pub fn is_frame_error(&self) -> bool {
        matches!(
            self,
            LedError::BadStartMarker { .. }
                | LedError::BadEndMarker { .. }
                | LedError::LengthMismatch { .. }
                | LedError::ChecksumMismatch { .. }
                | LedError::Truncated { .. }
        )
    }
}

fn fmt_marker(found: &Option<u8>) -> String {
    match found {
        Some(byte) => format!("{byte:#04x}"),
        None => "end of input".to_string(),
    }
}
