//! Common test utilities and shared imports

// Allow unused imports and dead code since this is a shared module
// used across multiple test files - not all items are used in every test file
#[allow(unused_imports)]
pub use bytes::Bytes;
#[allow(unused_imports)]
pub use hex;
#[allow(unused_imports)]
pub use ledctl_lib::command::{Command, GIF_PAYLOAD_SIZE, TEXT_PAYLOAD_SIZE};
#[allow(unused_imports)]
pub use ledctl_lib::constants::{EOF, FILENAME_SIZE, FONT_NAME_SIZE, SOF, TEXT_SIZE};
#[allow(unused_imports)]
pub use ledctl_lib::error::LedError;
#[allow(unused_imports)]
pub use ledctl_lib::packet::{CommandType, Frame, FrameParser, decode, encode, xor_checksum};
#[allow(unused_imports)]
pub use ledctl_lib::palette::Rgb;
#[allow(unused_imports)]
pub use ledctl_lib::response::{Response, ResponseCode};

/// Decode hex string to bytes for testing
#[allow(dead_code)]
pub fn hex_to_bytes(hex_data: &str) -> Bytes {
    Bytes::from(hex::decode(hex_data).expect("Failed to decode hex"))
}

/// ClearScreen for screen 1, as written by the bench script
#[allow(dead_code)]
pub const CLEAR_SCREEN_FRAME: &[u8] = &[0xAA, 0x01, 0x03, 0x02, 0x01, 0x03, 0x02, 0x55];

/// SetBrightness(80) for screen 2
#[allow(dead_code)]
pub const BRIGHTNESS_FRAME: &[u8] = &[0xAA, 0x02, 0x04, 0x03, 0x02, 0x04, 0x50, 0x56, 0x55];

/// Offset of the filename field inside a LoadGif payload
#[allow(dead_code)]
pub const GIF_FILENAME_OFFSET: usize = 10;

/// Offsets of the text and font name fields inside a DisplayText payload
#[allow(dead_code)]
pub const TEXT_LENGTH_OFFSET: usize = 10;
#[allow(dead_code)]
pub const TEXT_OFFSET: usize = 11;
#[allow(dead_code)]
pub const FONT_NAME_OFFSET: usize = TEXT_OFFSET + TEXT_SIZE;

/// A DisplayText command with everything but the strings fixed
#[allow(dead_code)]
pub fn text_command(text: &str, font_name: &str) -> Command {
    Command::DisplayText {
        x: 10,
        y: 40,
        font_size: 3,
        color: Rgb::GREEN,
        text: text.to_string(),
        font_name: font_name.to_string(),
    }
}

/// A LoadGif command with everything but the filename fixed
#[allow(dead_code)]
pub fn gif_command(filename: &str) -> Command {
    Command::LoadGif {
        x: 0,
        y: 0,
        width: 96,
        height: 96,
        filename: filename.to_string(),
    }
}
