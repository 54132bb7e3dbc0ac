// Protocol constants for the LED-matrix display controller

/// Start-of-frame marker
pub const SOF: u8 = 0xAA;

/// End-of-frame marker
pub const EOF: u8 = 0x55;

/// SOF + screen_id + command + payload_length
pub const FRAME_HEADER_SIZE: usize = 4;

/// checksum + EOF
pub const FRAME_TRAILER_SIZE: usize = 2;

/// Smallest possible frame (empty payload)
pub const MIN_FRAME_SIZE: usize = FRAME_HEADER_SIZE + FRAME_TRAILER_SIZE;

/// Payload length is carried in a single byte
pub const MAX_PAYLOAD_SIZE: usize = u8::MAX as usize;

/// Largest possible frame
pub const MAX_FRAME_SIZE: usize = MIN_FRAME_SIZE + MAX_PAYLOAD_SIZE;

/// screen_id + command, repeated at the start of every payload
pub const PAYLOAD_HEADER_SIZE: usize = 2;

/// Width of the LoadGif filename field
pub const FILENAME_SIZE: usize = 64;

/// Width of the DisplayText text field
pub const TEXT_SIZE: usize = 32;

/// Width of the DisplayText font name field
pub const FONT_NAME_SIZE: usize = 32;

/// Brightness accepted by the controller, in percent
pub const MAX_BRIGHTNESS: u8 = 100;

/// Font sizes accepted by the controller
pub const MIN_FONT_SIZE: u8 = 1;
pub const MAX_FONT_SIZE: u8 = 8;

/// Controller rejects element positions at or beyond this coordinate
pub const MAX_POSITION: u16 = 192;

/// Response payload prefix: screen_id, command, response_code, data_length
pub const RESPONSE_HEADER_SIZE: usize = 4;

/// Line rate used by the deployed controllers
pub const DEFAULT_BAUD_RATE: u32 = 1_000_000;

/// Port the bench scripts talk to (cross-connected with the viewer's port)
pub const DEFAULT_PORT: &str = "/dev/ttyUSB1";
