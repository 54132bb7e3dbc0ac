pub mod command;
pub mod constants;
pub mod device;
pub mod error;
pub mod packet;
pub mod palette;
pub mod response;

#[cfg(test)]
mod tests;

// Re-export the common entry points for easy access
pub use command::Command;
pub use device::{Controller, DeviceConfig};
pub use error::LedError;
pub use packet::{CommandType, Frame, FrameParser, decode, encode};
pub use palette::Rgb;
pub use response::{Response, ResponseCode};
