//! RGB colours and the controller's 8-bit palette.
//!
//! The wire format always carries full RGB. The palette index is a receiver-side
//! convenience for drawing text with an indexed colour.

use crate::error::LedError;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);
    pub const RED: Rgb = Rgb::new(255, 0, 0);
    pub const GREEN: Rgb = Rgb::new(0, 255, 0);
    pub const BLUE: Rgb = Rgb::new(0, 0, 255);
    pub const YELLOW: Rgb = Rgb::new(255, 255, 0);
    pub const CYAN: Rgb = Rgb::new(0, 255, 255);
    pub const MAGENTA: Rgb = Rgb::new(255, 0, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }

    /// Nearest entry in the controller's 256-colour palette
    pub fn palette_index(&self) -> u8 {
        rgb_to_index(self.r, self.g, self.b)
    }
}

impl fmt::Display for Rgb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
    }
}

/// Parses `RRGGBB`, with or without a leading `#`
impl FromStr for Rgb {
    type Err = LedError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let digits = s.strip_prefix('#').unwrap_or(s);
        let bytes = hex::decode(digits).map_err(|e| LedError::Protocol(format!("Invalid colour '{}': {}", s, e)))?;
        match bytes.as_slice() {
            [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
            _ => Err(LedError::Protocol(format!("Invalid colour '{}': expected RRGGBB", s))),
        }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Rgb::new(r, g, b)
    }
}

/// Named colours with a dedicated slot in the low palette range
const NAMED: [(Rgb, u8); 8] = [
    (Rgb::BLACK, 0),
    (Rgb::RED, 1),
    (Rgb::GREEN, 2),
    (Rgb::YELLOW, 3),
    (Rgb::BLUE, 4),
    (Rgb::MAGENTA, 5),
    (Rgb::CYAN, 6),
    (Rgb::WHITE, 255),
];

/// Width of one quantisation bucket per channel
const BUCKET: u8 = 51;

/// First index of the 6x6x6 colour cube
const CUBE_OFFSET: u8 = 16;

/// Map an RGB triple onto the 8-bit palette.
///
/// Exact named colours use their fixed slot; everything else lands in the
/// 6x6x6 cube starting at index 16.
pub fn rgb_to_index(r: u8, g: u8, b: u8) -> u8 {
    let colour = Rgb::new(r, g, b);
    if let Some((_, index)) = NAMED.iter().find(|(named, _)| *named == colour) {
        return *index;
    }
    // each channel quantises to 0..=5, so the cube tops out at 16 + 215
    CUBE_OFFSET + 36 * (r / BUCKET) + 6 * (g / BUCKET) + b / BUCKET
}
