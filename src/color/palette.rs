//! Color values and fixed terminal palettes.

use serde::Deserialize;
use std::fmt;
use std::str::FromStr;

/// A 24-bit RGB color.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);
    pub const WHITE: Rgb = Rgb::new(255, 255, 255);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

/// How many colors the output terminal can show.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Deserialize)]
pub enum ColorDepth {
    /// The 16 standard ANSI colors
    #[serde(rename = "16")]
    Ansi16,
    /// The xterm 256-color palette
    #[serde(rename = "256")]
    Xterm256,
    /// 24-bit color, no quantization
    #[default]
    #[serde(rename = "truecolor")]
    TrueColor,
}

impl ColorDepth {
    pub fn name(&self) -> &'static str {
        match self {
            ColorDepth::Ansi16 => "16",
            ColorDepth::Xterm256 => "256",
            ColorDepth::TrueColor => "truecolor",
        }
    }
}

impl fmt::Display for ColorDepth {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ColorDepth {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "16" | "ansi" | "ansi16" => Ok(ColorDepth::Ansi16),
            "256" | "xterm256" => Ok(ColorDepth::Xterm256),
            "truecolor" | "24bit" | "rgb" => Ok(ColorDepth::TrueColor),
            other => Err(format!(
                "unknown color depth '{}'. Expected one of: 16, 256, truecolor",
                other
            )),
        }
    }
}

/// A color as the terminal receives it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum TermColor {
    /// Palette index (0-15 in 16-color mode, 16-255 in 256-color mode)
    Indexed(u8),
    /// Direct 24-bit color
    Rgb(Rgb),
}

impl TermColor {
    /// The RGB value this color is displayed as.
    pub fn to_rgb(self) -> Rgb {
        match self {
            TermColor::Indexed(i) => XTERM256[i as usize],
            TermColor::Rgb(rgb) => rgb,
        }
    }
}

impl Default for TermColor {
    fn default() -> Self {
        TermColor::Rgb(Rgb::BLACK)
    }
}

/// xterm's default values for the 16 standard colors.
pub const ANSI16: [Rgb; 16] = [
    Rgb::new(0, 0, 0),
    Rgb::new(205, 0, 0),
    Rgb::new(0, 205, 0),
    Rgb::new(205, 205, 0),
    Rgb::new(0, 0, 238),
    Rgb::new(205, 0, 205),
    Rgb::new(0, 205, 205),
    Rgb::new(229, 229, 229),
    Rgb::new(127, 127, 127),
    Rgb::new(255, 0, 0),
    Rgb::new(0, 255, 0),
    Rgb::new(255, 255, 0),
    Rgb::new(92, 92, 255),
    Rgb::new(255, 0, 255),
    Rgb::new(0, 255, 255),
    Rgb::new(255, 255, 255),
];

/// Channel levels of the 6x6x6 color cube.
const CUBE_LEVELS: [u8; 6] = [0, 95, 135, 175, 215, 255];

/// The full xterm 256-color palette: 16 standard colors, the 6x6x6 cube at
/// 16-231 and a 24-step gray ramp at 232-255.
pub const XTERM256: [Rgb; 256] = build_xterm256();

const fn build_xterm256() -> [Rgb; 256] {
    let mut table = [Rgb::new(0, 0, 0); 256];
    let mut i = 0;
    while i < 16 {
        table[i] = ANSI16[i];
        i += 1;
    }
    let mut r = 0;
    while r < 6 {
        let mut g = 0;
        while g < 6 {
            let mut b = 0;
            while b < 6 {
                table[16 + r * 36 + g * 6 + b] =
                    Rgb::new(CUBE_LEVELS[r], CUBE_LEVELS[g], CUBE_LEVELS[b]);
                b += 1;
            }
            g += 1;
        }
        r += 1;
    }
    let mut step = 0;
    while step < 24 {
        let v = (8 + step * 10) as u8;
        table[232 + step] = Rgb::new(v, v, v);
        step += 1;
    }
    table
}
