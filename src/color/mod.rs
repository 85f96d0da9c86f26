//! Terminal colors: palettes, distance metrics and quantization.
//!
//! 1. **Palettes** - the 16-color ANSI set and the xterm 256-color set
//! 2. **Distance** - Euclidean RGB or CIE76 ΔE in L\*a\*b\* space
//! 3. **Quantizer** - nearest palette color, memoized through the style cache

mod distance;
mod palette;
mod quantizer;

pub use distance::{rgb_to_lab, squared_distance, DistanceMetric};
pub use palette::{ColorDepth, Rgb, TermColor, ANSI16, XTERM256};
pub use quantizer::{nearest, Quantizer};
