//! Terminal cell grids and the frame-to-grid sampler.
//!
//! Each cell covers one column and two stacked pixel samples: the upper half
//! block glyph `▀` shows the top sample in the foreground color and the bottom
//! sample in the background color, doubling the vertical resolution.

mod cell;
mod dimensions;
mod sampler;

pub use cell::{Cell, CellStyle, Grid, GridSize, FULL_GLYPH, UPPER_HALF_BLOCK};
pub use dimensions::{fit_grid, DEFAULT_CHAR_ASPECT_RATIO};
pub use sampler::CellSampler;
