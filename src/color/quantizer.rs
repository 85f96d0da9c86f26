//! Nearest-palette-color quantization.

use super::distance::squared_distance;
use super::palette::{ColorDepth, Rgb, TermColor, ANSI16, XTERM256};
use crate::cache::{CacheStats, StyleCache};

/// First palette index searched in 256-color mode. Indices 0-15 are the
/// themeable system colors, so only the fixed cube and gray ramp are used.
const XTERM256_FIRST_FIXED: usize = 16;

/// Maps RGB values to the nearest color representable at a color depth.
#[derive(Debug, Clone)]
pub struct Quantizer {
    depth: ColorDepth,
    cache: StyleCache,
}

impl Quantizer {
    /// Create a quantizer with a fresh style cache.
    pub fn new(depth: ColorDepth, cache_enabled: bool) -> Self {
        Self {
            depth,
            cache: StyleCache::new(cache_enabled),
        }
    }

    pub fn depth(&self) -> ColorDepth {
        self.depth
    }

    /// Quantize one color. Truecolor is the identity.
    pub fn quantize(&mut self, rgb: Rgb) -> TermColor {
        let depth = self.depth;
        match depth {
            ColorDepth::TrueColor => TermColor::Rgb(rgb),
            _ => self
                .cache
                .get_or_insert_with(rgb, || nearest(depth, rgb)),
        }
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache.stats()
    }

    /// Forget all memoized lookups.
    pub fn clear_cache(&mut self) {
        self.cache.clear();
    }
}

/// Uncached nearest-color search. Ties go to the lowest palette index.
pub fn nearest(depth: ColorDepth, rgb: Rgb) -> TermColor {
    match depth {
        ColorDepth::TrueColor => TermColor::Rgb(rgb),
        ColorDepth::Ansi16 => TermColor::Indexed(nearest_in(&ANSI16, 0, rgb)),
        ColorDepth::Xterm256 => {
            TermColor::Indexed(nearest_in(&XTERM256, XTERM256_FIRST_FIXED, rgb))
        }
    }
}

fn nearest_in(palette: &[Rgb], first: usize, rgb: Rgb) -> u8 {
    let mut best = first;
    let mut best_dist = u32::MAX;
    for (i, candidate) in palette.iter().enumerate().skip(first) {
        let d = squared_distance(*candidate, rgb);
        // Strict comparison keeps the lowest index on ties.
        if d < best_dist {
            best = i;
            best_dist = d;
            if d == 0 {
                break;
            }
        }
    }
    best as u8
}
