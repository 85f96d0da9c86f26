//! Frame to cell-grid downsampling.

use crate::cache::{CacheStats, PositionCache};
use crate::color::{ColorDepth, Quantizer, Rgb};
use crate::frame::{Frame, BYTES_PER_PIXEL};

use super::cell::{CellStyle, Grid, GridSize};

/// Downsamples frames into complete grids of half-block cells.
///
/// Every cell covers a rectangle of the frame split into a top and a bottom
/// half. Each half is reduced to the mean color of its pixels, quantized to
/// the session color depth, and combined into a [`CellStyle`]. The resolved
/// style for a (top, bottom) pair is memoized in the position cache.
#[derive(Debug, Clone)]
pub struct CellSampler {
    size: GridSize,
    quantizer: Quantizer,
    positions: PositionCache,
}

impl CellSampler {
    pub fn new(size: GridSize, quantizer: Quantizer, position_cache_enabled: bool) -> Self {
        Self {
            size,
            quantizer,
            positions: PositionCache::new(position_cache_enabled),
        }
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn depth(&self) -> ColorDepth {
        self.quantizer.depth()
    }

    /// Sample a frame into a grid with every cell populated.
    pub fn sample(&mut self, frame: &Frame) -> Grid {
        let cols = self.size.cols as usize;
        let sub_rows = self.size.rows as usize * 2;
        let x_spans = spans(frame.width(), cols);
        let y_spans = spans(frame.height(), sub_rows);

        let mut styles = Vec::with_capacity(self.size.cell_count());
        for pair in y_spans.chunks_exact(2) {
            for &x_span in &x_spans {
                let top = region_mean(frame, x_span, pair[0]);
                let bottom = region_mean(frame, x_span, pair[1]);
                styles.push(self.resolve(top, bottom));
            }
        }
        Grid::from_styles(self.size, styles)
    }

    fn resolve(&mut self, top: Rgb, bottom: Rgb) -> CellStyle {
        let quantizer = &mut self.quantizer;
        self.positions.get_or_insert_with((top, bottom), || {
            CellStyle::from_halves(quantizer.quantize(top), quantizer.quantize(bottom))
        })
    }

    pub fn style_cache_stats(&self) -> CacheStats {
        self.quantizer.cache_stats()
    }

    pub fn position_cache_stats(&self) -> CacheStats {
        self.positions.stats()
    }

    /// Clear both caches, as at the start of a session.
    pub fn clear_caches(&mut self) {
        self.quantizer.clear_cache();
        self.positions.clear();
    }
}

/// Split `pixels` into `parts` half-open ranges covering it in order.
/// When there are more parts than pixels, a part takes its nearest pixel.
fn spans(pixels: u32, parts: usize) -> Vec<(u32, u32)> {
    let pixels = pixels as u64;
    let parts_u = parts.max(1) as u64;
    (0..parts as u64)
        .map(|i| {
            let start = (i * pixels / parts_u).min(pixels.saturating_sub(1));
            let end = ((i + 1) * pixels / parts_u).max(start + 1).min(pixels);
            (start as u32, end as u32)
        })
        .collect()
}

fn region_mean(frame: &Frame, (x0, x1): (u32, u32), (y0, y1): (u32, u32)) -> Rgb {
    let data = frame.data();
    let stride = frame.width() as usize * BYTES_PER_PIXEL;
    let mut sum = [0u64; 3];
    let mut count = 0u64;

    for y in y0..y1 {
        let row = y as usize * stride;
        for x in x0..x1 {
            let idx = row + x as usize * BYTES_PER_PIXEL;
            sum[0] += data[idx] as u64;
            sum[1] += data[idx + 1] as u64;
            sum[2] += data[idx + 2] as u64;
            count += 1;
        }
    }

    if count == 0 {
        return Rgb::BLACK;
    }
    let half = count / 2;
    Rgb::new(
        ((sum[0] + half) / count) as u8,
        ((sum[1] + half) / count) as u8,
        ((sum[2] + half) / count) as u8,
    )
}
