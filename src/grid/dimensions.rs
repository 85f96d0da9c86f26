//! Grid dimension calculation.

use super::cell::GridSize;

/// Default terminal character aspect ratio (height / width).
/// Terminal characters are typically ~2x taller than wide.
pub const DEFAULT_CHAR_ASPECT_RATIO: f32 = 2.0;

/// Calculate grid dimensions that preserve the frame's aspect ratio.
///
/// With half-block cells every cell holds two vertically stacked samples, so
/// a 2:1 character makes each sample square. The result fits within
/// `max_cols x max_rows`, preferring the full width.
///
/// # Arguments
/// * `img_width` - Width of the source frame in pixels
/// * `img_height` - Height of the source frame in pixels
/// * `max_cols` - Maximum grid width in cells
/// * `max_rows` - Maximum grid height in cells
/// * `char_aspect` - Character aspect ratio (height/width, typically ~2.0)
///
/// # Returns
/// The grid size, or `0x0` when any input is zero.
pub fn fit_grid(
    img_width: u32,
    img_height: u32,
    max_cols: u16,
    max_rows: u16,
    char_aspect: f32,
) -> GridSize {
    if img_width == 0 || img_height == 0 || max_cols == 0 || max_rows == 0 {
        return GridSize::new(0, 0);
    }

    let img_aspect = img_width as f32 / img_height as f32;
    // cols / rows that displays at the image aspect with these characters
    let target_aspect = img_aspect * char_aspect;

    let rows = (max_cols as f32 / target_aspect).round() as u16;
    if rows <= max_rows && rows > 0 {
        return GridSize::new(max_cols, rows);
    }

    // Width-constrained doesn't fit, use the height instead
    let cols = (max_rows as f32 * target_aspect).round() as u16;
    GridSize::new(cols.min(max_cols).max(1), max_rows.max(1))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fit_grid_16_9_width_bound() {
        // 64 / (16/9 * 2) = 18 rows
        let size = fit_grid(1920, 1080, 64, 50, DEFAULT_CHAR_ASPECT_RATIO);
        assert_eq!(size, GridSize::new(64, 18));
    }

    #[test]
    fn test_fit_grid_height_bound() {
        // Tall frame: width-first would need 80 rows
        let size = fit_grid(100, 400, 40, 24, DEFAULT_CHAR_ASPECT_RATIO);
        assert_eq!(size.rows, 24);
        assert_eq!(size.cols, 12);
    }

    #[test]
    fn test_fit_grid_zero_inputs() {
        assert_eq!(fit_grid(0, 10, 80, 24, 2.0), GridSize::new(0, 0));
        assert_eq!(fit_grid(10, 10, 0, 24, 2.0), GridSize::new(0, 0));
    }

    #[test]
    fn test_fit_grid_square_frame() {
        // Square frame with 2:1 characters: rows = cols / 2
        let size = fit_grid(64, 64, 40, 40, DEFAULT_CHAR_ASPECT_RATIO);
        assert_eq!(size, GridSize::new(40, 20));
    }
}
