//! Cell and grid types.

use crate::color::{Rgb, TermColor};

/// Glyph used when the two halves of a cell differ.
pub const UPPER_HALF_BLOCK: char = '▀';

/// Glyph used when both halves share a color; the background fills the cell.
pub const FULL_GLYPH: char = ' ';

/// The visual content of a cell, without its position.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct CellStyle {
    pub fg: TermColor,
    pub bg: TermColor,
    pub glyph: char,
}

impl CellStyle {
    /// Build the style showing `top` over `bottom`.
    pub fn from_halves(top: TermColor, bottom: TermColor) -> Self {
        if top == bottom {
            Self {
                fg: bottom,
                bg: bottom,
                glyph: FULL_GLYPH,
            }
        } else {
            Self {
                fg: top,
                bg: bottom,
                glyph: UPPER_HALF_BLOCK,
            }
        }
    }

    /// The colors a viewer sees in the (top, bottom) halves.
    pub fn visible_halves(&self) -> (Rgb, Rgb) {
        let bottom = self.bg.to_rgb();
        if self.glyph == UPPER_HALF_BLOCK {
            (self.fg.to_rgb(), bottom)
        } else {
            (bottom, bottom)
        }
    }
}

impl Default for CellStyle {
    fn default() -> Self {
        Self::from_halves(TermColor::default(), TermColor::default())
    }
}

/// One terminal character position.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Cell {
    pub row: u16,
    pub col: u16,
    pub fg: TermColor,
    pub bg: TermColor,
    pub glyph: char,
}

impl Cell {
    pub fn new(row: u16, col: u16, style: CellStyle) -> Self {
        Self {
            row,
            col,
            fg: style.fg,
            bg: style.bg,
            glyph: style.glyph,
        }
    }

    pub fn style(&self) -> CellStyle {
        CellStyle {
            fg: self.fg,
            bg: self.bg,
            glyph: self.glyph,
        }
    }
}

/// Grid dimensions in terminal cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct GridSize {
    pub cols: u16,
    pub rows: u16,
}

impl GridSize {
    pub fn new(cols: u16, rows: u16) -> Self {
        Self { cols, rows }
    }

    pub fn cell_count(&self) -> usize {
        self.cols as usize * self.rows as usize
    }
}

/// A complete, row-major grid of cells.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Grid {
    size: GridSize,
    cells: Vec<Cell>,
}

impl Grid {
    /// Build a grid from row-major styles. `styles.len()` must equal the cell count.
    pub fn from_styles(size: GridSize, styles: Vec<CellStyle>) -> Self {
        debug_assert_eq!(styles.len(), size.cell_count());
        let cols = size.cols.max(1) as usize;
        let cells = styles
            .into_iter()
            .enumerate()
            .map(|(i, style)| Cell::new((i / cols) as u16, (i % cols) as u16, style))
            .collect();
        Self { size, cells }
    }

    /// A grid with every cell set to the same style.
    pub fn filled(size: GridSize, style: CellStyle) -> Self {
        Self::from_styles(size, vec![style; size.cell_count()])
    }

    pub fn size(&self) -> GridSize {
        self.size
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn get(&self, row: u16, col: u16) -> Option<&Cell> {
        if row >= self.size.rows || col >= self.size.cols {
            return None;
        }
        self.cells
            .get(row as usize * self.size.cols as usize + col as usize)
    }

    pub fn len(&self) -> usize {
        self.cells.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cells.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_style_from_equal_halves() {
        let c = TermColor::Indexed(4);
        let style = CellStyle::from_halves(c, c);
        assert_eq!(style.glyph, FULL_GLYPH);
        assert_eq!(style.bg, c);
        assert_eq!(style.visible_halves(), (c.to_rgb(), c.to_rgb()));
    }

    #[test]
    fn test_style_from_distinct_halves() {
        let top = TermColor::Rgb(Rgb::WHITE);
        let bottom = TermColor::Rgb(Rgb::BLACK);
        let style = CellStyle::from_halves(top, bottom);
        assert_eq!(style.glyph, UPPER_HALF_BLOCK);
        assert_eq!(style.visible_halves(), (Rgb::WHITE, Rgb::BLACK));
    }

    #[test]
    fn test_grid_positions_row_major() {
        let grid = Grid::filled(GridSize::new(3, 2), CellStyle::default());
        assert_eq!(grid.len(), 6);
        let cell = grid.get(1, 2).unwrap();
        assert_eq!((cell.row, cell.col), (1, 2));
        assert!(grid.get(2, 0).is_none());
        assert!(grid.get(0, 3).is_none());
    }

    #[test]
    fn test_cell_style_round_trip() {
        let style = CellStyle::from_halves(TermColor::Indexed(1), TermColor::Indexed(2));
        assert_eq!(Cell::new(0, 0, style).style(), style);
    }
}
