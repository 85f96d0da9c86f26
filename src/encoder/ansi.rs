//! ANSI escape serialization of cell deltas.

use std::fmt::Write;

use crate::color::TermColor;
use crate::diff::CellDelta;
use crate::grid::Cell;

use super::control::{self, RESET};

/// Serializes a [`CellDelta`] to ANSI cursor moves, SGR colors and glyphs.
///
/// Output for one delta assumes nothing about the terminal's cursor or
/// attribute state and always ends with an attribute reset, so any delta's
/// bytes can be written after any other's.
#[derive(Debug, Clone, Copy)]
pub struct AnsiEncoder {
    minimize_escapes: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Layer {
    Foreground,
    Background,
}

impl AnsiEncoder {
    /// With `minimize_escapes`, cursor moves to the position the cursor
    /// already occupies and SGR parameters equal to the current ones are
    /// left out.
    pub fn new(minimize_escapes: bool) -> Self {
        Self { minimize_escapes }
    }

    pub fn minimize_escapes(&self) -> bool {
        self.minimize_escapes
    }

    /// Render a delta. An empty delta renders to nothing.
    pub fn encode(&self, delta: &CellDelta) -> String {
        let mut out = String::new();
        self.encode_into(delta, &mut out);
        out
    }

    /// Append the rendering of `delta` to `out`.
    pub fn encode_into(&self, delta: &CellDelta, out: &mut String) {
        if delta.is_empty() {
            return;
        }
        let mut cursor: Option<(u16, u16)> = None;
        let mut fg: Option<TermColor> = None;
        let mut bg: Option<TermColor> = None;

        for cell in delta.cells() {
            if !self.minimize_escapes || cursor != Some((cell.row, cell.col)) {
                control::move_to(out, cell.row, cell.col);
            }
            self.write_style(out, cell, &mut fg, &mut bg);
            out.push(cell.glyph);
            cursor = Some((cell.row, cell.col.saturating_add(1)));
        }
        out.push_str(RESET);
    }

    fn write_style(
        &self,
        out: &mut String,
        cell: &Cell,
        fg: &mut Option<TermColor>,
        bg: &mut Option<TermColor>,
    ) {
        let fg_changed = !self.minimize_escapes || *fg != Some(cell.fg);
        let bg_changed = !self.minimize_escapes || *bg != Some(cell.bg);
        if !fg_changed && !bg_changed {
            return;
        }

        out.push_str("\x1b[");
        if fg_changed {
            push_sgr_color(out, cell.fg, Layer::Foreground);
        }
        if bg_changed {
            if fg_changed {
                out.push(';');
            }
            push_sgr_color(out, cell.bg, Layer::Background);
        }
        out.push('m');

        *fg = Some(cell.fg);
        *bg = Some(cell.bg);
    }
}

impl Default for AnsiEncoder {
    fn default() -> Self {
        Self::new(true)
    }
}

/// SGR parameters for one color. Indices below 16 use the basic and bright
/// codes, higher indices the 256-color form, RGB the 24-bit form.
fn push_sgr_color(out: &mut String, color: TermColor, layer: Layer) {
    let (base, bright, extended) = match layer {
        Layer::Foreground => (30, 90, 38),
        Layer::Background => (40, 100, 48),
    };
    // Writing to a String cannot fail
    let _ = match color {
        TermColor::Indexed(n) if n < 8 => write!(out, "{}", base + n as u32),
        TermColor::Indexed(n) if n < 16 => write!(out, "{}", bright + (n as u32 - 8)),
        TermColor::Indexed(n) => write!(out, "{extended};5;{n}"),
        TermColor::Rgb(c) => write!(out, "{extended};2;{};{};{}", c.r, c.g, c.b),
    };
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Rgb;
    use crate::grid::{CellStyle, Grid, GridSize, UPPER_HALF_BLOCK};

    fn cell(row: u16, col: u16, fg: TermColor, bg: TermColor) -> Cell {
        Cell::new(
            row,
            col,
            CellStyle {
                fg,
                bg,
                glyph: UPPER_HALF_BLOCK,
            },
        )
    }

    #[test]
    fn test_empty_delta_renders_nothing() {
        assert_eq!(AnsiEncoder::default().encode(&CellDelta::default()), "");
    }

    #[test]
    fn test_truecolor_cell() {
        let delta = CellDelta::new(
            vec![cell(0, 0, TermColor::Rgb(Rgb::new(1, 2, 3)), TermColor::Rgb(Rgb::new(4, 5, 6)))],
            false,
        );
        assert_eq!(
            AnsiEncoder::new(false).encode(&delta),
            "\x1b[1;1H\x1b[38;2;1;2;3;48;2;4;5;6m▀\x1b[0m"
        );
    }

    #[test]
    fn test_indexed_sgr_forms() {
        let mut s = String::new();
        push_sgr_color(&mut s, TermColor::Indexed(1), Layer::Foreground);
        s.push('|');
        push_sgr_color(&mut s, TermColor::Indexed(9), Layer::Background);
        s.push('|');
        push_sgr_color(&mut s, TermColor::Indexed(196), Layer::Foreground);
        assert_eq!(s, "31|101|38;5;196");
    }

    #[test]
    fn test_minimized_run_elides_moves_and_styles() {
        let red = TermColor::Indexed(196);
        let blue = TermColor::Indexed(21);
        let delta = CellDelta::new(
            vec![cell(0, 0, red, blue), cell(0, 1, red, blue), cell(0, 2, blue, blue)],
            false,
        );
        assert_eq!(
            AnsiEncoder::new(true).encode(&delta),
            "\x1b[1;1H\x1b[38;5;196;48;5;21m▀▀\x1b[38;5;21m▀\x1b[0m"
        );
    }

    #[test]
    fn test_minimized_gap_moves_cursor() {
        let c = TermColor::Indexed(2);
        let delta = CellDelta::new(vec![cell(0, 0, c, c), cell(1, 3, c, c)], false);
        assert_eq!(
            AnsiEncoder::new(true).encode(&delta),
            "\x1b[1;1H\x1b[32;42m▀\x1b[2;4H▀\x1b[0m"
        );
    }

    #[test]
    fn test_full_grid_row_major() {
        let grid = Grid::filled(GridSize::new(2, 2), CellStyle::default());
        let out = AnsiEncoder::new(false).encode(&CellDelta::full(&grid));
        let moves: Vec<usize> = ["\x1b[1;1H", "\x1b[1;2H", "\x1b[2;1H", "\x1b[2;2H"]
            .iter()
            .map(|m| out.find(m).unwrap())
            .collect();
        assert!(moves.windows(2).all(|w| w[0] < w[1]));
    }
}
