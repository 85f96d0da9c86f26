//! Terminal control sequences.

use std::fmt::Write;

pub const CLEAR_SCREEN: &str = "\x1b[2J";
pub const CURSOR_HOME: &str = "\x1b[H";
pub const HIDE_CURSOR: &str = "\x1b[?25l";
pub const SHOW_CURSOR: &str = "\x1b[?25h";
pub const RESET: &str = "\x1b[0m";

/// Clear the screen, home the cursor and hide it.
pub const SETUP: &str = "\x1b[2J\x1b[H\x1b[?25l";

/// Append a cursor move to the 0-based cell (row, col).
pub fn move_to(out: &mut String, row: u16, col: u16) {
    // Writing to a String cannot fail
    let _ = write!(out, "\x1b[{};{}H", row as u32 + 1, col as u32 + 1);
}

/// Reset attributes, show the cursor and park it below a picture of `rows` rows.
pub fn restore(rows: u16) -> String {
    let mut out = String::from(RESET);
    out.push_str(SHOW_CURSOR);
    move_to(&mut out, rows, 0);
    out
}
