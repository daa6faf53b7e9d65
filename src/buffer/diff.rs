//! Diffing Engine: Generate minimal ANSI sequences from buffer changes.
//!
//! 1. Compare the buffer on screen with the buffer just drawn
//! 2. Emit escape sequences only for the cells that changed
//! 3. Skip cursor moves between adjacent cells
//! 4. Only switch colours when the colour pair changes
//!
//! All output is accumulated in one [`OutputBuffer`] and written at once.

use super::{Buffer, Cell, CellFlags};
use crate::terminal::{ColourPairs, OutputBuffer};

/// State tracker for the diffing algorithm.
///
/// Tracks what the terminal currently has selected (cursor position and
/// colour pair) so redundant sequences can be skipped.
#[derive(Debug, Clone)]
pub struct DiffState {
    /// Last known cursor X position (0-indexed).
    cursor_x: u16,
    /// Last known cursor Y position (0-indexed).
    cursor_y: u16,
    /// Last emitted colour pair.
    pair: Option<u16>,
}

impl Default for DiffState {
    fn default() -> Self {
        Self::new()
    }
}

impl DiffState {
    /// Create a new diff state with the cursor at home.
    pub const fn new() -> Self {
        Self {
            cursor_x: 0,
            cursor_y: 0,
            pair: None,
        }
    }

    /// Forget everything (e.g., after a full screen clear).
    pub const fn reset(&mut self) {
        self.pair = None;
        // Force cursor move on next write
        self.cursor_x = u16::MAX;
        self.cursor_y = u16::MAX;
    }
}

/// Result of a diff operation.
#[derive(Debug, Clone, Default)]
pub struct DiffResult {
    /// Number of cells that were different.
    pub cells_changed: usize,
    /// Number of cursor move sequences emitted.
    pub cursor_moves: usize,
    /// Number of colour change sequences emitted.
    pub colour_changes: usize,
}

/// Render the difference between two buffers.
///
/// `current` is what the terminal shows, `next` is what it should show.
/// Both must have the same dimensions.
pub fn render_diff(
    current: &Buffer,
    next: &Buffer,
    pairs: &ColourPairs,
    output: &mut OutputBuffer,
    state: &mut DiffState,
) -> DiffResult {
    debug_assert_eq!(current.width(), next.width());
    debug_assert_eq!(current.height(), next.height());

    let mut result = DiffResult::default();
    let width = next.width();

    for y in 0..next.height() {
        for x in 0..width {
            let idx = (y as usize) * (width as usize) + (x as usize);
            let current_cell = &current.cells()[idx];
            let next_cell = &next.cells()[idx];

            if current_cell == next_cell {
                continue;
            }

            // Continuation cells are painted by the wide cell before them
            if next_cell.is_wide_continuation() {
                continue;
            }

            result.cells_changed += 1;

            if state.cursor_y != y || state.cursor_x != x {
                output.cursor_move(x, y);
                state.cursor_x = x;
                state.cursor_y = y;
                result.cursor_moves += 1;
            }

            if state.pair != Some(next_cell.pair()) {
                let (fg, bg) = pairs.colours(next_cell.pair());
                output.set_colours(fg, bg);
                state.pair = Some(next_cell.pair());
                result.colour_changes += 1;
            }

            emit_grapheme(output, next_cell, next);

            let advance = u16::from(next_cell.display_width().max(1));
            state.cursor_x = state.cursor_x.saturating_add(advance);
        }
    }

    result
}

/// Generate a full redraw sequence (no diffing).
///
/// Used for the first frame and after a resize, when what the terminal
/// shows is unknown.
pub fn render_full(
    buffer: &Buffer,
    pairs: &ColourPairs,
    output: &mut OutputBuffer,
    state: &mut DiffState,
) {
    output.cursor_hide();
    output.reset_attrs();
    output.clear_screen();
    output.cursor_move(0, 0);

    let mut last_pair: Option<u16> = None;

    for y in 0..buffer.height() {
        if y > 0 {
            output.cursor_move(0, y);
        }

        for x in 0..buffer.width() {
            let Some(cell) = buffer.get(x, y) else {
                continue;
            };

            if cell.is_wide_continuation() {
                continue;
            }

            if last_pair != Some(cell.pair()) {
                let (fg, bg) = pairs.colours(cell.pair());
                output.set_colours(fg, bg);
                last_pair = Some(cell.pair());
            }

            emit_grapheme(output, cell, buffer);
        }
    }

    output.reset_attrs();
    state.reset();
}

/// Emit a grapheme to the output buffer.
#[inline]
fn emit_grapheme(output: &mut OutputBuffer, cell: &Cell, buffer: &Buffer) {
    if cell.flags().contains(CellFlags::OVERFLOW) {
        if let Some(idx) = cell.overflow_index()
            && let Some(grapheme) = buffer.get_overflow(idx)
        {
            output.write_str(grapheme);
            return;
        }
        output.write_str("\u{fffd}");
    } else if let Some(grapheme) = cell.grapheme() {
        output.write_str(grapheme);
    } else {
        output.write_raw(b" ");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::terminal::Colour;

    #[test]
    fn test_diff_identical_buffers() {
        let a = Buffer::new(10, 5);
        let b = Buffer::new(10, 5);
        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();

        let result = render_diff(&a, &b, &ColourPairs::new(64), &mut output, &mut state);

        assert_eq!(result.cells_changed, 0);
        assert!(output.is_empty());
    }

    #[test]
    fn test_diff_single_cell_change() {
        let a = Buffer::new(10, 5);
        let mut b = Buffer::new(10, 5);
        b.set(5, 2, Cell::new('X'));

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();
        let result = render_diff(&a, &b, &ColourPairs::new(64), &mut output, &mut state);

        assert_eq!(result.cells_changed, 1);
        assert_eq!(result.cursor_moves, 1);
        let text = String::from_utf8_lossy(output.as_bytes());
        assert!(text.starts_with("\x1b[3;6H"));
        assert!(text.ends_with('X'));
    }

    #[test]
    fn test_diff_adjacent_cells_no_cursor_move() {
        let a = Buffer::new(10, 5);
        let mut b = Buffer::new(10, 5);
        b.set(0, 0, Cell::new('A'));
        b.set(1, 0, Cell::new('B'));
        b.set(2, 0, Cell::new('C'));

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();
        let result = render_diff(&a, &b, &ColourPairs::new(64), &mut output, &mut state);

        assert_eq!(result.cells_changed, 3);
        assert_eq!(result.cursor_moves, 0);
    }

    #[test]
    fn test_diff_colour_tracking() {
        let mut pairs = ColourPairs::new(64);
        let red = pairs.slot(Colour::Red, Colour::Default).unwrap();

        let a = Buffer::new(10, 5);
        let mut b = Buffer::new(10, 5);
        b.set(0, 0, Cell::new('A').with_pair(red));
        b.set(1, 0, Cell::new('B').with_pair(red));
        b.set(2, 0, Cell::new('C'));

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();
        let result = render_diff(&a, &b, &pairs, &mut output, &mut state);

        // One switch to red, one back to the default pair
        assert_eq!(result.colour_changes, 2);
        let text = String::from_utf8_lossy(output.as_bytes());
        assert!(text.contains("\x1b[31;49mAB"));
        assert!(text.contains("\x1b[39;49mC"));
    }

    #[test]
    fn test_diff_reset_forces_cursor_move() {
        let a = Buffer::new(4, 1);
        let mut b = Buffer::new(4, 1);
        b.set(0, 0, Cell::new('A'));

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();
        state.reset();
        let result = render_diff(&a, &b, &ColourPairs::new(64), &mut output, &mut state);

        assert_eq!(result.cursor_moves, 1);
        assert_eq!(result.colour_changes, 1);
    }

    #[test]
    fn test_render_full() {
        let mut buffer = Buffer::new(3, 2);
        buffer.set(0, 0, Cell::new('A'));
        buffer.set(1, 0, Cell::new('B'));
        buffer.set(2, 1, Cell::new('C'));

        let mut output = OutputBuffer::new();
        let mut state = DiffState::new();
        render_full(&buffer, &ColourPairs::new(64), &mut output, &mut state);

        let text = String::from_utf8_lossy(output.as_bytes());
        assert!(text.starts_with("\x1b[?25l\x1b[0m\x1b[2J\x1b[H"));
        assert!(text.contains("AB "));
        assert!(text.contains("\x1b[2H  C"));
        assert!(text.ends_with("\x1b[0m"));
    }
}
