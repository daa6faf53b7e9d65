//! Label Widget: a block of text at a fixed position.

use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::scene::{Behavior, NodeCore};
use crate::terminal::{Colour, Surface};

/// Static text, possibly spanning several lines.
#[derive(Debug, Clone, Default)]
pub struct Label {
    /// Text to draw. Newlines start a new row at the same column.
    text: String,
    /// Top-left corner (column, row).
    position: (u16, u16),
    /// Foreground colour.
    fg: Colour,
    /// Background colour.
    bg: Colour,
}

impl Label {
    /// Create a label at the origin in the default colours.
    pub fn new(text: impl Into<String>) -> Self {
        Self {
            text: text.into(),
            ..Self::default()
        }
    }

    /// Place the label.
    #[must_use]
    pub const fn at(mut self, x: u16, y: u16) -> Self {
        self.position = (x, y);
        self
    }

    /// Set the colours.
    #[must_use]
    pub const fn with_colours(mut self, fg: Colour, bg: Colour) -> Self {
        self.fg = fg;
        self.bg = bg;
        self
    }

    /// Get the text.
    pub fn text(&self) -> &str {
        &self.text
    }

    /// Replace the text.
    pub fn set_text(&mut self, text: impl Into<String>) {
        self.text = text.into();
    }

    /// Get the position.
    pub const fn position(&self) -> (u16, u16) {
        self.position
    }

    /// Move the label.
    pub const fn set_position(&mut self, x: u16, y: u16) {
        self.position = (x, y);
    }

    /// Size of the text as (columns, lines).
    ///
    /// Columns is the display width of the widest line. A trailing newline
    /// does not start another line.
    pub fn size(&self) -> (usize, usize) {
        self.text.lines().fold((0, 0), |(columns, lines), line| {
            (columns.max(line.width()), lines + 1)
        })
    }
}

impl Behavior for Label {
    fn draw(&mut self, _node: &NodeCore, surface: &mut dyn Surface) -> Result<()> {
        surface.print(&self.text, Some(self.position), self.fg, self.bg)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use crate::terminal::{TestBackend, Window, WindowConfig};

    #[test]
    fn test_size() {
        assert_eq!(Label::new("").size(), (0, 0));
        assert_eq!(Label::new("play").size(), (4, 1));
        assert_eq!(Label::new("play\nquit game\n").size(), (9, 2));
        assert_eq!(Label::new("a\n\nb").size(), (1, 3));
        assert_eq!(Label::new("日本").size(), (4, 1));
    }

    #[test]
    fn test_draw() {
        let config = WindowConfig {
            handle_interrupt: false,
            ..WindowConfig::default()
        };
        let mut window = Window::open(TestBackend::new(12, 3), config).unwrap();
        let mut node = Node::new("title", Label::new("score\n42").at(3, 1));

        node.dispatch_draw(&mut window).unwrap();

        assert_eq!(window.buffer().row_text(1), "   score    ");
        assert_eq!(window.buffer().row_text(2), "   42       ");
    }
}
