//! Frame Widget: a box outline with an optional title.
//!
//! Children draw before their parent, so a frame paints its border over
//! whatever its children left on the edge cells.

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use crate::error::Result;
use crate::layout::Rect;
use crate::scene::{Behavior, NodeCore};
use crate::terminal::{Colour, Surface};

/// A rounded box around an area of the surface.
#[derive(Debug, Clone, Default)]
pub struct Frame {
    /// Area to outline. `None` follows the surface size.
    area: Option<Rect>,
    /// Title drawn into the top edge.
    title: Option<String>,
}

impl Frame {
    /// A frame around `area`.
    pub const fn new(area: Rect) -> Self {
        Self {
            area: Some(area),
            title: None,
        }
    }

    /// A frame around the whole surface, following resizes.
    pub const fn fullscreen() -> Self {
        Self {
            area: None,
            title: None,
        }
    }

    /// Set the title.
    #[must_use]
    pub fn with_title(mut self, title: impl Into<String>) -> Self {
        self.title = Some(title.into());
        self
    }

    /// The fixed area, if any.
    pub const fn area(&self) -> Option<Rect> {
        self.area
    }

    /// Move or resize the frame.
    pub const fn set_area(&mut self, area: Rect) {
        self.area = Some(area);
    }
}

/// The longest prefix of `text` no wider than `width` columns.
fn fit(text: &str, width: usize) -> &str {
    let mut used = 0;
    for (offset, grapheme) in text.grapheme_indices(true) {
        used += grapheme.width();
        if used > width {
            return &text[..offset];
        }
    }
    text
}

impl Behavior for Frame {
    fn draw(&mut self, _node: &NodeCore, surface: &mut dyn Surface) -> Result<()> {
        let area = self.area.unwrap_or_else(|| {
            let (width, height) = surface.size();
            Rect::from_size(width, height)
        });
        surface.draw_box(area)?;

        // Title sits between "╭─" and "─╮", padded by a space on each side
        if let Some(title) = &self.title
            && area.width > 6
        {
            let title = fit(title, usize::from(area.width - 6));
            if !title.is_empty() {
                let at = (area.x.saturating_add(2), area.y);
                surface.print(&format!(" {title} "), Some(at), Colour::Default, Colour::Default)?;
            }
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::scene::Node;
    use crate::terminal::{TestBackend, Window, WindowConfig};
    use crate::widget::Label;

    fn window(width: u16, height: u16) -> Window<TestBackend> {
        let config = WindowConfig {
            handle_interrupt: false,
            ..WindowConfig::default()
        };
        Window::open(TestBackend::new(width, height), config).unwrap()
    }

    #[test]
    fn test_frame_with_title() {
        let mut window = window(12, 3);
        let mut node = Node::new("frame", Frame::new(Rect::new(0, 0, 12, 3)).with_title("menu"));

        node.dispatch_draw(&mut window).unwrap();

        assert_eq!(window.buffer().row_text(0), "╭─ menu ───╮");
        assert_eq!(window.buffer().row_text(1), "│          │");
        assert_eq!(window.buffer().row_text(2), "╰──────────╯");
    }

    #[test]
    fn test_long_title_truncated() {
        let mut window = window(10, 3);
        let mut node = Node::new(
            "frame",
            Frame::new(Rect::new(0, 0, 10, 3)).with_title("settings"),
        );

        node.dispatch_draw(&mut window).unwrap();
        assert_eq!(window.buffer().row_text(0), "╭─ sett ─╮");
    }

    #[test]
    fn test_border_painted_over_children() {
        let mut window = window(6, 3);
        let mut node = Node::new("frame", Frame::fullscreen());
        node.add_child(Some("label"), Label::new("XXXXXX\nXXXXXX")).unwrap();

        node.dispatch_draw(&mut window).unwrap();

        assert_eq!(window.buffer().row_text(0), "╭────╮");
        assert_eq!(window.buffer().row_text(1), "│XXXX│");
    }

    #[test]
    fn test_fit() {
        assert_eq!(fit("menu", 10), "menu");
        assert_eq!(fit("settings", 4), "sett");
        assert_eq!(fit("日本語", 5), "日本");
    }
}
