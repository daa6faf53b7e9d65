//! Layout module: rectangles for placing boxes and widgets.

mod rect;

pub use rect::Rect;
