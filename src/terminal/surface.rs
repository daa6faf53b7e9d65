//! Surface: what a node's draw hook paints on.

use super::colour::Colour;
use crate::error::Result;
use crate::layout::Rect;

/// A paintable grid of cells.
///
/// [`Window`](super::Window) is the real implementation. Writes that fall
/// outside [`Surface::size`] are dropped, never reported as errors.
pub trait Surface {
    /// Current size as (columns, rows).
    fn size(&self) -> (u16, u16);

    /// Print `text` at `at`, or at the cursor left by the previous print.
    ///
    /// # Errors
    ///
    /// Fails when the colour pair cannot be allocated.
    fn print(&mut self, text: &str, at: Option<(u16, u16)>, fg: Colour, bg: Colour) -> Result<()>;

    /// Paint the outline of `area` with rounded corners.
    ///
    /// # Errors
    ///
    /// Same as [`Surface::print`].
    fn draw_box(&mut self, area: Rect) -> Result<()> {
        if area.is_empty() {
            return Ok(());
        }

        let (fg, bg) = (Colour::Default, Colour::Default);
        let right = area.right() - 1;
        let bottom = area.bottom() - 1;

        let horizontal = "─".repeat(usize::from(area.width.saturating_sub(2)));
        if !horizontal.is_empty() {
            let x = area.x.saturating_add(1);
            self.print(&horizontal, Some((x, area.y)), fg, bg)?;
            self.print(&horizontal, Some((x, bottom)), fg, bg)?;
        }

        for y in area.y.saturating_add(1)..bottom {
            self.print("│", Some((area.x, y)), fg, bg)?;
            self.print("│", Some((right, y)), fg, bg)?;
        }

        self.print("╭", Some((area.x, area.y)), fg, bg)?;
        self.print("╮", Some((right, area.y)), fg, bg)?;
        self.print("╰", Some((area.x, bottom)), fg, bg)?;
        self.print("╯", Some((right, bottom)), fg, bg)
    }
}
