//! Backend: the seam between a [`Window`](super::Window) and a physical terminal.
//!
//! Everything device-specific sits behind this trait: entering and leaving
//! raw mode, colour capabilities, size queries, non-blocking key reads and
//! byte output. The window layers cell buffering, colour pairs, dirty
//! tracking and resize detection on top.

use std::io;

use super::window::WindowConfig;
use crate::event::Key;

/// A terminal device.
pub trait Backend {
    /// Put the terminal into the session mode: raw input, no echo, hidden
    /// cursor, extended key decoding, non-blocking reads.
    fn enter(&mut self, config: &WindowConfig) -> io::Result<()>;

    /// Undo everything [`Backend::enter`] did. Called exactly once per session.
    fn leave(&mut self) -> io::Result<()>;

    /// Number of colours the terminal advertises.
    fn colours(&self) -> u16;

    /// Number of colour-pair slots the terminal offers, slot 0 included.
    fn colour_pairs(&self) -> u16 {
        let colours = self.colours();
        colours.saturating_mul(colours).min(0x7fff)
    }

    /// Current terminal size as (columns, rows).
    fn size(&self) -> io::Result<(u16, u16)>;

    /// Read one pending key press without blocking.
    fn read_key(&mut self) -> io::Result<Option<Key>>;

    /// Queue bytes for the terminal.
    fn write(&mut self, bytes: &[u8]) -> io::Result<()>;

    /// Push queued bytes to the device.
    fn flush(&mut self) -> io::Result<()>;
}
