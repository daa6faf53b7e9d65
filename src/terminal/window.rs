//! Window: a scoped terminal session.
//!
//! Opening a window puts the backend into session mode; closing or dropping
//! it restores the terminal exactly once. In between, prints land in an
//! off-screen cell grid and [`Window::update`] pushes only the cells that
//! changed since the last flush.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use unicode_segmentation::UnicodeSegmentation;
use unicode_width::UnicodeWidthStr;

use super::backend::Backend;
use super::colour::{Colour, ColourPairs};
use super::interrupt;
use super::output::OutputBuffer;
use super::surface::Surface;
use crate::buffer::Buffer;
use crate::buffer::diff::{DiffState, render_diff, render_full};
use crate::error::{Error, Result};
use crate::event::Event;
use crate::layout::Rect;

/// Stands in for control characters in printed text.
const REPLACEMENT: &str = "\u{fffd}";

/// Configuration for a [`Window`].
#[derive(Debug, Clone)]
pub struct WindowConfig {
    /// How often `poll` flushes the terminal and re-reads its size.
    pub refresh_period: Duration,
    /// Whether to draw on the alternate screen.
    pub alternate_screen: bool,
    /// Fewest colours the terminal must offer.
    pub min_colours: u16,
    /// Whether to route the process interrupt signal to this window.
    pub handle_interrupt: bool,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            refresh_period: Duration::from_secs(1) / 3,
            alternate_screen: true,
            min_colours: 8,
            handle_interrupt: true,
        }
    }
}

/// A terminal session over some [`Backend`].
pub struct Window<B: Backend> {
    /// The terminal device.
    backend: B,
    /// Configuration.
    config: WindowConfig,
    /// Cached terminal size.
    size: (u16, u16),
    /// Colour-pair slots allocated this session.
    pairs: ColourPairs,
    /// What the terminal currently shows.
    screen: Buffer,
    /// What the next update should show.
    canvas: Buffer,
    /// Cursor and colour tracking for the diff.
    diff_state: DiffState,
    /// Pre-allocated output buffer.
    output: OutputBuffer,
    /// Where the next print without a position starts.
    cursor: (u16, u16),
    /// Writes not yet flushed.
    dirty: bool,
    /// Whether the next update must repaint everything.
    full_redraw: bool,
    /// Pending-quit flag set by the interrupt handler.
    interrupt: Arc<AtomicBool>,
    /// Last forced refresh.
    last_refresh: Instant,
    /// Whether the backend has been released.
    released: bool,
}

impl<B: Backend> Window<B> {
    /// Start a session.
    ///
    /// # Errors
    ///
    /// Fails if the backend cannot enter session mode or query its size, or
    /// if it offers fewer than `config.min_colours` colours. The terminal is
    /// restored before the error is returned.
    pub fn open(mut backend: B, config: WindowConfig) -> Result<Self> {
        if let Err(err) = backend.enter(&config) {
            let _ = backend.leave();
            return Err(err.into());
        }

        // From here on Drop restores the terminal
        let mut window = Self {
            backend,
            config,
            size: (1, 1),
            pairs: ColourPairs::new(0),
            screen: Buffer::new(1, 1),
            canvas: Buffer::new(1, 1),
            diff_state: DiffState::new(),
            output: OutputBuffer::new(),
            cursor: (0, 0),
            dirty: false,
            full_redraw: true,
            interrupt: Arc::new(AtomicBool::new(false)),
            last_refresh: Instant::now(),
            released: false,
        };

        let colours = window.backend.colours();
        if colours < window.config.min_colours {
            return Err(Error::UnsupportedTerminal {
                colours,
                required: window.config.min_colours,
            });
        }
        window.pairs = ColourPairs::new(window.backend.colour_pairs());

        let (width, height) = window.backend.size()?;
        window.resize(width, height);

        if window.config.handle_interrupt {
            interrupt::register(&window.interrupt);
        }

        tracing::debug!(width, height, colours, "window opened");
        window.last_refresh = Instant::now();
        Ok(window)
    }

    /// End the session, reporting whether the terminal was restored cleanly.
    ///
    /// # Errors
    ///
    /// Returns the backend's error from leaving session mode.
    pub fn close(mut self) -> Result<()> {
        self.release().map_err(Error::from)
    }

    fn release(&mut self) -> std::io::Result<()> {
        if self.released {
            return Ok(());
        }
        self.released = true;

        if self.config.handle_interrupt {
            interrupt::unregister(&self.interrupt);
        }
        self.backend.leave()
    }

    /// Adopt a new terminal size. Buffers never shrink below one cell.
    fn resize(&mut self, width: u16, height: u16) {
        self.size = (width, height);
        self.screen.resize(width.max(1), height.max(1));
        self.canvas.resize(width.max(1), height.max(1));
        self.full_redraw = true;
        self.dirty = true;
    }

    /// Cached terminal size as (columns, rows).
    pub const fn size(&self) -> (u16, u16) {
        self.size
    }

    /// Whether there are writes the terminal has not seen.
    pub const fn is_dirty(&self) -> bool {
        self.dirty
    }

    /// Where the next print without a position starts.
    pub const fn cursor(&self) -> (u16, u16) {
        self.cursor
    }

    /// Colour pairs allocated so far.
    pub const fn colour_pairs(&self) -> &ColourPairs {
        &self.pairs
    }

    /// The grid the next update will show.
    pub const fn buffer(&self) -> &Buffer {
        &self.canvas
    }

    /// The terminal device.
    pub const fn backend(&self) -> &B {
        &self.backend
    }

    /// Raise the pending-quit flag, as the interrupt signal would.
    pub fn interrupt(&self) {
        self.interrupt.store(true, Ordering::SeqCst);
    }

    /// Wipe the off-screen grid and home the cursor.
    pub fn clear(&mut self) {
        if !self.canvas.is_blank() {
            self.dirty = true;
        }
        self.canvas.clear();
        self.cursor = (0, 0);
    }

    /// Fetch at most one event without blocking.
    ///
    /// Checked in order: a pending interrupt, then (once per refresh period)
    /// a terminal size change, then one key press. A refresh that finds the
    /// size unchanged ends the call without reading a key.
    ///
    /// # Errors
    ///
    /// Propagates backend I/O failures.
    pub fn poll(&mut self) -> Result<Option<Event>> {
        if self.interrupt.swap(false, Ordering::SeqCst) {
            return Ok(Some(Event::Quit));
        }

        if self.last_refresh.elapsed() > self.config.refresh_period {
            self.last_refresh = Instant::now();
            self.backend.flush()?;

            let (width, height) = self.backend.size()?;
            if (width, height) != self.size {
                tracing::debug!(width, height, "terminal resized");
                self.resize(width, height);
                return Ok(Some(Event::Resize { width, height }));
            }
            return Ok(None);
        }

        Ok(self.backend.read_key()?.map(|key| {
            // Raw mode delivers the interrupt as a key press
            if key.is_interrupt() {
                Event::Quit
            } else {
                Event::Key(key)
            }
        }))
    }

    /// Push buffered writes to the terminal and clear the dirty flag.
    ///
    /// # Errors
    ///
    /// Propagates backend I/O failures.
    pub fn update(&mut self) -> Result<()> {
        self.output.clear();

        if self.full_redraw {
            render_full(&self.canvas, &self.pairs, &mut self.output, &mut self.diff_state);
            self.full_redraw = false;
        } else {
            render_diff(
                &self.screen,
                &self.canvas,
                &self.pairs,
                &mut self.output,
                &mut self.diff_state,
            );
        }

        if !self.output.is_empty() {
            self.backend.write(self.output.as_bytes())?;
            self.backend.flush()?;
        }

        self.screen.copy_from(&self.canvas);
        self.dirty = false;
        Ok(())
    }
}

impl<B: Backend> Surface for Window<B> {
    fn size(&self) -> (u16, u16) {
        self.size
    }

    fn print(&mut self, text: &str, at: Option<(u16, u16)>, fg: Colour, bg: Colour) -> Result<()> {
        let pair = self.pairs.slot(fg, bg)?;
        let (start_x, start_y) = at.unwrap_or(self.cursor);
        let bounds = Rect::from_size(self.size.0, self.size.1);

        // Terminals resize under us; out of bounds is not an error
        if !bounds.contains(start_x, start_y) {
            return Ok(());
        }

        let (mut x, mut y) = (start_x, start_y);
        for grapheme in text.graphemes(true) {
            if grapheme == "\n" || grapheme == "\r\n" {
                x = start_x;
                y = y.saturating_add(1);
                if y >= bounds.bottom() {
                    break;
                }
                continue;
            }

            // Control characters move the terminal cursor behind the diff's back
            let grapheme = if grapheme.chars().any(char::is_control) {
                REPLACEMENT
            } else {
                grapheme
            };

            // A wide glyph in the last column would wrap onto the next row
            let columns = u16::try_from(grapheme.width().clamp(1, 2)).unwrap_or(1);
            if x.saturating_add(columns) > bounds.right() {
                x = bounds.right();
                continue;
            }
            let advance = self.canvas.set_grapheme(x, y, grapheme, pair);
            x = x.saturating_add(u16::from(advance.max(1)));
        }

        self.cursor = (x, y);
        self.dirty = true;
        Ok(())
    }
}

impl<B: Backend> Drop for Window<B> {
    fn drop(&mut self) {
        let _ = self.release();
    }
}
