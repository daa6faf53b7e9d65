//! In-memory backend for headless sessions.

use std::cell::RefCell;
use std::collections::VecDeque;
use std::io;
use std::rc::Rc;

use super::backend::Backend;
use super::window::WindowConfig;
use crate::event::Key;

/// Shared state behind every clone of a [`TestBackend`].
#[derive(Debug)]
struct State {
    size: (u16, u16),
    colours: u16,
    colour_pairs: Option<u16>,
    keys: VecDeque<Key>,
    output: Vec<u8>,
    flushes: usize,
    entered: usize,
    left: usize,
}

/// A terminal that lives in memory.
///
/// Clones share state. A test keeps one handle while a window or engine
/// owns the other, and reads the written bytes after the session ends.
#[derive(Debug, Clone)]
pub struct TestBackend {
    state: Rc<RefCell<State>>,
}

impl TestBackend {
    /// A terminal of the given size advertising 8 colours.
    pub fn new(width: u16, height: u16) -> Self {
        Self {
            state: Rc::new(RefCell::new(State {
                size: (width, height),
                colours: 8,
                colour_pairs: None,
                keys: VecDeque::new(),
                output: Vec::new(),
                flushes: 0,
                entered: 0,
                left: 0,
            })),
        }
    }

    /// Advertise a different colour count.
    #[must_use]
    pub fn with_colours(self, colours: u16) -> Self {
        self.state.borrow_mut().colours = colours;
        self
    }

    /// Advertise a fixed number of colour-pair slots.
    #[must_use]
    pub fn with_colour_pairs(self, pairs: u16) -> Self {
        self.state.borrow_mut().colour_pairs = Some(pairs);
        self
    }

    /// Change the reported size, as if the user resized the terminal.
    pub fn resize(&self, width: u16, height: u16) {
        self.state.borrow_mut().size = (width, height);
    }

    /// Queue a key press for a later read.
    pub fn push_key(&self, key: impl Into<Key>) {
        self.state.borrow_mut().keys.push_back(key.into());
    }

    /// Keys not read yet.
    pub fn pending_keys(&self) -> usize {
        self.state.borrow().keys.len()
    }

    /// Every byte written so far.
    pub fn output(&self) -> Vec<u8> {
        self.state.borrow().output.clone()
    }

    /// Number of flushes.
    pub fn flushes(&self) -> usize {
        self.state.borrow().flushes
    }

    /// How many times the session mode was entered.
    pub fn enter_count(&self) -> usize {
        self.state.borrow().entered
    }

    /// How many times the session mode was left.
    pub fn leave_count(&self) -> usize {
        self.state.borrow().left
    }
}

impl Default for TestBackend {
    fn default() -> Self {
        Self::new(80, 24)
    }
}

impl Backend for TestBackend {
    fn enter(&mut self, _config: &WindowConfig) -> io::Result<()> {
        self.state.borrow_mut().entered += 1;
        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        self.state.borrow_mut().left += 1;
        Ok(())
    }

    fn colours(&self) -> u16 {
        self.state.borrow().colours
    }

    fn colour_pairs(&self) -> u16 {
        let state = self.state.borrow();
        state
            .colour_pairs
            .unwrap_or_else(|| state.colours.saturating_mul(state.colours).min(0x7fff))
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        Ok(self.state.borrow().size)
    }

    fn read_key(&mut self) -> io::Result<Option<Key>> {
        Ok(self.state.borrow_mut().keys.pop_front())
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.state.borrow_mut().output.extend_from_slice(bytes);
        Ok(())
    }

    fn flush(&mut self) -> io::Result<()> {
        self.state.borrow_mut().flushes += 1;
        Ok(())
    }
}
