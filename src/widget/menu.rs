//! Menu Widget: a vertical list of options with a selection marker.
//!
//! Up and Down move the selection, Enter confirms it by emitting the
//! [`Menu::SELECTED`] signal with a [`Selected`] payload. Ancestors connect
//! to that signal to act on the choice.

use crate::error::Result;
use crate::event::{Event, KeyCode};
use crate::scene::{Behavior, NodeCore};
use crate::terminal::{Colour, Surface};

/// Columns between the marker and the option text.
const INDENT: u16 = 2;

/// Payload of the [`Menu::SELECTED`] signal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Selected {
    /// The confirmed option.
    pub option: String,
}

/// A selectable list of options.
#[derive(Debug, Clone)]
pub struct Menu {
    /// Options, top to bottom.
    options: Vec<String>,
    /// Index of the highlighted option.
    index: usize,
    /// Whether the menu reacts to input.
    focused: bool,
    /// Where the marker column of the first option sits.
    origin: (u16, u16),
}

impl Menu {
    /// Signal emitted when an option is confirmed.
    pub const SELECTED: &'static str = "selected";

    /// Create a focused menu at the origin.
    pub fn new<I, S>(options: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            options: options.into_iter().map(Into::into).collect(),
            index: 0,
            focused: true,
            origin: (0, 0),
        }
    }

    /// Place the menu.
    #[must_use]
    pub const fn at(mut self, x: u16, y: u16) -> Self {
        self.origin = (x, y);
        self
    }

    /// The options.
    pub fn options(&self) -> &[String] {
        &self.options
    }

    /// Index of the highlighted option.
    pub const fn index(&self) -> usize {
        self.index
    }

    /// The highlighted option, if there are any.
    pub fn current(&self) -> Option<&str> {
        self.options.get(self.index).map(String::as_str)
    }

    /// Whether the menu reacts to input.
    pub const fn is_focused(&self) -> bool {
        self.focused
    }

    /// Start or stop reacting to input.
    pub const fn set_focused(&mut self, focused: bool) {
        self.focused = focused;
    }
}

impl Behavior for Menu {
    fn enter(&mut self, node: &mut NodeCore) -> Result<()> {
        node.register_signal::<Selected>(Self::SELECTED)
    }

    fn input(&mut self, node: &mut NodeCore, event: &Event) -> Result<()> {
        if !self.focused {
            return Ok(());
        }

        match event.key_code() {
            Some(KeyCode::Up) if self.index > 0 => self.index -= 1,
            Some(KeyCode::Down) if self.index + 1 < self.options.len() => self.index += 1,
            Some(KeyCode::Enter) => {
                if let Some(option) = self.current() {
                    let selected = Selected {
                        option: option.to_owned(),
                    };
                    node.emit(Self::SELECTED, &selected)?;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn draw(&mut self, _node: &NodeCore, surface: &mut dyn Surface) -> Result<()> {
        let (x, y) = self.origin;
        let (fg, bg) = (Colour::Default, Colour::Default);

        for (row, option) in (y..).zip(&self.options) {
            surface.print(option, Some((x.saturating_add(INDENT), row)), fg, bg)?;
        }

        if !self.options.is_empty() {
            let row = u16::try_from(self.index).map_or(u16::MAX, |i| y.saturating_add(i));
            surface.print(">", Some((x, row)), fg, bg)?;
        }
        Ok(())
    }
}
