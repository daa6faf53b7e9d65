//! Event taxonomy: the closed set of events the engine dispatches.
//!
//! Events are produced by [`Window::poll`](crate::terminal::Window::poll)
//! and handed to the active scene's input pass. They are plain values with
//! no side effects on construction.

use std::fmt;

/// Key codes for keyboard input.
///
/// A backend-neutral subset of what terminals report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum KeyCode {
    /// A printable character.
    Char(char),
    /// Function key (F1-F12).
    F(u8),
    /// Backspace key.
    Backspace,
    /// Enter/Return key.
    Enter,
    /// Left arrow.
    Left,
    /// Right arrow.
    Right,
    /// Up arrow.
    Up,
    /// Down arrow.
    Down,
    /// Home key.
    Home,
    /// End key.
    End,
    /// Page Up.
    PageUp,
    /// Page Down.
    PageDown,
    /// Tab key.
    Tab,
    /// Backtab (Shift+Tab).
    BackTab,
    /// Delete key.
    Delete,
    /// Insert key.
    Insert,
    /// Escape key.
    Esc,
}

impl fmt::Display for KeyCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Char(' ') => f.write_str("space"),
            Self::Char(c) => write!(f, "{c}"),
            Self::F(n) => write!(f, "f{n}"),
            Self::Backspace => f.write_str("backspace"),
            Self::Enter => f.write_str("enter"),
            Self::Left => f.write_str("left"),
            Self::Right => f.write_str("right"),
            Self::Up => f.write_str("up"),
            Self::Down => f.write_str("down"),
            Self::Home => f.write_str("home"),
            Self::End => f.write_str("end"),
            Self::PageUp => f.write_str("page-up"),
            Self::PageDown => f.write_str("page-down"),
            Self::Tab => f.write_str("tab"),
            Self::BackTab => f.write_str("back-tab"),
            Self::Delete => f.write_str("delete"),
            Self::Insert => f.write_str("insert"),
            Self::Esc => f.write_str("esc"),
        }
    }
}

/// Key modifiers.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub struct KeyModifiers {
    /// Shift key held.
    pub shift: bool,
    /// Control key held.
    pub control: bool,
    /// Alt/Option key held.
    pub alt: bool,
}

impl KeyModifiers {
    /// No modifiers.
    pub const NONE: Self = Self {
        shift: false,
        control: false,
        alt: false,
    };

    /// Control only.
    pub const CONTROL: Self = Self {
        shift: false,
        control: true,
        alt: false,
    };

    /// Check if any modifier is active.
    pub const fn any(&self) -> bool {
        self.shift || self.control || self.alt
    }
}

/// A single key press.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Key {
    /// The key code.
    pub code: KeyCode,
    /// Modifiers held during the press.
    pub modifiers: KeyModifiers,
}

impl Key {
    /// A key press with no modifiers.
    pub const fn new(code: KeyCode) -> Self {
        Self {
            code,
            modifiers: KeyModifiers::NONE,
        }
    }

    /// A key press with explicit modifiers.
    pub const fn with_modifiers(code: KeyCode, modifiers: KeyModifiers) -> Self {
        Self { code, modifiers }
    }

    /// Ctrl+C. Raw mode turns the interrupt signal into this key press.
    pub const fn is_interrupt(&self) -> bool {
        matches!(self.code, KeyCode::Char('c' | 'C')) && self.modifiers.control
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.modifiers.control {
            f.write_str("ctrl+")?;
        }
        if self.modifiers.alt {
            f.write_str("alt+")?;
        }
        if self.modifiers.shift {
            f.write_str("shift+")?;
        }
        write!(f, "{}", self.code)
    }
}

impl From<KeyCode> for Key {
    fn from(code: KeyCode) -> Self {
        Self::new(code)
    }
}

/// Events dispatched through the scene tree.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// A key was pressed.
    Key(Key),

    /// The session should end (interrupt or Ctrl+C).
    Quit,

    /// Terminal was resized.
    Resize {
        /// New width in columns.
        width: u16,
        /// New height in rows.
        height: u16,
    },
}

impl Event {
    /// Shorthand for a key event without modifiers.
    pub const fn key(code: KeyCode) -> Self {
        Self::Key(Key::new(code))
    }

    /// The key code, if this is a key event.
    pub const fn key_code(&self) -> Option<KeyCode> {
        match self {
            Self::Key(key) => Some(key.code),
            _ => None,
        }
    }
}

impl fmt::Display for Event {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Key(key) => write!(f, "key pressed: {key}"),
            Self::Quit => f.write_str("quit requested"),
            Self::Resize { width, height } => write!(f, "window resized: {width}x{height}"),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_event_descriptions() {
        assert_eq!(Event::key(KeyCode::Enter).to_string(), "key pressed: enter");
        assert_eq!(Event::key(KeyCode::Char('q')).to_string(), "key pressed: q");
        assert_eq!(Event::Quit.to_string(), "quit requested");
        assert_eq!(
            Event::Resize { width: 100, height: 30 }.to_string(),
            "window resized: 100x30"
        );
    }

    #[test]
    fn test_modified_key_description() {
        let key = Key::with_modifiers(KeyCode::Char('x'), KeyModifiers::CONTROL);
        assert_eq!(Event::Key(key).to_string(), "key pressed: ctrl+x");
    }

    #[test]
    fn test_interrupt_key() {
        assert!(Key::with_modifiers(KeyCode::Char('c'), KeyModifiers::CONTROL).is_interrupt());
        assert!(!Key::new(KeyCode::Char('c')).is_interrupt());
    }

    #[test]
    fn test_key_code_accessor() {
        assert_eq!(Event::key(KeyCode::Down).key_code(), Some(KeyCode::Down));
        assert_eq!(Event::Quit.key_code(), None);
    }
}
