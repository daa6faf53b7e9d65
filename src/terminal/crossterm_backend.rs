//! Crossterm-backed terminal on stdout.

use std::io::{self, Stdout, Write};
use std::time::Duration;

use crossterm::{
    cursor,
    event::{
        self, KeyEventKind, KeyboardEnhancementFlags, PopKeyboardEnhancementFlags,
        PushKeyboardEnhancementFlags,
    },
    execute,
    terminal::{self, EnterAlternateScreen, LeaveAlternateScreen},
};

use super::backend::Backend;
use super::window::WindowConfig;
use crate::event::{Key, KeyCode, KeyModifiers};

/// The real terminal, driven through crossterm.
pub struct CrosstermBackend {
    /// Terminal stdout handle.
    stdout: Stdout,
    /// Whether keyboard enhancement flags were pushed on enter.
    enhanced: bool,
    /// Whether the alternate screen was entered.
    alternate_screen: bool,
}

impl CrosstermBackend {
    /// Create a backend writing to stdout.
    pub fn new() -> Self {
        Self {
            stdout: io::stdout(),
            enhanced: false,
            alternate_screen: false,
        }
    }

    /// Convert a crossterm key event, dropping releases and unknown keys.
    fn convert_key(key_event: event::KeyEvent) -> Option<Key> {
        // Only process key press events (not release or repeat)
        if key_event.kind != KeyEventKind::Press {
            return None;
        }

        let code = Self::convert_key_code(key_event.code)?;
        let modifiers = Self::convert_modifiers(key_event.modifiers);
        Some(Key::with_modifiers(code, modifiers))
    }

    /// Convert crossterm `KeyCode` to ours.
    fn convert_key_code(code: event::KeyCode) -> Option<KeyCode> {
        Some(match code {
            event::KeyCode::Char(c) => KeyCode::Char(c),
            event::KeyCode::F(n) => KeyCode::F(n),
            event::KeyCode::Backspace => KeyCode::Backspace,
            event::KeyCode::Enter => KeyCode::Enter,
            event::KeyCode::Left => KeyCode::Left,
            event::KeyCode::Right => KeyCode::Right,
            event::KeyCode::Up => KeyCode::Up,
            event::KeyCode::Down => KeyCode::Down,
            event::KeyCode::Home => KeyCode::Home,
            event::KeyCode::End => KeyCode::End,
            event::KeyCode::PageUp => KeyCode::PageUp,
            event::KeyCode::PageDown => KeyCode::PageDown,
            event::KeyCode::Tab => KeyCode::Tab,
            event::KeyCode::BackTab => KeyCode::BackTab,
            event::KeyCode::Delete => KeyCode::Delete,
            event::KeyCode::Insert => KeyCode::Insert,
            event::KeyCode::Esc => KeyCode::Esc,
            _ => return None,
        })
    }

    /// Convert crossterm `KeyModifiers` to ours.
    fn convert_modifiers(mods: event::KeyModifiers) -> KeyModifiers {
        KeyModifiers {
            shift: mods.contains(event::KeyModifiers::SHIFT),
            control: mods.contains(event::KeyModifiers::CONTROL),
            alt: mods.contains(event::KeyModifiers::ALT),
        }
    }
}

impl Default for CrosstermBackend {
    fn default() -> Self {
        Self::new()
    }
}

impl Backend for CrosstermBackend {
    fn enter(&mut self, config: &WindowConfig) -> io::Result<()> {
        terminal::enable_raw_mode()?;

        if config.alternate_screen {
            execute!(self.stdout, EnterAlternateScreen)?;
            self.alternate_screen = true;
        }
        execute!(self.stdout, cursor::Hide, cursor::DisableBlinking)?;

        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.stdout,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::DISAMBIGUATE_ESCAPE_CODES)
            )?;
            self.enhanced = true;
        }

        Ok(())
    }

    fn leave(&mut self) -> io::Result<()> {
        // Every step runs even if an earlier one failed; the first error wins
        let mut result = Ok(());

        if self.enhanced {
            result = result.and(execute!(self.stdout, PopKeyboardEnhancementFlags));
            self.enhanced = false;
        }
        result = result.and(execute!(self.stdout, cursor::EnableBlinking, cursor::Show));
        if self.alternate_screen {
            result = result.and(execute!(self.stdout, LeaveAlternateScreen));
            self.alternate_screen = false;
        }
        result.and(terminal::disable_raw_mode())
    }

    fn colours(&self) -> u16 {
        crossterm::style::available_color_count()
    }

    fn size(&self) -> io::Result<(u16, u16)> {
        terminal::size()
    }

    fn read_key(&mut self) -> io::Result<Option<Key>> {
        if !event::poll(Duration::ZERO)? {
            return Ok(None);
        }
        // Resize, mouse and focus events are dropped; resizes are found by polling the size
        match event::read()? {
            event::Event::Key(key_event) => Ok(Self::convert_key(key_event)),
            _ => Ok(None),
        }
    }

    fn write(&mut self, bytes: &[u8]) -> io::Result<()> {
        self.stdout.write_all(bytes)
    }

    fn flush(&mut self) -> io::Result<()> {
        self.stdout.flush()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_convert_key_press() {
        let event = event::KeyEvent::new(event::KeyCode::Down, event::KeyModifiers::NONE);
        assert_eq!(CrosstermBackend::convert_key(event), Some(Key::new(KeyCode::Down)));
    }

    #[test]
    fn test_convert_key_release_dropped() {
        let event = event::KeyEvent::new_with_kind(
            event::KeyCode::Enter,
            event::KeyModifiers::NONE,
            KeyEventKind::Release,
        );
        assert_eq!(CrosstermBackend::convert_key(event), None);
    }

    #[test]
    fn test_convert_ctrl_c() {
        let event = event::KeyEvent::new(event::KeyCode::Char('c'), event::KeyModifiers::CONTROL);
        let key = CrosstermBackend::convert_key(event).unwrap();
        assert!(key.is_interrupt());
    }

    #[test]
    fn test_convert_unknown_key() {
        assert_eq!(CrosstermBackend::convert_key_code(event::KeyCode::CapsLock), None);
    }
}
