//! Cell: The atomic unit of terminal display.
//!
//! # Memory Layout
//!
//! A cell stores its grapheme inline and refers to its colours through a
//! colour-pair slot rather than carrying the colours themselves, the way a
//! curses window does. That keeps it at 12 bytes:
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │  Cell Layout (12 bytes)                                  │
//! ├─────────────┬─────────────┬────────┬───────┬─────────────┤
//! │  grapheme   │ len + width │  pair  │ flags │   padding   │
//! │  [u8; 4]    │  u8 + u8    │  u16   │  u8   │   [u8; 3]   │
//! └─────────────┴─────────────┴────────┴───────┴─────────────┘
//! ```

use bitflags::bitflags;
use std::hash::{Hash, Hasher};

bitflags! {
    /// Cell-level flags for special states.
    #[derive(Clone, Copy, PartialEq, Eq, Hash, Default)]
    pub struct CellFlags: u8 {
        /// Grapheme overflows inline storage; check the buffer's overflow table
        const OVERFLOW = 0b0000_0001;
        /// This cell is a continuation of a wide character
        const WIDE_CONTINUATION = 0b0000_0010;
    }
}

impl std::fmt::Debug for CellFlags {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        bitflags::parser::to_writer(self, f)
    }
}

/// A single terminal cell.
///
/// Each cell contains a grapheme, its display width and the colour-pair
/// slot it is painted with. Slot 0 is the terminal's default colours.
///
/// Graphemes longer than 4 bytes (emoji ZWJ sequences) set the `OVERFLOW`
/// flag and store an index into the owning buffer's overflow table instead.
#[repr(C)]
#[derive(Clone, Copy)]
pub struct Cell {
    /// Inline grapheme storage (UTF-8 bytes), or a u32 overflow index.
    grapheme: [u8; 4],
    /// Byte length of the grapheme (0 if overflowed).
    grapheme_len: u8,
    /// Display width (0=continuation, 1=normal, 2=wide).
    display_width: u8,
    /// Colour-pair slot.
    pair: u16,
    /// Cell flags.
    flags: CellFlags,
    _padding: [u8; 3],
}

const _: () = assert!(std::mem::size_of::<Cell>() == 12, "Cell must stay 12 bytes");

impl Default for Cell {
    fn default() -> Self {
        Self::EMPTY
    }
}

impl Cell {
    /// An empty cell (space in the default colours).
    pub const EMPTY: Self = Self {
        grapheme: [b' ', 0, 0, 0],
        grapheme_len: 1,
        display_width: 1,
        pair: 0,
        flags: CellFlags::empty(),
        _padding: [0; 3],
    };

    /// Create a new cell with a single ASCII character.
    #[inline]
    pub fn new(c: char) -> Self {
        debug_assert!(c.is_ascii(), "Use Cell::from_char for non-ASCII");
        Self {
            grapheme: [c as u8, 0, 0, 0],
            ..Self::EMPTY
        }
    }

    /// Create a cell from any character.
    #[inline]
    pub fn from_char(c: char) -> Self {
        let mut grapheme = [0u8; 4];
        let len = c.encode_utf8(&mut grapheme).len();
        let width = unicode_width::UnicodeWidthChar::width(c).unwrap_or(0);

        #[allow(clippy::cast_possible_truncation)]
        Self {
            grapheme,
            grapheme_len: len as u8,
            display_width: width.min(2) as u8,
            ..Self::EMPTY
        }
    }

    /// Create a cell from a grapheme string.
    ///
    /// Returns `None` when the grapheme does not fit in 4 bytes; the caller
    /// must use overflow storage.
    #[inline]
    pub fn from_grapheme(s: &str) -> Option<Self> {
        let bytes = s.as_bytes();
        if bytes.len() > 4 {
            return None;
        }

        let mut grapheme = [0u8; 4];
        grapheme[..bytes.len()].copy_from_slice(bytes);
        let width = unicode_width::UnicodeWidthStr::width(s).min(2);

        #[allow(clippy::cast_possible_truncation)]
        Some(Self {
            grapheme,
            grapheme_len: bytes.len() as u8,
            display_width: width as u8,
            ..Self::EMPTY
        })
    }

    /// Create an overflow cell with an index to external storage.
    #[inline]
    pub const fn overflow(index: u32, display_width: u8) -> Self {
        Self {
            grapheme: index.to_le_bytes(),
            grapheme_len: 0,
            display_width,
            pair: 0,
            flags: CellFlags::OVERFLOW,
            _padding: [0; 3],
        }
    }

    /// Create a wide-character continuation cell.
    #[inline]
    pub const fn wide_continuation() -> Self {
        Self {
            grapheme: [0; 4],
            grapheme_len: 0,
            display_width: 0,
            pair: 0,
            flags: CellFlags::WIDE_CONTINUATION,
            _padding: [0; 3],
        }
    }

    /// Get the grapheme as a string slice.
    ///
    /// Returns `None` for overflow cells.
    #[inline]
    #[allow(unsafe_code)]
    pub fn grapheme(&self) -> Option<&str> {
        if self.flags.contains(CellFlags::OVERFLOW) {
            return None;
        }
        // SAFETY: only valid UTF-8 is ever stored in the inline bytes
        Some(unsafe { std::str::from_utf8_unchecked(&self.grapheme[..self.grapheme_len as usize]) })
    }

    /// Get the overflow index if this is an overflow cell.
    #[inline]
    pub const fn overflow_index(&self) -> Option<u32> {
        if self.flags.contains(CellFlags::OVERFLOW) {
            Some(u32::from_le_bytes(self.grapheme))
        } else {
            None
        }
    }

    /// Check if this cell uses overflow storage.
    #[inline]
    pub const fn is_overflow(&self) -> bool {
        self.flags.contains(CellFlags::OVERFLOW)
    }

    /// Check if this is a wide-character continuation.
    #[inline]
    pub const fn is_wide_continuation(&self) -> bool {
        self.flags.contains(CellFlags::WIDE_CONTINUATION)
    }

    /// Get the display width (0, 1, or 2).
    #[inline]
    pub const fn display_width(&self) -> u8 {
        self.display_width
    }

    /// Get the colour-pair slot.
    #[inline]
    pub const fn pair(&self) -> u16 {
        self.pair
    }

    /// Get the flags.
    #[inline]
    pub const fn flags(&self) -> CellFlags {
        self.flags
    }

    /// Set the colour-pair slot (builder pattern).
    #[inline]
    #[must_use]
    pub const fn with_pair(mut self, pair: u16) -> Self {
        self.pair = pair;
        self
    }

    /// Reset the cell to empty.
    #[inline]
    pub const fn reset(&mut self) {
        *self = Self::EMPTY;
    }
}

impl PartialEq for Cell {
    #[inline]
    fn eq(&self, other: &Self) -> bool {
        // Grapheme first: it is what changes most often between frames
        self.grapheme == other.grapheme
            && self.grapheme_len == other.grapheme_len
            && self.pair == other.pair
            && self.flags == other.flags
            && self.display_width == other.display_width
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.grapheme.hash(state);
        self.grapheme_len.hash(state);
        self.display_width.hash(state);
        self.pair.hash(state);
        self.flags.hash(state);
    }
}

impl std::fmt::Debug for Cell {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let grapheme = self.grapheme().unwrap_or("<overflow>");
        f.debug_struct("Cell")
            .field("grapheme", &grapheme)
            .field("width", &self.display_width)
            .field("pair", &self.pair)
            .field("flags", &self.flags)
            .finish_non_exhaustive()
    }
}
