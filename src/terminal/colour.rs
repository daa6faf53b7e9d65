//! Colours and the colour-pair cache.
//!
//! The terminal model is curses-like: eight base colours plus the
//! terminal's own default, combined into (foreground, background) pairs
//! that are allocated into numbered slots on first use. Slot 0 is fixed to
//! (default, default) and never allocated.

use std::collections::HashMap;

use crate::error::{Error, Result};

/// One of the eight base terminal colours, or the terminal default.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Colour {
    /// The terminal's own foreground/background (code -1).
    #[default]
    Default,
    /// Code 0.
    Black,
    /// Code 1.
    Red,
    /// Code 2.
    Green,
    /// Code 3.
    Yellow,
    /// Code 4.
    Blue,
    /// Code 5.
    Magenta,
    /// Code 6.
    Cyan,
    /// Code 7.
    White,
}

impl Colour {
    /// The curses-style colour code, `-1..=7`.
    pub const fn code(self) -> i16 {
        match self {
            Self::Default => -1,
            Self::Black => 0,
            Self::Red => 1,
            Self::Green => 2,
            Self::Yellow => 3,
            Self::Blue => 4,
            Self::Magenta => 5,
            Self::Cyan => 6,
            Self::White => 7,
        }
    }

    /// SGR parameter selecting this colour as foreground.
    pub const fn sgr_fg(self) -> u8 {
        match self {
            Self::Default => 39,
            Self::Black => 30,
            Self::Red => 31,
            Self::Green => 32,
            Self::Yellow => 33,
            Self::Blue => 34,
            Self::Magenta => 35,
            Self::Cyan => 36,
            Self::White => 37,
        }
    }

    /// SGR parameter selecting this colour as background.
    pub const fn sgr_bg(self) -> u8 {
        self.sgr_fg() + 10
    }
}

impl TryFrom<i16> for Colour {
    type Error = Error;

    fn try_from(code: i16) -> Result<Self> {
        Ok(match code {
            -1 => Self::Default,
            0 => Self::Black,
            1 => Self::Red,
            2 => Self::Green,
            3 => Self::Yellow,
            4 => Self::Blue,
            5 => Self::Magenta,
            6 => Self::Cyan,
            7 => Self::White,
            _ => return Err(Error::InvalidColour(code)),
        })
    }
}

/// Slot-allocating cache of (foreground, background) pairs.
///
/// Owned by one window session; a new session starts empty.
#[derive(Debug, Clone)]
pub struct ColourPairs {
    /// Pair -> slot.
    slots: HashMap<(Colour, Colour), u16>,
    /// Slot - 1 -> pair.
    pairs: Vec<(Colour, Colour)>,
    /// Number of pair slots the terminal offers, slot 0 included.
    limit: u16,
}

impl ColourPairs {
    /// Create an empty cache for a terminal offering `limit` pair slots.
    pub fn new(limit: u16) -> Self {
        Self {
            slots: HashMap::new(),
            pairs: Vec::new(),
            limit,
        }
    }

    /// Resolve a pair to its slot, allocating one on first use.
    pub fn slot(&mut self, fg: Colour, bg: Colour) -> Result<u16> {
        if fg == Colour::Default && bg == Colour::Default {
            return Ok(0);
        }
        if let Some(&slot) = self.slots.get(&(fg, bg)) {
            return Ok(slot);
        }

        let slot = u16::try_from(self.pairs.len() + 1).unwrap_or(u16::MAX);
        if slot >= self.limit {
            return Err(Error::ColourPairExhausted { limit: self.limit });
        }

        self.pairs.push((fg, bg));
        self.slots.insert((fg, bg), slot);
        tracing::trace!(slot, ?fg, ?bg, "allocated colour pair");
        Ok(slot)
    }

    /// The colours bound to a slot. Unknown slots read as the defaults.
    pub fn colours(&self, slot: u16) -> (Colour, Colour) {
        match slot {
            0 => (Colour::Default, Colour::Default),
            n => self
                .pairs
                .get(usize::from(n) - 1)
                .copied()
                .unwrap_or((Colour::Default, Colour::Default)),
        }
    }

    /// Number of allocated slots (slot 0 excluded).
    pub fn len(&self) -> usize {
        self.pairs.len()
    }

    /// Whether no slot has been allocated yet.
    pub fn is_empty(&self) -> bool {
        self.pairs.is_empty()
    }

    /// The terminal's pair limit.
    pub const fn limit(&self) -> u16 {
        self.limit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_colour_codes() {
        assert_eq!(Colour::try_from(-1).unwrap(), Colour::Default);
        assert_eq!(Colour::try_from(1).unwrap(), Colour::Red);
        assert_eq!(Colour::try_from(7).unwrap(), Colour::White);
        assert_eq!(Colour::White.code(), 7);
    }

    #[test]
    fn test_invalid_colour_codes() {
        assert!(matches!(Colour::try_from(8), Err(Error::InvalidColour(8))));
        assert!(matches!(Colour::try_from(-2), Err(Error::InvalidColour(-2))));
    }

    #[test]
    fn test_sgr_parameters() {
        assert_eq!(Colour::Default.sgr_fg(), 39);
        assert_eq!(Colour::Default.sgr_bg(), 49);
        assert_eq!(Colour::Red.sgr_fg(), 31);
        assert_eq!(Colour::Blue.sgr_bg(), 44);
    }

    #[test]
    fn test_same_pair_same_slot() {
        let mut pairs = ColourPairs::new(64);
        let first = pairs.slot(Colour::Red, Colour::Default).unwrap();
        let second = pairs.slot(Colour::Red, Colour::Default).unwrap();
        assert_eq!(first, second);
        assert_eq!(pairs.len(), 1);
    }

    #[test]
    fn test_distinct_pairs_distinct_slots() {
        let mut pairs = ColourPairs::new(64);
        let a = pairs.slot(Colour::Red, Colour::Default).unwrap();
        let b = pairs.slot(Colour::Default, Colour::Red).unwrap();
        let c = pairs.slot(Colour::Green, Colour::Black).unwrap();
        assert_ne!(a, b);
        assert_ne!(b, c);
        assert_ne!(a, c);
        assert_eq!(pairs.colours(b), (Colour::Default, Colour::Red));
    }

    #[test]
    fn test_default_pair_is_slot_zero() {
        let mut pairs = ColourPairs::new(2);
        assert_eq!(pairs.slot(Colour::Default, Colour::Default).unwrap(), 0);
        assert!(pairs.is_empty());
    }

    #[test]
    fn test_pair_exhaustion() {
        let mut pairs = ColourPairs::new(3);
        pairs.slot(Colour::Red, Colour::Default).unwrap();
        pairs.slot(Colour::Green, Colour::Default).unwrap();

        let err = pairs.slot(Colour::Blue, Colour::Default).unwrap_err();
        assert!(matches!(err, Error::ColourPairExhausted { limit: 3 }));

        // Already-allocated pairs still resolve
        assert_eq!(pairs.slot(Colour::Red, Colour::Default).unwrap(), 1);
    }

    #[test]
    fn test_unknown_slot_reads_default() {
        let pairs = ColourPairs::new(8);
        assert_eq!(pairs.colours(5), (Colour::Default, Colour::Default));
    }
}
