//! Hardware palette rows

use crate::color::TRANSPARENT;
use serde::ser::{Serialize, SerializeSeq, Serializer};

/// Number of color slots in one hardware palette.
pub const PALETTE_CAPACITY: usize = 4;

/// Marker for an unoccupied slot.
pub const EMPTY_SLOT: u16 = u16::MAX;

/// One hardware palette: up to four CGB colors, deduplicated on insert.
///
/// When transparency is reserved, slot 0 always holds [`TRANSPARENT`] and is
/// left out of iteration; the remaining slots hold the assignable colors.
/// Occupied slots always form a contiguous prefix.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PaletteSlots {
    colors: [u16; PALETTE_CAPACITY],
    reserve_transparency: bool,
}

impl PaletteSlots {
    pub fn new(reserve_transparency: bool) -> Self {
        let mut colors = [EMPTY_SLOT; PALETTE_CAPACITY];
        if reserve_transparency {
            colors[0] = TRANSPARENT;
        }
        Self { colors, reserve_transparency }
    }

    fn first_assignable(&self) -> usize {
        usize::from(self.reserve_transparency)
    }

    /// Add a color unless it is already present.
    ///
    /// The caller must make sure the row has room for a new color.
    pub fn add_color(&mut self, color: u16) {
        let start = self.first_assignable();
        let slot = self.colors[start..]
            .iter_mut()
            .find(|slot| **slot == color || **slot == EMPTY_SLOT);
        debug_assert!(slot.is_some(), "palette row is full, cannot add color {:#06x}", color);
        if let Some(slot) = slot {
            *slot = color;
        }
    }

    /// Index of `color` in the row, or [`size`](Self::size) if absent.
    ///
    /// Transparency always maps to index 0.
    pub fn index_of(&self, color: u16) -> u8 {
        if color == TRANSPARENT {
            return 0;
        }
        match self.colors().iter().position(|&c| c == color) {
            Some(i) => (self.first_assignable() + i) as u8,
            None => self.size(),
        }
    }

    /// Number of occupied slots, including a reserved transparency slot.
    pub fn size(&self) -> u8 {
        self.colors.iter().position(|&c| c == EMPTY_SLOT).unwrap_or(PALETTE_CAPACITY) as u8
    }

    pub fn is_full(&self) -> bool {
        usize::from(self.size()) == PALETTE_CAPACITY
    }

    /// Assignable colors, skipping the reserved slot.
    pub fn colors(&self) -> &[u16] {
        &self.colors[self.first_assignable()..usize::from(self.size())]
    }

    pub fn iter(&self) -> std::slice::Iter<'_, u16> {
        self.colors().iter()
    }
}

impl<'a> IntoIterator for &'a PaletteSlots {
    type Item = &'a u16;
    type IntoIter = std::slice::Iter<'a, u16>;

    fn into_iter(self) -> Self::IntoIter {
        self.iter()
    }
}

impl Serialize for PaletteSlots {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut seq = serializer.serialize_seq(Some(self.colors().len()))?;
        for color in self {
            seq.serialize_element(&format!("{:#06x}", color))?;
        }
        seq.end()
    }
}
