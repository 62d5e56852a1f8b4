//! 8x8 glyph cells
//!
//! A glyph fills one page-high cell: eight bytes, one per column, each
//! packed the same way as a framebuffer byte (bit 0 is the top row).

/// Width of a glyph cell in columns
pub const GLYPH_WIDTH: usize = 8;

/// One 8x8 bitmap
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Glyph(pub [u8; GLYPH_WIDTH]);

impl Glyph {
    /// Empty cell
    pub const BLANK: Glyph = Glyph([0; GLYPH_WIDTH]);

    pub const fn new(bytes: [u8; GLYPH_WIDTH]) -> Self {
        Self(bytes)
    }

    /// Raw bytes, leftmost column first
    pub const fn bytes(&self) -> &[u8; GLYPH_WIDTH] {
        &self.0
    }
}

impl From<[u8; GLYPH_WIDTH]> for Glyph {
    fn from(bytes: [u8; GLYPH_WIDTH]) -> Self {
        Self(bytes)
    }
}

/// Built-in glyphs
pub mod font {
    use super::Glyph;

    /// U+0041 `A`
    pub const UPPER_A: Glyph = Glyph([0x0C, 0x1E, 0x33, 0x33, 0x3F, 0x33, 0x33, 0x00]);
    /// U+0042 `B`
    pub const UPPER_B: Glyph = Glyph([0x3F, 0x66, 0x66, 0x3E, 0x66, 0x66, 0x3F, 0x00]);
    /// U+0061 `a`
    pub const LOWER_A: Glyph = Glyph([0x00, 0x00, 0x1E, 0x30, 0x3E, 0x33, 0x6E, 0x00]);
    /// U+0062 `b`
    pub const LOWER_B: Glyph = Glyph([0x07, 0x06, 0x06, 0x3E, 0x66, 0x66, 0x3B, 0x00]);

    /// Look up the glyph for a character
    ///
    /// Space maps to [`Glyph::BLANK`]; characters without a bitmap return
    /// `None`.
    pub fn glyph_for(ch: char) -> Option<Glyph> {
        match ch {
            ' ' => Some(Glyph::BLANK),
            'A' => Some(UPPER_A),
            'B' => Some(UPPER_B),
            'a' => Some(LOWER_A),
            'b' => Some(LOWER_B),
            _ => None,
        }
    }
}
