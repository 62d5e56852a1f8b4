//! Page-organized pixel buffer
//!
//! The buffer mirrors the controller's display RAM layout: `P` pages of `W`
//! bytes, each byte holding eight vertically stacked pixels of one column.
//!
//! ```text
//!            x = 0    1    2         W-1
//! page 0   [ b0 ] [ b0 ] [ b0 ] ... [ b0 ]   y = 0
//!          [ .. ] [ .. ] [ .. ] ... [ .. ]
//!          [ b7 ] [ b7 ] [ b7 ] ... [ b7 ]   y = 7
//! page 1   [ b0 ] ...                         y = 8
//! ```
//!
//! Every read, write and sync path addresses byte `page * W + x`. This
//! module does no I/O; [`St7565`](crate::St7565) pushes it to the panel.

use crate::config::{Geometry, PAGE_HEIGHT};
use crate::error::OutOfRange;
use crate::glyph::{Glyph, GLYPH_WIDTH};

/// Where a pixel lives in the buffer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct PixelAddress {
    /// Page (`y >> 3`)
    pub page: usize,
    /// Column (`x`)
    pub column: usize,
    /// Bit within the byte (`y & 7`, 0 = top)
    pub bit: u8,
    /// Linear index (`page * W + x`)
    pub offset: usize,
}

impl PixelAddress {
    /// Single-bit mask for this pixel
    pub const fn mask(&self) -> u8 {
        1 << self.bit
    }
}

/// Monochrome framebuffer of `W` columns and `P` pages (`8 * P` rows)
#[derive(Clone, PartialEq, Eq)]
pub struct Framebuffer<const W: usize, const P: usize> {
    pages: [[u8; W]; P],
}

/// Buffer for the 128x64 module
pub type Framebuffer128x64 = Framebuffer<128, 8>;

impl<const W: usize, const P: usize> Default for Framebuffer<W, P> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const W: usize, const P: usize> Framebuffer<W, P> {
    /// Width in pixels
    pub const WIDTH: usize = W;
    /// Height in pixels
    pub const HEIGHT: usize = P * PAGE_HEIGHT;
    /// Number of pages
    pub const PAGES: usize = P;
    /// Size in bytes
    pub const SIZE: usize = W * P;

    const GEOMETRY_CHECK: () = assert!(
        W > 0 && W <= Geometry::MAX_WIDTH && P > 0 && P <= Geometry::MAX_PAGES,
        "framebuffer geometry exceeds ST7565 display RAM"
    );

    /// Create an all-clear buffer
    pub const fn new() -> Self {
        let () = Self::GEOMETRY_CHECK;
        Self {
            pages: [[0; W]; P],
        }
    }

    /// Geometry of this buffer
    pub const fn geometry() -> Geometry {
        let () = Self::GEOMETRY_CHECK;
        match Geometry::new(W, P) {
            Some(geometry) => geometry,
            None => panic!("framebuffer geometry exceeds ST7565 display RAM"),
        }
    }

    /// Map `(x, y)` to its page, bit and linear offset
    pub const fn address(x: usize, y: usize) -> Result<PixelAddress, OutOfRange> {
        if x >= W || y >= P * PAGE_HEIGHT {
            return Err(OutOfRange);
        }
        let page = y >> 3;
        Ok(PixelAddress {
            page,
            column: x,
            bit: (y & 7) as u8,
            offset: page * W + x,
        })
    }

    /// Set one pixel
    pub fn set_pixel(&mut self, x: usize, y: usize) -> Result<PixelAddress, OutOfRange> {
        let addr = Self::address(x, y)?;
        self.pages[addr.page][addr.column] |= addr.mask();
        Ok(addr)
    }

    /// Clear one pixel
    pub fn clear_pixel(&mut self, x: usize, y: usize) -> Result<PixelAddress, OutOfRange> {
        let addr = Self::address(x, y)?;
        self.pages[addr.page][addr.column] &= !addr.mask();
        Ok(addr)
    }

    /// Set or clear one pixel
    pub fn write_pixel(&mut self, x: usize, y: usize, on: bool) -> Result<PixelAddress, OutOfRange> {
        if on {
            self.set_pixel(x, y)
        } else {
            self.clear_pixel(x, y)
        }
    }

    /// Read one pixel
    pub fn pixel(&self, x: usize, y: usize) -> Result<bool, OutOfRange> {
        let addr = Self::address(x, y)?;
        Ok(self.pages[addr.page][addr.column] & addr.mask() != 0)
    }

    /// Byte at linear `offset`
    pub fn byte(&self, offset: usize) -> Option<u8> {
        self.as_bytes().get(offset).copied()
    }

    /// Byte at `(page, column)`
    pub fn cell(&self, page: usize, column: usize) -> Option<u8> {
        self.pages.get(page)?.get(column).copied()
    }

    /// One page, leftmost column first
    pub fn page(&self, page: usize) -> Option<&[u8; W]> {
        self.pages.get(page)
    }

    /// All pages
    pub fn pages(&self) -> &[[u8; W]; P] {
        &self.pages
    }

    /// The whole buffer in linear `page * W + x` order
    pub fn as_bytes(&self) -> &[u8] {
        self.pages.as_flattened()
    }

    /// Set every byte to `value`
    pub fn fill(&mut self, value: u8) {
        for page in self.pages.iter_mut() {
            page.fill(value);
        }
    }

    /// Zero one page
    pub fn clear_page(&mut self, page: usize) -> Result<(), OutOfRange> {
        self.pages.get_mut(page).ok_or(OutOfRange)?.fill(0);
        Ok(())
    }

    /// Zero the whole buffer
    pub fn clear(&mut self) {
        self.fill(0);
    }

    /// Copy a glyph into the cell at column `x` of `page`
    ///
    /// Overwrites the eight bytes at `page * W + x`; no blending. The cell
    /// must fit the page: `page < P` and `x + 8 <= W`. Returns the offset of
    /// the first byte written.
    pub fn blit_glyph(&mut self, x: usize, page: usize, glyph: &Glyph) -> Result<usize, OutOfRange> {
        let row = self.pages.get_mut(page).ok_or(OutOfRange)?;
        let end = x.checked_add(GLYPH_WIDTH).ok_or(OutOfRange)?;
        let cell = row.get_mut(x..end).ok_or(OutOfRange)?;
        cell.copy_from_slice(glyph.bytes());
        Ok(page * W + x)
    }
}

impl<const W: usize, const P: usize> core::fmt::Debug for Framebuffer<W, P> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Framebuffer")
            .field("width", &W)
            .field("height", &(P * PAGE_HEIGHT))
            .finish_non_exhaustive()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::glyph::font;
    use proptest::prelude::*;

    type Fb = Framebuffer128x64;

    #[test]
    fn test_constants() {
        assert_eq!(Fb::WIDTH, 128);
        assert_eq!(Fb::HEIGHT, 64);
        assert_eq!(Fb::PAGES, 8);
        assert_eq!(Fb::SIZE, 1024);
        assert_eq!(Fb::geometry(), crate::config::GEOMETRY_128X64);
    }

    #[test]
    fn test_address_law() {
        let addr = Fb::address(5, 19).unwrap();
        assert_eq!(addr.page, 2);
        assert_eq!(addr.bit, 3);
        assert_eq!(addr.offset, 2 * 128 + 5);
        assert_eq!(addr.mask(), 0x08);

        assert_eq!(Fb::address(128, 0), Err(OutOfRange));
        assert_eq!(Fb::address(0, 64), Err(OutOfRange));
    }

    #[test]
    fn test_corners() {
        let mut fb = Fb::new();
        assert_eq!(fb.set_pixel(0, 0).unwrap().offset, 0);
        assert_eq!(fb.set_pixel(127, 0).unwrap().offset, 127);
        assert_eq!(fb.set_pixel(127, 63).unwrap().offset, 1023);

        assert_eq!(fb.byte(0), Some(0x01));
        assert_eq!(fb.byte(127), Some(0x01));
        assert_eq!(fb.byte(1023), Some(0x80));
        assert_eq!(fb.byte(1024), None);
    }

    #[test]
    fn test_out_of_range_leaves_buffer() {
        let mut fb = Fb::new();
        assert_eq!(fb.set_pixel(128, 0), Err(OutOfRange));
        assert_eq!(fb.clear_pixel(0, 64), Err(OutOfRange));
        assert_eq!(fb.pixel(200, 200), Err(OutOfRange));
        assert!(fb.as_bytes().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_linear_view_matches_pages() {
        let mut fb = Fb::new();
        fb.set_pixel(3, 8).unwrap();
        assert_eq!(fb.cell(1, 3), Some(0x01));
        assert_eq!(fb.as_bytes()[128 + 3], 0x01);
        assert_eq!(fb.page(1).unwrap()[3], 0x01);
        assert_eq!(fb.page(8), None);
    }

    #[test]
    fn test_blit_glyph_reference_cell() {
        let mut fb = Fb::new();
        let offset = fb.blit_glyph(10, 0, &font::UPPER_A).unwrap();

        assert_eq!(offset, 10);
        assert_eq!(&fb.as_bytes()[10..18], font::UPPER_A.bytes());
        assert!(fb.as_bytes()[..10].iter().all(|&b| b == 0));
        assert!(fb.as_bytes()[18..].iter().all(|&b| b == 0));
    }

    #[test]
    fn test_blit_glyph_overwrites_without_blending() {
        let mut fb = Fb::new();
        fb.fill(0xFF);
        fb.blit_glyph(0, 3, &Glyph::BLANK).unwrap();
        assert_eq!(&fb.page(3).unwrap()[..8], &[0; 8]);
        assert_eq!(fb.cell(3, 8), Some(0xFF));
    }

    #[test]
    fn test_blit_glyph_bounds() {
        let mut fb = Fb::new();
        assert_eq!(fb.blit_glyph(120, 7, &font::UPPER_B), Ok(7 * 128 + 120));
        assert_eq!(fb.blit_glyph(121, 0, &font::UPPER_B), Err(OutOfRange));
        assert_eq!(fb.blit_glyph(0, 8, &font::UPPER_B), Err(OutOfRange));
        assert_eq!(fb.blit_glyph(usize::MAX, 0, &font::UPPER_B), Err(OutOfRange));
        // The rejected calls must not have spilled into page 1
        assert!(fb.page(1).unwrap().iter().all(|&b| b == 0));
    }

    #[test]
    fn test_clear_page() {
        let mut fb = Fb::new();
        fb.fill(0xAA);
        fb.clear_page(2).unwrap();
        assert!(fb.page(2).unwrap().iter().all(|&b| b == 0));
        assert_eq!(fb.cell(1, 0), Some(0xAA));
        assert_eq!(fb.clear_page(8), Err(OutOfRange));
    }

    #[test]
    fn test_small_geometry() {
        let mut fb = Framebuffer::<16, 2>::new();
        assert_eq!(Framebuffer::<16, 2>::HEIGHT, 16);
        assert_eq!(fb.set_pixel(15, 15).unwrap().offset, 31);
        assert_eq!(fb.set_pixel(16, 0), Err(OutOfRange));
    }

    proptest! {
        #[test]
        fn prop_set_then_clear_restores_byte(x in 0usize..128, y in 0usize..64, seed in any::<u8>()) {
            let mut fb = Fb::new();
            fb.fill(seed);
            let addr = Fb::address(x, y).unwrap();
            let before = fb.byte(addr.offset);

            fb.set_pixel(x, y).unwrap();
            fb.clear_pixel(x, y).unwrap();
            fb.write_pixel(x, y, before.unwrap() & addr.mask() != 0).unwrap();

            prop_assert_eq!(fb.byte(addr.offset), before);
        }

        #[test]
        fn prop_pixel_write_touches_one_bit(x in 0usize..128, y in 0usize..64, on in any::<bool>()) {
            let mut fb = Fb::new();
            fb.fill(if on { 0x00 } else { 0xFF });
            let before = fb.clone();

            let addr = fb.write_pixel(x, y, on).unwrap();
            prop_assert_eq!(addr.offset, (y >> 3) * 128 + x);
            prop_assert_eq!(addr.bit as usize, y & 7);

            for (i, (a, b)) in before.as_bytes().iter().zip(fb.as_bytes()).enumerate() {
                if i == addr.offset {
                    prop_assert_eq!(a ^ b, 1u8 << (y & 7));
                } else {
                    prop_assert_eq!(a, b);
                }
            }
            prop_assert_eq!(fb.pixel(x, y), Ok(on));
        }

        #[test]
        fn prop_blit_writes_exactly_the_cell(x in 0usize..=120, page in 0usize..8, bytes in any::<[u8; 8]>()) {
            let mut fb = Fb::new();
            fb.fill(0x5A);
            let glyph = Glyph::new(bytes);

            let start = fb.blit_glyph(x, page, &glyph).unwrap();
            prop_assert_eq!(start, page * 128 + x);

            for (i, &b) in fb.as_bytes().iter().enumerate() {
                if (start..start + 8).contains(&i) {
                    prop_assert_eq!(b, bytes[i - start]);
                } else {
                    prop_assert_eq!(b, 0x5A);
                }
            }
        }
    }
}
