//! Display geometry and power-up configuration

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

use crate::command::{
    Bias, ComScanDirection, SegmentDirection, CONTRAST_MAX, CONTRAST_MID, MAX_PAGE,
    MAX_REGULATOR_RATIO,
};
use crate::error::OutOfRange;

/// Pixel rows per page
pub const PAGE_HEIGHT: usize = 8;

/// Display geometry as seen by the controller protocol
///
/// The framebuffer carries the same values as const generics; this runtime
/// copy lets the protocol layer range-check cursor commands.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Geometry {
    width: usize,
    pages: usize,
}

impl Geometry {
    /// Columns in the controller's display RAM
    pub const MAX_WIDTH: usize = 132;
    /// Pages in the controller's display RAM, icon page excluded
    pub const MAX_PAGES: usize = MAX_PAGE as usize + 1;

    /// Create a geometry of `width` columns and `pages` 8-pixel pages
    ///
    /// Returns `None` if either dimension is zero or exceeds the
    /// controller's RAM.
    pub const fn new(width: usize, pages: usize) -> Option<Self> {
        if width == 0 || width > Self::MAX_WIDTH || pages == 0 || pages > Self::MAX_PAGES {
            return None;
        }
        Some(Self { width, pages })
    }

    /// Width in pixels
    pub const fn width(&self) -> usize {
        self.width
    }

    /// Height in pixels
    pub const fn height(&self) -> usize {
        self.pages * PAGE_HEIGHT
    }

    /// Number of pages
    pub const fn pages(&self) -> usize {
        self.pages
    }

    /// Framebuffer size in bytes
    pub const fn buffer_size(&self) -> usize {
        self.width * self.pages
    }

    /// Check that `(page, column)` is addressable
    pub const fn contains_cell(&self, page: usize, column: usize) -> bool {
        page < self.pages && column < self.width
    }
}

/// The 128x64 module the driver was first written for
pub const GEOMETRY_128X64: Geometry = Geometry {
    width: 128,
    pages: 8,
};

/// Settings written once during `initialize()`
///
/// The controller cannot be read back, so these are not mirrored after
/// power-up; changing them later goes through the explicit setters on
/// [`Controller`](crate::Controller).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct InitConfig {
    /// LCD bias ratio
    pub bias: Bias,
    /// Column mirroring
    pub segment_direction: SegmentDirection,
    /// Row mirroring
    pub com_scan: ComScanDirection,
    /// Regulator resistor ratio (0-7)
    pub regulator_ratio: u8,
    /// Electronic volume (0x00-0x3F)
    pub contrast: u8,
    /// How long reset is held asserted
    pub reset_pulse_ms: u32,
    /// Wait after reset is released, before the first command
    pub reset_settle_ms: u32,
    /// Wait after the software reset command
    pub soft_reset_settle_ms: u32,
}

impl Default for InitConfig {
    fn default() -> Self {
        Self {
            bias: Bias::OneNinth,
            segment_direction: SegmentDirection::Reverse,
            com_scan: ComScanDirection::Reverse,
            regulator_ratio: 6,
            contrast: CONTRAST_MID,
            reset_pulse_ms: 50,
            reset_settle_ms: 10,
            soft_reset_settle_ms: 10,
        }
    }
}

impl InitConfig {
    /// Check that every parameter fits its command field
    pub const fn validate(&self) -> Result<(), OutOfRange> {
        if self.regulator_ratio > MAX_REGULATOR_RATIO || self.contrast > CONTRAST_MAX {
            return Err(OutOfRange);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_geometry_limits() {
        assert!(Geometry::new(128, 8).is_some());
        assert!(Geometry::new(132, 8).is_some());
        assert!(Geometry::new(133, 8).is_none());
        assert!(Geometry::new(128, 9).is_none());
        assert!(Geometry::new(0, 8).is_none());
        assert!(Geometry::new(128, 0).is_none());
    }

    #[test]
    fn test_geometry_128x64() {
        let g = GEOMETRY_128X64;
        assert_eq!(g.width(), 128);
        assert_eq!(g.height(), 64);
        assert_eq!(g.pages(), 8);
        assert_eq!(g.buffer_size(), 1024);
        assert!(g.contains_cell(7, 127));
        assert!(!g.contains_cell(8, 0));
        assert!(!g.contains_cell(0, 128));
    }

    #[test]
    fn test_default_config_matches_reference_module() {
        let config = InitConfig::default();
        assert_eq!(config.bias, Bias::OneNinth);
        assert_eq!(config.segment_direction, SegmentDirection::Reverse);
        assert_eq!(config.com_scan, ComScanDirection::Reverse);
        assert_eq!(config.regulator_ratio, 6);
        assert_eq!(config.contrast, 0x1F);
        assert_eq!(config.validate(), Ok(()));
    }

    #[test]
    fn test_validate_rejects_out_of_range() {
        let bad_contrast = InitConfig {
            contrast: 0x40,
            ..InitConfig::default()
        };
        assert_eq!(bad_contrast.validate(), Err(OutOfRange));

        let bad_ratio = InitConfig {
            regulator_ratio: 8,
            ..InitConfig::default()
        };
        assert_eq!(bad_ratio.validate(), Err(OutOfRange));
    }
}
