//! Driver for ST7565 monochrome LCD modules
//!
//! The ST7565 is a 132x65 dot-matrix controller with a write-only serial
//! interface. This crate drives it through the `monolcd-hal` traits and
//! keeps a local framebuffer so single pixels can be updated without
//! rewriting the panel.
//!
//! # Layers
//!
//! - [`command`] - Opcode table and the typed [`Command`] encoding
//! - [`interface`] - Command/data framing over SPI ([`SpiInterface`])
//! - [`controller`] - Power-up sequence, cursor addressing and display modes
//! - [`framebuffer`] - Page-organized pixel buffer, no I/O
//! - [`display`] - [`St7565`], the buffer and controller together
//!
//! # Example
//!
//! ```ignore
//! use monolcd_st7565::{font, InitConfig, SpiInterface, St7565};
//!
//! let iface = SpiInterface::new(spi, cs, dc);
//! let mut lcd: St7565<_, _> = St7565::new(iface, reset, InitConfig::default());
//! lcd.initialize(&mut delay)?;
//! lcd.clear()?;
//!
//! lcd.set_pixel(0, 0)?;
//! lcd.blit_glyph(10, 0, &font::UPPER_A)?;
//! lcd.sync_all()?;
//! ```
//!
//! # Features
//!
//! - `defmt` - `defmt::Format` derives and driver logging
//! - `serde` - Serialize/deserialize [`InitConfig`]
//! - `graphics` - `embedded-graphics` `DrawTarget` for [`Framebuffer`]
//! - `sim` - The [`sim`] module for host-side testing

#![cfg_attr(not(test), no_std)]
#![deny(unsafe_code)]

pub mod command;
pub mod config;
pub mod controller;
pub mod display;
pub mod error;
pub mod framebuffer;
pub mod glyph;
#[cfg(feature = "graphics")]
mod graphics;
pub mod interface;
#[cfg(any(test, feature = "sim"))]
pub mod sim;

pub use command::{Bias, ComScanDirection, Command, PowerControl, SegmentDirection};
pub use config::{Geometry, InitConfig, GEOMETRY_128X64, PAGE_HEIGHT};
pub use controller::{Controller, Cursor, SessionState};
pub use display::St7565;
pub use error::{Error, OutOfRange};
pub use framebuffer::{Framebuffer, Framebuffer128x64, PixelAddress};
pub use glyph::{font, Glyph, GLYPH_WIDTH};
pub use interface::{DisplayInterface, SpiInterface};

use monolcd_hal::{Mode, SpiConfig};

/// Bus settings for the reference module: 4 MHz, mode 3
pub const SPI_CONFIG: SpiConfig = SpiConfig::new(4_000_000, Mode::Mode3);

#[cfg(test)]
mod tests {
    use super::*;
    use monolcd_hal::spi::{Phase, Polarity};

    #[test]
    fn test_spi_config() {
        assert_eq!(SPI_CONFIG.frequency, 4_000_000);
        assert_eq!(SPI_CONFIG.polarity, Polarity::IdleHigh);
        assert_eq!(SPI_CONFIG.phase, Phase::CaptureOnSecondTransition);
        assert_eq!(SPI_CONFIG.mode(), Mode::Mode3);
    }
}
