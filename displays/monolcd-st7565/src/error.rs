//! Driver errors

use core::fmt;

/// Errors returned by the ST7565 driver
///
/// `E` is the error type of the underlying SPI bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error<E> {
    /// Bus transfer failed
    Bus(E),
    /// Coordinate, page, column or parameter outside the display geometry
    OutOfRange,
    /// Operation issued before `initialize()` completed
    NotInitialized,
}

impl<E: fmt::Debug> fmt::Display for Error<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Error::Bus(e) => write!(f, "bus transfer failed: {:?}", e),
            Error::OutOfRange => f.write_str("address out of range"),
            Error::NotInitialized => f.write_str("display not initialized"),
        }
    }
}

/// Address outside the framebuffer geometry
///
/// Returned by the buffer-only [`Framebuffer`](crate::Framebuffer)
/// operations, which never touch the bus.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct OutOfRange;

impl fmt::Display for OutOfRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("address out of range")
    }
}

impl<E> From<OutOfRange> for Error<E> {
    fn from(_: OutOfRange) -> Self {
        Error::OutOfRange
    }
}
