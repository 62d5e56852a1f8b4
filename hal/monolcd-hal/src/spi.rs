//! SPI bus abstractions
//!
//! Display controllers on a narrow serial bus are write-mostly: the driver
//! frames each byte with its own chip-select and command/data lines and only
//! needs the bus to clock bytes out.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// SPI bus master
///
/// Transfers are synchronous. A call returns once every byte has been
/// clocked out, so the caller may deassert chip-select right after it.
pub trait SpiBus {
    /// Error type for SPI operations
    type Error;

    /// Write data without reading
    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error>;

    /// Transfer data in place
    ///
    /// Writes data from buffer while reading into the same buffer.
    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error>;

    /// Exchange a single byte, returning what was clocked in
    fn transfer_byte(&mut self, byte: u8) -> Result<u8, Self::Error> {
        let mut buf = [byte];
        self.transfer_in_place(&mut buf)?;
        Ok(buf[0])
    }
}

impl<S: SpiBus + ?Sized> SpiBus for &mut S {
    type Error = S::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        (**self).write(data)
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        (**self).transfer_in_place(data)
    }
}

/// SPI configuration
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct SpiConfig {
    /// Clock frequency in Hz
    pub frequency: u32,
    /// Clock polarity
    pub polarity: Polarity,
    /// Clock phase
    pub phase: Phase,
}

impl SpiConfig {
    /// Build a configuration from a frequency and a combined SPI mode
    pub const fn new(frequency: u32, mode: Mode) -> Self {
        let (polarity, phase) = mode.split();
        Self {
            frequency,
            polarity,
            phase,
        }
    }

    /// Combined SPI mode for this configuration
    pub const fn mode(&self) -> Mode {
        match (self.polarity, self.phase) {
            (Polarity::IdleLow, Phase::CaptureOnFirstTransition) => Mode::Mode0,
            (Polarity::IdleLow, Phase::CaptureOnSecondTransition) => Mode::Mode1,
            (Polarity::IdleHigh, Phase::CaptureOnFirstTransition) => Mode::Mode2,
            (Polarity::IdleHigh, Phase::CaptureOnSecondTransition) => Mode::Mode3,
        }
    }
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self::new(1_000_000, Mode::Mode0)
    }
}

/// SPI clock polarity
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Polarity {
    /// Clock idles low (CPOL=0)
    IdleLow,
    /// Clock idles high (CPOL=1)
    IdleHigh,
}

/// SPI clock phase
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Phase {
    /// Data captured on first clock transition (CPHA=0)
    CaptureOnFirstTransition,
    /// Data captured on second clock transition (CPHA=1)
    CaptureOnSecondTransition,
}

/// SPI mode (combined polarity and phase)
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Mode {
    /// Mode 0: CPOL=0, CPHA=0
    Mode0,
    /// Mode 1: CPOL=0, CPHA=1
    Mode1,
    /// Mode 2: CPOL=1, CPHA=0
    Mode2,
    /// Mode 3: CPOL=1, CPHA=1
    Mode3,
}

impl Mode {
    const fn split(self) -> (Polarity, Phase) {
        match self {
            Mode::Mode0 => (Polarity::IdleLow, Phase::CaptureOnFirstTransition),
            Mode::Mode1 => (Polarity::IdleLow, Phase::CaptureOnSecondTransition),
            Mode::Mode2 => (Polarity::IdleHigh, Phase::CaptureOnFirstTransition),
            Mode::Mode3 => (Polarity::IdleHigh, Phase::CaptureOnSecondTransition),
        }
    }
}

impl From<Mode> for (Polarity, Phase) {
    fn from(mode: Mode) -> Self {
        mode.split()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Loopback bus that echoes the complement of every byte
    struct InvertingBus {
        written: usize,
    }

    impl SpiBus for InvertingBus {
        type Error = ();

        fn write(&mut self, data: &[u8]) -> Result<(), ()> {
            self.written += data.len();
            Ok(())
        }

        fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), ()> {
            for byte in data.iter_mut() {
                *byte = !*byte;
            }
            self.written += data.len();
            Ok(())
        }
    }

    #[test]
    fn test_transfer_byte_uses_in_place_transfer() {
        let mut bus = InvertingBus { written: 0 };
        assert_eq!(bus.transfer_byte(0x0F), Ok(0xF0));
        assert_eq!(bus.written, 1);
    }

    #[test]
    fn test_mut_ref_bus_forwards() {
        let mut bus = InvertingBus { written: 0 };
        fn exercise<S: SpiBus<Error = ()>>(mut bus: S) {
            bus.write(&[1, 2, 3]).unwrap();
            assert_eq!(bus.transfer_byte(0x00), Ok(0xFF));
        }

        exercise(&mut bus);
        assert_eq!(bus.written, 4);
    }

    #[test]
    fn test_mode_round_trips_through_config() {
        for mode in [Mode::Mode0, Mode::Mode1, Mode::Mode2, Mode::Mode3] {
            assert_eq!(SpiConfig::new(4_000_000, mode).mode(), mode);
        }
    }

    #[test]
    fn test_mode3_is_idle_high_second_edge() {
        let (polarity, phase) = Mode::Mode3.into();
        assert_eq!(polarity, Polarity::IdleHigh);
        assert_eq!(phase, Phase::CaptureOnSecondTransition);
    }

    #[test]
    fn test_default_config() {
        let config = SpiConfig::default();
        assert_eq!(config.frequency, 1_000_000);
        assert_eq!(config.mode(), Mode::Mode0);
    }
}
