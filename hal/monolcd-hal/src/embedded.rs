//! Adapters from `embedded-hal` 1.0
//!
//! Most chip HALs already implement the `embedded-hal` traits. These thin
//! wrappers let such peripherals stand in for the monolcd traits without a
//! board-specific shim.

use core::convert::Infallible;

use embedded_hal::delay::DelayNs;
use embedded_hal::digital;
use embedded_hal::spi;

use crate::delay::DelayMs;
use crate::gpio::OutputPin;
use crate::spi::SpiBus;

/// `embedded-hal` SPI bus as a monolcd [`SpiBus`]
///
/// Chip-select is not managed here; the display interface drives it as a
/// separate [`OutputPin`].
pub struct EhSpi<S>(pub S);

impl<S: spi::SpiBus<u8>> SpiBus for EhSpi<S> {
    type Error = S::Error;

    fn write(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        self.0.write(data)?;
        // Bytes must be on the wire before the caller releases chip-select
        self.0.flush()
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), Self::Error> {
        self.0.transfer_in_place(data)?;
        self.0.flush()
    }
}

/// Infallible `embedded-hal` output pin as a monolcd [`OutputPin`]
pub struct EhPin<P>(pub P);

impl<P: digital::OutputPin<Error = Infallible>> OutputPin for EhPin<P> {
    fn set_high(&mut self) {
        match self.0.set_high() {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }

    fn set_low(&mut self) {
        match self.0.set_low() {
            Ok(()) => {}
            Err(never) => match never {},
        }
    }
}

/// `embedded-hal` delay as a monolcd [`DelayMs`]
pub struct EhDelay<D>(pub D);

impl<D: DelayNs> DelayMs for EhDelay<D> {
    fn delay_ms(&mut self, ms: u32) {
        self.0.delay_ms(ms);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    struct MockSpi {
        written: [u8; 4],
        len: usize,
        flushes: u32,
    }

    impl spi::ErrorType for MockSpi {
        type Error = Infallible;
    }

    impl spi::SpiBus<u8> for MockSpi {
        fn read(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            words.fill(0);
            Ok(())
        }

        fn write(&mut self, words: &[u8]) -> Result<(), Infallible> {
            for &w in words {
                self.written[self.len] = w;
                self.len += 1;
            }
            Ok(())
        }

        fn transfer(&mut self, read: &mut [u8], write: &[u8]) -> Result<(), Infallible> {
            read.fill(0);
            self.write(write)
        }

        fn transfer_in_place(&mut self, words: &mut [u8]) -> Result<(), Infallible> {
            for w in words.iter_mut() {
                self.written[self.len] = *w;
                self.len += 1;
                *w = 0xA5;
            }
            Ok(())
        }

        fn flush(&mut self) -> Result<(), Infallible> {
            self.flushes += 1;
            Ok(())
        }
    }

    struct MockPin {
        high: bool,
    }

    impl digital::ErrorType for MockPin {
        type Error = Infallible;
    }

    impl digital::OutputPin for MockPin {
        fn set_low(&mut self) -> Result<(), Infallible> {
            self.high = false;
            Ok(())
        }

        fn set_high(&mut self) -> Result<(), Infallible> {
            self.high = true;
            Ok(())
        }
    }

    struct MockDelay {
        total_ns: u64,
    }

    impl DelayNs for MockDelay {
        fn delay_ns(&mut self, ns: u32) {
            self.total_ns += u64::from(ns);
        }
    }

    #[test]
    fn test_spi_write_flushes() {
        let mut bus = EhSpi(MockSpi {
            written: [0; 4],
            len: 0,
            flushes: 0,
        });

        SpiBus::write(&mut bus, &[0xB0, 0x10]).unwrap();
        assert_eq!(bus.transfer_byte(0x00), Ok(0xA5));

        assert_eq!(&bus.0.written[..bus.0.len], &[0xB0, 0x10, 0x00]);
        assert_eq!(bus.0.flushes, 2);
    }

    #[test]
    fn test_pin_adapter() {
        let mut pin = EhPin(MockPin { high: false });
        pin.set_state(true);
        assert!(pin.0.high);
        pin.set_low();
        assert!(!pin.0.high);
    }

    #[test]
    fn test_delay_adapter() {
        let mut delay = EhDelay(MockDelay { total_ns: 0 });
        delay.delay_ms(50);
        assert!(delay.0.total_ns >= 50_000_000);
    }
}
