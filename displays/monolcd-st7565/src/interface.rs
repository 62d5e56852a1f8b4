//! Command/data framing over SPI
//!
//! The ST7565 has no framing of its own: the level of the A0 (command/data)
//! line while chip-select is asserted decides how each byte is interpreted.
//!
//! ```text
//!   CS  ‾‾‾‾\________________/‾‾‾‾
//!   A0  ====X  low = command X====
//!   SDA ----<  byte  >------------
//! ```

use monolcd_hal::{OutputPin, SpiBus};

/// Byte-level access to the controller
///
/// Implemented by [`SpiInterface`] for real hardware; tests and other
/// transports can provide their own.
pub trait DisplayInterface {
    /// Transport error type
    type Error;

    /// Send one command byte
    fn send_command(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send one data byte at the controller's current cursor
    fn send_data(&mut self, byte: u8) -> Result<(), Self::Error>;

    /// Send a run of data bytes
    ///
    /// The byte stream is the same as calling [`send_data`] for each byte;
    /// implementations may frame the whole run under one chip-select.
    ///
    /// [`send_data`]: DisplayInterface::send_data
    fn send_data_block(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        for &byte in data {
            self.send_data(byte)?;
        }
        Ok(())
    }
}

/// SPI transport with discrete chip-select and A0 lines
///
/// Chip-select is active-low. A0 low selects command mode.
pub struct SpiInterface<SPI, CS, DC> {
    spi: SPI,
    cs: CS,
    dc: DC,
}

impl<SPI, CS, DC> SpiInterface<SPI, CS, DC>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    /// Create a new interface with the controller deselected
    pub fn new(spi: SPI, mut cs: CS, dc: DC) -> Self {
        cs.set_high();
        Self { spi, cs, dc }
    }

    /// Release the bus and pins
    pub fn release(self) -> (SPI, CS, DC) {
        (self.spi, self.cs, self.dc)
    }

    fn select(&mut self, command: bool) {
        self.dc.set_state(!command);
        self.cs.set_low();
    }

    fn deselect(&mut self) {
        self.cs.set_high();
    }

    fn frame_byte(&mut self, command: bool, byte: u8) -> Result<(), SPI::Error> {
        self.select(command);
        let result = self.spi.transfer_byte(byte).map(drop);
        // Release chip-select even on a failed transfer
        self.deselect();
        result
    }
}

impl<SPI, CS, DC> DisplayInterface for SpiInterface<SPI, CS, DC>
where
    SPI: SpiBus,
    CS: OutputPin,
    DC: OutputPin,
{
    type Error = SPI::Error;

    fn send_command(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.frame_byte(true, byte)
    }

    fn send_data(&mut self, byte: u8) -> Result<(), Self::Error> {
        self.frame_byte(false, byte)
    }

    fn send_data_block(&mut self, data: &[u8]) -> Result<(), Self::Error> {
        if data.is_empty() {
            return Ok(());
        }
        self.select(false);
        let result = self.spi.write(data);
        self.deselect();
        result
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::{Event, Simulator};

    #[test]
    fn test_new_deselects() {
        let sim = Simulator::new();
        let _iface = SpiInterface::new(sim.bus(), sim.chip_select(), sim.data_command());
        assert!(!sim.state().is_selected());
    }

    #[test]
    fn test_command_and_data_framing() {
        let sim = Simulator::new();
        let mut iface = SpiInterface::new(sim.bus(), sim.chip_select(), sim.data_command());

        iface.send_command(0xB0).unwrap();
        iface.send_data(0x5A).unwrap();

        assert_eq!(
            &sim.events()[..],
            &[Event::Command(0xB0), Event::Data(0x5A)]
        );
        assert_eq!(sim.state().unframed_bytes(), 0);
        assert!(!sim.state().is_selected());
    }

    #[test]
    fn test_block_matches_byte_stream() {
        let sim = Simulator::new();
        let mut iface = SpiInterface::new(sim.bus(), sim.chip_select(), sim.data_command());

        iface.send_data_block(&[1, 2, 3]).unwrap();
        iface.send_data_block(&[]).unwrap();

        assert_eq!(
            &sim.events()[..],
            &[Event::Data(1), Event::Data(2), Event::Data(3)]
        );
    }

    #[test]
    fn test_deselects_after_bus_failure() {
        let sim = Simulator::new();
        let mut iface = SpiInterface::new(sim.bus(), sim.chip_select(), sim.data_command());
        sim.fail_after(0);

        assert!(iface.send_command(0xAF).is_err());
        assert!(!sim.state().is_selected());
        assert!(sim.events().is_empty());
    }
}
