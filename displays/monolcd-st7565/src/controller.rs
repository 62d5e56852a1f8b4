//! ST7565 controller protocol
//!
//! Turns semantic operations (power-up, cursor moves, display modes) into
//! the controller's command byte stream and owns the session state.
//!
//! # Cursor model
//!
//! The controller keeps a page/column write pointer that cannot be read
//! back. Every data byte lands at the pointer, which then advances one
//! column within the current page and never wraps into the next page.
//! [`Controller`] mirrors the pointer as a *last known cursor*: it is set by
//! [`Controller::set_cursor`], advanced by each data byte and forgotten on
//! reset. It is only used to decide whether a cursor command can be
//! skipped, never as a readback of the hardware.

use monolcd_hal::{DelayMs, OutputPin};

use crate::command::{Bias, ComScanDirection, Command, PowerControl, SegmentDirection};
use crate::config::{Geometry, InitConfig};
use crate::error::Error;
use crate::interface::DisplayInterface;

/// Controller session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum SessionState {
    /// Power-up sequence has not completed
    Uninitialized,
    /// Accepting addressing and data writes
    Ready,
}

/// Last known controller write pointer
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub struct Cursor {
    pub page: u8,
    pub column: u8,
}

type Result<T, DI> = core::result::Result<T, Error<<DI as DisplayInterface>::Error>>;

/// ST7565 protocol driver
pub struct Controller<DI, RST> {
    interface: DI,
    reset: RST,
    geometry: Geometry,
    config: InitConfig,
    state: SessionState,
    cursor: Option<Cursor>,
}

impl<DI, RST> Controller<DI, RST>
where
    DI: DisplayInterface,
    RST: OutputPin,
{
    /// Create a controller with reset released
    ///
    /// Nothing is sent until [`initialize`](Self::initialize).
    pub fn new(interface: DI, mut reset: RST, geometry: Geometry, config: InitConfig) -> Self {
        reset.set_high();
        Self {
            interface,
            reset,
            geometry,
            config,
            state: SessionState::Uninitialized,
            cursor: None,
        }
    }

    /// Run the power-up sequence
    ///
    /// Hardware reset, then software reset, bias, orientation, power,
    /// regulator, contrast, normal mode, start line and finally display on.
    /// There is no retry: on any failure the session stays
    /// [`SessionState::Uninitialized`].
    pub fn initialize<D: DelayMs>(&mut self, delay: &mut D) -> Result<(), DI> {
        self.state = SessionState::Uninitialized;
        self.cursor = None;

        match self.power_up(delay) {
            Ok(()) => {
                self.state = SessionState::Ready;
                #[cfg(feature = "defmt")]
                defmt::debug!("st7565 ready");
                Ok(())
            }
            Err(e) => {
                #[cfg(feature = "defmt")]
                defmt::warn!("st7565 initialization failed");
                Err(e)
            }
        }
    }

    fn power_up<D: DelayMs>(&mut self, delay: &mut D) -> Result<(), DI> {
        self.config.validate()?;
        let config = self.config;

        #[cfg(feature = "defmt")]
        defmt::debug!("st7565 hardware reset");
        self.reset.set_low();
        delay.delay_ms(config.reset_pulse_ms);
        self.reset.set_high();
        delay.delay_ms(config.reset_settle_ms);

        self.write_command(Command::Reset)?;
        delay.delay_ms(config.soft_reset_settle_ms);

        // Power rails must be up before the volume is programmed, and
        // display-on goes last
        let sequence = [
            Command::Bias(config.bias),
            Command::SegmentDirection(config.segment_direction),
            Command::ComScan(config.com_scan),
            Command::PowerControl(PowerControl::ALL_ON),
            Command::RegulatorResistor(config.regulator_ratio),
            Command::EnterVolumeMode,
            Command::VolumeValue(config.contrast),
            Command::Inverse(false),
            Command::StartLine(0),
            Command::Display(true),
        ];

        #[cfg(feature = "defmt")]
        defmt::debug!("st7565 configuring ({} commands)", sequence.len());
        for command in sequence {
            self.write_command(command)?;
        }

        Ok(())
    }

    /// Current session state
    pub fn state(&self) -> SessionState {
        self.state
    }

    /// Check if the power-up sequence has completed
    pub fn is_ready(&self) -> bool {
        self.state == SessionState::Ready
    }

    /// Last known controller cursor, if any
    pub fn cursor(&self) -> Option<Cursor> {
        self.cursor
    }

    /// Geometry used for range checks
    pub fn geometry(&self) -> Geometry {
        self.geometry
    }

    /// Configuration used by `initialize()`
    pub fn config(&self) -> &InitConfig {
        &self.config
    }

    fn ensure_ready(&self) -> Result<(), DI> {
        if self.is_ready() {
            Ok(())
        } else {
            Err(Error::NotInitialized)
        }
    }

    /// Map a transfer result, forgetting the cursor on failure
    ///
    /// A failed transfer may still have clocked some bytes in, so the
    /// controller's position is unknown until the next `set_cursor`.
    fn track_transfer(
        &mut self,
        result: core::result::Result<(), DI::Error>,
    ) -> Result<(), DI> {
        result.map_err(|e| {
            self.cursor = None;
            Error::Bus(e)
        })
    }

    fn write_command(&mut self, command: Command) -> Result<(), DI> {
        let byte = command.encode().ok_or(Error::OutOfRange)?;
        let result = self.interface.send_command(byte);
        self.track_transfer(result)?;

        match command {
            // Mode registers are back at their defaults, display off
            Command::Reset => {
                self.cursor = None;
                self.state = SessionState::Uninitialized;
            }
            Command::Page(page) => {
                self.cursor = Some(Cursor {
                    page,
                    column: self.cursor.map_or(0, |c| c.column),
                })
            }
            Command::ColumnHigh(high) => {
                if let Some(cursor) = self.cursor.as_mut() {
                    cursor.column = (cursor.column & 0x0F) | (high << 4);
                }
            }
            Command::ColumnLow(low) => {
                if let Some(cursor) = self.cursor.as_mut() {
                    cursor.column = (cursor.column & 0xF0) | low;
                }
            }
            _ => {}
        }
        Ok(())
    }

    fn advance_cursor(&mut self, count: usize) {
        if let Some(cursor) = self.cursor.as_mut() {
            let last = Geometry::MAX_WIDTH - 1;
            let column = (cursor.column as usize + count).min(last);
            cursor.column = column as u8;
        }
    }

    /// Send one command byte
    pub fn send_command(&mut self, command: Command) -> Result<(), DI> {
        self.ensure_ready()?;
        self.write_command(command)
    }

    /// Send one data byte at the controller cursor
    ///
    /// The controller advances the column by one afterwards.
    pub fn send_data(&mut self, byte: u8) -> Result<(), DI> {
        self.ensure_ready()?;
        let result = self.interface.send_data(byte);
        self.track_transfer(result)?;
        self.advance_cursor(1);
        Ok(())
    }

    /// Send consecutive data bytes under one chip-select
    ///
    /// The run must fit in the current page; the controller does not wrap.
    pub fn send_data_block(&mut self, data: &[u8]) -> Result<(), DI> {
        self.ensure_ready()?;
        let result = self.interface.send_data_block(data);
        self.track_transfer(result)?;
        self.advance_cursor(data.len());
        Ok(())
    }

    /// Point the controller cursor at `(page, column)`
    ///
    /// Always sends the three addressing commands.
    pub fn set_cursor(&mut self, page: usize, column: usize) -> Result<(), DI> {
        self.ensure_ready()?;
        if !self.geometry.contains_cell(page, column) {
            return Err(Error::OutOfRange);
        }

        for command in Command::cursor(page as u8, column as u8) {
            self.write_command(command)?;
        }
        Ok(())
    }

    /// Point the cursor at `(page, column)` unless it is already there
    ///
    /// Returns `true` if addressing commands were sent.
    pub fn ensure_cursor(&mut self, page: usize, column: usize) -> Result<bool, DI> {
        self.ensure_ready()?;
        if !self.geometry.contains_cell(page, column) {
            return Err(Error::OutOfRange);
        }

        let target = Cursor {
            page: page as u8,
            column: column as u8,
        };
        if self.cursor == Some(target) {
            return Ok(false);
        }

        #[cfg(feature = "defmt")]
        defmt::trace!("cursor -> page {} column {}", page, column);
        self.set_cursor(page, column)?;
        Ok(true)
    }

    /// Set the electronic volume (0x00-0x3F)
    pub fn set_contrast(&mut self, value: u8) -> Result<(), DI> {
        self.ensure_ready()?;
        // Validate before entering volume mode so no half sequence is sent
        Command::VolumeValue(value)
            .encode()
            .ok_or(Error::OutOfRange)?;
        self.write_command(Command::EnterVolumeMode)?;
        self.write_command(Command::VolumeValue(value))
    }

    /// Turn the display on or off; RAM is preserved
    pub fn set_display_on(&mut self, on: bool) -> Result<(), DI> {
        self.send_command(Command::Display(on))
    }

    /// Invert display polarity
    pub fn set_inverted(&mut self, inverted: bool) -> Result<(), DI> {
        self.send_command(Command::Inverse(inverted))
    }

    /// Force every pixel on without touching RAM
    pub fn set_all_pixels_on(&mut self, on: bool) -> Result<(), DI> {
        self.send_command(Command::AllPixelsOn(on))
    }

    /// Set the RAM line shown at the top of the panel (0-63)
    pub fn set_start_line(&mut self, line: u8) -> Result<(), DI> {
        self.send_command(Command::StartLine(line))
    }

    pub fn set_segment_direction(&mut self, direction: SegmentDirection) -> Result<(), DI> {
        self.send_command(Command::SegmentDirection(direction))
    }

    pub fn set_com_scan(&mut self, direction: ComScanDirection) -> Result<(), DI> {
        self.send_command(Command::ComScan(direction))
    }

    pub fn set_bias(&mut self, bias: Bias) -> Result<(), DI> {
        self.send_command(Command::Bias(bias))
    }

    /// Software reset; the cursor is forgotten
    ///
    /// Display RAM is kept, but the display mode registers return to their
    /// defaults, so the panel is off until `initialize()` runs again. The
    /// same holds for `send_command(Command::Reset)`.
    pub fn software_reset(&mut self) -> Result<(), DI> {
        self.send_command(Command::Reset)
    }

    pub fn nop(&mut self) -> Result<(), DI> {
        self.send_command(Command::Nop)
    }

    /// Release the interface and reset pin
    pub fn release(self) -> (DI, RST) {
        (self.interface, self.reset)
    }
}
