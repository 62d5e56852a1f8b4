//! Simulated ST7565 for host-side testing
//!
//! [`Simulator`] hands out a bus, three pins and a delay that all feed one
//! shared [`SimState`]. The state records every framed byte and decodes the
//! command stream into an emulated display RAM, so a test can check both
//! the exact bytes a driver sent and what the panel would show.
//!
//! Only the write path of the controller is modelled: page and column
//! addressing with column auto-increment, the display mode registers and
//! electronic volume. Bytes clocked while chip-select is released are
//! counted as framing faults and otherwise ignored.

use core::cell::{Ref, RefCell};

use heapless::Vec;
use monolcd_hal::{DelayMs, OutputPin, SpiBus};

use crate::command::opcode;
use crate::config::Geometry;

/// Maximum number of recorded events
pub const LOG_CAPACITY: usize = 8192;

/// Columns in the emulated display RAM
pub const RAM_COLUMNS: usize = Geometry::MAX_WIDTH;

/// Pages in the emulated display RAM
pub const RAM_PAGES: usize = Geometry::MAX_PAGES;

/// One recorded bus or pin event
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Event {
    /// Byte sent with A0 low
    Command(u8),
    /// Byte sent with A0 high
    Data(u8),
    /// Reset line asserted (`true`) or released
    Reset(bool),
    /// Blocking delay in milliseconds
    Delay(u32),
}

/// Injected bus failure
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SimError;

/// Output line driven by a [`SimPin`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Line {
    ChipSelect,
    DataCommand,
    Reset,
}

/// Controller registers and RAM plus the event log
pub struct SimState {
    events: Vec<Event, LOG_CAPACITY>,
    overflowed: bool,
    cs_low: bool,
    a0_high: bool,
    reset_low: bool,
    unframed: usize,
    transfers: usize,
    fail_after: Option<usize>,
    ram: [[u8; RAM_COLUMNS]; RAM_PAGES],
    page: u8,
    column: u8,
    volume_pending: bool,
    contrast: u8,
    display_on: bool,
    inverted: bool,
    all_on: bool,
    start_line: u8,
    resets: usize,
}

impl SimState {
    fn new() -> Self {
        Self {
            events: Vec::new(),
            overflowed: false,
            cs_low: false,
            a0_high: false,
            reset_low: false,
            unframed: 0,
            transfers: 0,
            fail_after: None,
            ram: [[0; RAM_COLUMNS]; RAM_PAGES],
            page: 0,
            column: 0,
            volume_pending: false,
            contrast: 0x20,
            display_on: false,
            inverted: false,
            all_on: false,
            start_line: 0,
            resets: 0,
        }
    }

    fn record(&mut self, event: Event) {
        if self.events.push(event).is_err() {
            self.overflowed = true;
        }
    }

    /// Power-on register state; RAM content is kept
    fn reset_registers(&mut self) {
        self.page = 0;
        self.column = 0;
        self.volume_pending = false;
        self.display_on = false;
        self.inverted = false;
        self.all_on = false;
        self.start_line = 0;
        self.resets += 1;
    }

    fn clock_byte(&mut self, byte: u8) -> Result<(), SimError> {
        if let Some(limit) = self.fail_after {
            if self.transfers >= limit {
                return Err(SimError);
            }
        }
        self.transfers += 1;

        if !self.cs_low || self.reset_low {
            self.unframed += 1;
            return Ok(());
        }

        if self.a0_high {
            self.record(Event::Data(byte));
            self.write_ram(byte);
        } else {
            self.record(Event::Command(byte));
            self.execute(byte);
        }
        Ok(())
    }

    fn write_ram(&mut self, byte: u8) {
        let (page, column) = (self.page as usize, self.column as usize);
        if page < RAM_PAGES && column < RAM_COLUMNS {
            self.ram[page][column] = byte;
        }
        // Column counter stops at the last RAM column; pages never wrap
        if column + 1 < RAM_COLUMNS {
            self.column += 1;
        }
    }

    fn execute(&mut self, byte: u8) {
        if self.volume_pending {
            self.volume_pending = false;
            self.contrast = byte & 0x3F;
            return;
        }

        match byte {
            opcode::RESET => self.reset_registers(),
            opcode::DISPLAY_ON => self.display_on = true,
            opcode::DISPLAY_OFF => self.display_on = false,
            opcode::DISPLAY_NORMAL => self.inverted = false,
            opcode::DISPLAY_INVERSE => self.inverted = true,
            opcode::DISPLAY_ALL_ON => self.all_on = true,
            opcode::DISPLAY_ALL_OFF => self.all_on = false,
            opcode::ENTER_VOLUME_MODE => self.volume_pending = true,
            0xB0..=0xBF => self.page = byte & 0x0F,
            0x10..=0x1F => self.column = (self.column & 0x0F) | ((byte & 0x0F) << 4),
            0x00..=0x0F => self.column = (self.column & 0xF0) | (byte & 0x0F),
            0x40..=0x7F => self.start_line = byte & 0x3F,
            // Orientation, bias, power and regulator do not affect RAM
            _ => {}
        }
    }

    /// Recorded events, oldest first
    pub fn events(&self) -> &[Event] {
        &self.events
    }

    /// Whether events were dropped because the log was full
    pub fn overflowed(&self) -> bool {
        self.overflowed
    }

    /// Command bytes only, in order
    pub fn commands(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::Command(b) => Some(*b),
            _ => None,
        })
    }

    /// Data bytes only, in order
    pub fn data(&self) -> impl Iterator<Item = u8> + '_ {
        self.events.iter().filter_map(|e| match e {
            Event::Data(b) => Some(*b),
            _ => None,
        })
    }

    /// Whether chip-select is currently asserted
    pub fn is_selected(&self) -> bool {
        self.cs_low
    }

    /// Bytes clocked with chip-select released or reset asserted
    pub fn unframed_bytes(&self) -> usize {
        self.unframed
    }

    /// One page of display RAM
    pub fn ram_page(&self, page: usize) -> &[u8; RAM_COLUMNS] {
        &self.ram[page]
    }

    /// The RAM columns a `width`-pixel module shows, page by page
    pub fn visible_ram(&self, width: usize, pages: usize) -> impl Iterator<Item = u8> + '_ {
        self.ram[..pages]
            .iter()
            .flat_map(move |page| page[..width].iter().copied())
    }

    /// Current controller cursor as `(page, column)`
    pub fn cursor(&self) -> (u8, u8) {
        (self.page, self.column)
    }

    pub fn contrast(&self) -> u8 {
        self.contrast
    }

    pub fn display_on(&self) -> bool {
        self.display_on
    }

    pub fn inverted(&self) -> bool {
        self.inverted
    }

    pub fn all_pixels_on(&self) -> bool {
        self.all_on
    }

    pub fn start_line(&self) -> u8 {
        self.start_line
    }

    /// Number of hardware or software resets seen
    pub fn resets(&self) -> usize {
        self.resets
    }
}

/// Shared simulated controller
pub struct Simulator {
    state: RefCell<SimState>,
}

impl Default for Simulator {
    fn default() -> Self {
        Self::new()
    }
}

impl Simulator {
    pub fn new() -> Self {
        Self {
            state: RefCell::new(SimState::new()),
        }
    }

    /// SPI bus connected to the controller
    pub fn bus(&self) -> SimBus<'_> {
        SimBus { sim: self }
    }

    /// Chip-select line (active-low)
    pub fn chip_select(&self) -> SimPin<'_> {
        self.pin(Line::ChipSelect)
    }

    /// A0 line (low = command)
    pub fn data_command(&self) -> SimPin<'_> {
        self.pin(Line::DataCommand)
    }

    /// Reset line (active-low)
    pub fn reset(&self) -> SimPin<'_> {
        self.pin(Line::Reset)
    }

    /// Any output line
    pub fn pin(&self, line: Line) -> SimPin<'_> {
        SimPin { sim: self, line }
    }

    /// Delay that is recorded instead of waited
    pub fn delay(&self) -> SimDelay<'_> {
        SimDelay { sim: self }
    }

    /// Borrow the current state
    pub fn state(&self) -> Ref<'_, SimState> {
        self.state.borrow()
    }

    /// Borrow the event log
    pub fn events(&self) -> Ref<'_, [Event]> {
        Ref::map(self.state.borrow(), |s| s.events())
    }

    /// Drop recorded events, keeping controller state
    pub fn clear_events(&self) {
        let mut state = self.state.borrow_mut();
        state.events.clear();
        state.overflowed = false;
    }

    /// Fail every transfer after `n` more successful ones
    pub fn fail_after(&self, n: usize) {
        let mut state = self.state.borrow_mut();
        state.fail_after = Some(state.transfers + n);
    }

    /// Stop injecting failures
    pub fn heal(&self) {
        self.state.borrow_mut().fail_after = None;
    }
}

/// Simulated SPI bus
pub struct SimBus<'a> {
    sim: &'a Simulator,
}

impl SpiBus for SimBus<'_> {
    type Error = SimError;

    fn write(&mut self, data: &[u8]) -> Result<(), SimError> {
        let mut state = self.sim.state.borrow_mut();
        for &byte in data {
            state.clock_byte(byte)?;
        }
        Ok(())
    }

    fn transfer_in_place(&mut self, data: &mut [u8]) -> Result<(), SimError> {
        let mut state = self.sim.state.borrow_mut();
        for byte in data.iter_mut() {
            state.clock_byte(*byte)?;
            // The serial interface is write-only
            *byte = 0;
        }
        Ok(())
    }
}

/// Simulated output line
pub struct SimPin<'a> {
    sim: &'a Simulator,
    line: Line,
}

impl OutputPin for SimPin<'_> {
    fn set_high(&mut self) {
        let mut state = self.sim.state.borrow_mut();
        match self.line {
            Line::ChipSelect => state.cs_low = false,
            Line::DataCommand => state.a0_high = true,
            Line::Reset => {
                if state.reset_low {
                    state.reset_low = false;
                    state.record(Event::Reset(false));
                }
            }
        }
    }

    fn set_low(&mut self) {
        let mut state = self.sim.state.borrow_mut();
        match self.line {
            Line::ChipSelect => state.cs_low = true,
            Line::DataCommand => state.a0_high = false,
            Line::Reset => {
                if !state.reset_low {
                    state.reset_low = true;
                    state.record(Event::Reset(true));
                    state.reset_registers();
                }
            }
        }
    }
}

/// Simulated delay
pub struct SimDelay<'a> {
    sim: &'a Simulator,
}

impl DelayMs for SimDelay<'_> {
    fn delay_ms(&mut self, ms: u32) {
        self.sim.state.borrow_mut().record(Event::Delay(ms));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_column_auto_increment_within_page() {
        let sim = Simulator::new();
        let mut bus = sim.bus();
        let mut cs = sim.chip_select();
        let mut a0 = sim.data_command();

        cs.set_low();
        a0.set_low();
        bus.write(&[0xB2, 0x10, 0x05]).unwrap();
        a0.set_high();
        bus.write(&[0xAA, 0xBB]).unwrap();
        cs.set_high();

        let state = sim.state();
        assert_eq!(state.ram_page(2)[5], 0xAA);
        assert_eq!(state.ram_page(2)[6], 0xBB);
        assert_eq!(state.cursor(), (2, 7));
    }

    #[test]
    fn test_column_counter_stops_at_last_column() {
        let sim = Simulator::new();
        let mut bus = sim.bus();
        let mut cs = sim.chip_select();
        let mut a0 = sim.data_command();

        cs.set_low();
        a0.set_low();
        // Page 0, column 131
        bus.write(&[0xB0, 0x18, 0x03]).unwrap();
        a0.set_high();
        bus.write(&[0x01, 0x02]).unwrap();
        cs.set_high();

        let state = sim.state();
        assert_eq!(state.ram_page(0)[131], 0x02);
        assert_eq!(state.ram_page(1)[0], 0x00);
        assert_eq!(state.cursor(), (0, 131));
    }

    #[test]
    fn test_volume_value_is_not_decoded_as_opcode() {
        let sim = Simulator::new();
        let mut bus = sim.bus();
        let mut cs = sim.chip_select();
        let mut a0 = sim.data_command();

        cs.set_low();
        a0.set_low();
        bus.write(&[0xB3, 0x81, 0x05]).unwrap();
        cs.set_high();

        let state = sim.state();
        assert_eq!(state.contrast(), 0x05);
        // 0x05 would otherwise have been a column-low command
        assert_eq!(state.cursor(), (3, 0));
    }

    #[test]
    fn test_unframed_bytes_are_ignored() {
        let sim = Simulator::new();
        let mut bus = sim.bus();

        bus.write(&[0xAF]).unwrap();

        let state = sim.state();
        assert_eq!(state.unframed_bytes(), 1);
        assert!(state.events().is_empty());
        assert!(!state.display_on());
    }

    #[test]
    fn test_reset_line_records_edges_once() {
        let sim = Simulator::new();
        let mut rst = sim.reset();
        let mut delay = sim.delay();

        rst.set_low();
        rst.set_low();
        delay.delay_ms(50);
        rst.set_high();

        assert_eq!(
            &sim.events()[..],
            &[Event::Reset(true), Event::Delay(50), Event::Reset(false)]
        );
        assert_eq!(sim.state().resets(), 1);
    }

    #[test]
    fn test_failure_injection() {
        let sim = Simulator::new();
        let mut bus = sim.bus();
        let mut cs = sim.chip_select();
        cs.set_low();

        sim.fail_after(2);
        assert_eq!(bus.write(&[0xE3, 0xE3, 0xE3]), Err(SimError));
        assert_eq!(sim.events().len(), 2);

        sim.heal();
        assert_eq!(bus.write(&[0xE3]), Ok(()));
    }
}
