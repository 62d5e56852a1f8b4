//! ST7565 command set
//!
//! Every byte sent with the command/data line low is one of the opcodes
//! below, or a base opcode with a small parameter OR-ed into its low bits.
//! The values are the controller's wire contract and must stay bit-exact.
//!
//! The one exception is the contrast value that follows
//! [`opcode::ENTER_VOLUME_MODE`]: it travels in command mode but is a raw
//! parameter, not an opcode.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Raw opcode values
pub mod opcode {
    /// Software reset
    pub const RESET: u8 = 0xE2;
    /// No operation
    pub const NOP: u8 = 0xE3;

    /// Turn display on (pixels visible)
    pub const DISPLAY_ON: u8 = 0xAF;
    /// Turn display off (pixels hidden, RAM preserved)
    pub const DISPLAY_OFF: u8 = 0xAE;
    /// Normal polarity
    pub const DISPLAY_NORMAL: u8 = 0xA6;
    /// Inverse polarity
    pub const DISPLAY_INVERSE: u8 = 0xA7;
    /// Force every pixel on, RAM untouched
    pub const DISPLAY_ALL_ON: u8 = 0xA5;
    /// Leave forced all-on mode
    pub const DISPLAY_ALL_OFF: u8 = 0xA4;

    /// Segment (column) scan left to right
    pub const SEG_DIR_NORMAL: u8 = 0xA0;
    /// Segment (column) scan right to left
    pub const SEG_DIR_REVERSE: u8 = 0xA1;
    /// COM (row) scan top to bottom
    pub const COM_SCAN_NORMAL: u8 = 0xC0;
    /// COM (row) scan bottom to top
    pub const COM_SCAN_REVERSE: u8 = 0xC8;

    /// LCD bias 1/9
    pub const BIAS_1_9: u8 = 0xA2;
    /// LCD bias 1/7
    pub const BIAS_1_7: u8 = 0xA3;

    /// Display start line base, OR with 0-63
    pub const SET_START_LINE: u8 = 0x40;
    /// Page address base, OR with 0-7
    pub const SET_PAGE: u8 = 0xB0;
    /// Column address high nibble base
    pub const SET_COLUMN_HIGH: u8 = 0x10;
    /// Column address low nibble base
    pub const SET_COLUMN_LOW: u8 = 0x00;

    /// Electronic volume mode; the next command byte is the contrast value
    pub const ENTER_VOLUME_MODE: u8 = 0x81;

    /// Power control base, OR with the POWER_* bits
    pub const POWER_CTRL: u8 = 0x28;
    /// Booster circuit enable bit
    pub const POWER_BOOSTER: u8 = 0x04;
    /// Voltage regulator enable bit
    pub const POWER_REGULATOR: u8 = 0x02;
    /// Voltage follower enable bit
    pub const POWER_FOLLOWER: u8 = 0x01;
    /// Booster, regulator and follower all enabled
    pub const POWER_ALL_ON: u8 = 0x2F;

    /// Regulator resistor ratio base, OR with 0-7
    pub const REG_RESISTOR: u8 = 0x20;
    /// Mid-range regulator resistor ratio
    pub const REG_RESISTOR_MID: u8 = 0x26;
}

/// Lowest contrast value
pub const CONTRAST_MIN: u8 = 0x00;
/// Factory mid-point contrast value
pub const CONTRAST_MID: u8 = 0x1F;
/// Highest contrast value
pub const CONTRAST_MAX: u8 = 0x3F;

/// Highest page the addressing commands accept
pub const MAX_PAGE: u8 = 7;
/// Highest display start line
pub const MAX_START_LINE: u8 = 63;
/// Highest regulator resistor ratio
pub const MAX_REGULATOR_RATIO: u8 = 7;

/// LCD bias ratio
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum Bias {
    /// 1/9 bias (1/65 duty modules)
    #[default]
    OneNinth,
    /// 1/7 bias (1/33 duty modules)
    OneSeventh,
}

/// Column mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum SegmentDirection {
    Normal,
    #[default]
    Reverse,
}

/// Row mirroring
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub enum ComScanDirection {
    Normal,
    #[default]
    Reverse,
}

/// Internal power circuit selection
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
pub struct PowerControl {
    pub booster: bool,
    pub regulator: bool,
    pub follower: bool,
}

impl PowerControl {
    /// Everything on, the only mode used at power-up
    pub const ALL_ON: Self = Self {
        booster: true,
        regulator: true,
        follower: true,
    };

    /// Everything off
    pub const ALL_OFF: Self = Self {
        booster: false,
        regulator: false,
        follower: false,
    };

    const fn bits(self) -> u8 {
        let mut bits = 0;
        if self.booster {
            bits |= opcode::POWER_BOOSTER;
        }
        if self.regulator {
            bits |= opcode::POWER_REGULATOR;
        }
        if self.follower {
            bits |= opcode::POWER_FOLLOWER;
        }
        bits
    }
}

/// A single command byte
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Command {
    /// Software reset
    Reset,
    /// No operation
    Nop,
    /// Display on (`true`) or off
    Display(bool),
    /// Inverse (`true`) or normal polarity
    Inverse(bool),
    /// Force all pixels on (`true`) or show RAM
    AllPixelsOn(bool),
    /// Column mirroring
    SegmentDirection(SegmentDirection),
    /// Row mirroring
    ComScan(ComScanDirection),
    /// LCD bias ratio
    Bias(Bias),
    /// Power circuit selection
    PowerControl(PowerControl),
    /// Regulator resistor ratio (0-7)
    RegulatorResistor(u8),
    /// Enter electronic volume mode
    EnterVolumeMode,
    /// Contrast value following [`Command::EnterVolumeMode`] (0-63)
    VolumeValue(u8),
    /// Page address (0-7)
    Page(u8),
    /// Column address high nibble (0-15)
    ColumnHigh(u8),
    /// Column address low nibble (0-15)
    ColumnLow(u8),
    /// Display start line (0-63)
    StartLine(u8),
}

impl Command {
    /// Encode to the wire byte
    ///
    /// Returns `None` if a parameter does not fit its opcode field.
    pub const fn encode(self) -> Option<u8> {
        let byte = match self {
            Command::Reset => opcode::RESET,
            Command::Nop => opcode::NOP,
            Command::Display(true) => opcode::DISPLAY_ON,
            Command::Display(false) => opcode::DISPLAY_OFF,
            Command::Inverse(true) => opcode::DISPLAY_INVERSE,
            Command::Inverse(false) => opcode::DISPLAY_NORMAL,
            Command::AllPixelsOn(true) => opcode::DISPLAY_ALL_ON,
            Command::AllPixelsOn(false) => opcode::DISPLAY_ALL_OFF,
            Command::SegmentDirection(SegmentDirection::Normal) => opcode::SEG_DIR_NORMAL,
            Command::SegmentDirection(SegmentDirection::Reverse) => opcode::SEG_DIR_REVERSE,
            Command::ComScan(ComScanDirection::Normal) => opcode::COM_SCAN_NORMAL,
            Command::ComScan(ComScanDirection::Reverse) => opcode::COM_SCAN_REVERSE,
            Command::Bias(Bias::OneNinth) => opcode::BIAS_1_9,
            Command::Bias(Bias::OneSeventh) => opcode::BIAS_1_7,
            Command::PowerControl(power) => opcode::POWER_CTRL | power.bits(),
            Command::RegulatorResistor(ratio) => {
                if ratio > MAX_REGULATOR_RATIO {
                    return None;
                }
                opcode::REG_RESISTOR | ratio
            }
            Command::EnterVolumeMode => opcode::ENTER_VOLUME_MODE,
            Command::VolumeValue(value) => {
                if value > CONTRAST_MAX {
                    return None;
                }
                value
            }
            Command::Page(page) => {
                if page > MAX_PAGE {
                    return None;
                }
                opcode::SET_PAGE | page
            }
            Command::ColumnHigh(nibble) => {
                if nibble > 0x0F {
                    return None;
                }
                opcode::SET_COLUMN_HIGH | nibble
            }
            Command::ColumnLow(nibble) => {
                if nibble > 0x0F {
                    return None;
                }
                opcode::SET_COLUMN_LOW | nibble
            }
            Command::StartLine(line) => {
                if line > MAX_START_LINE {
                    return None;
                }
                opcode::SET_START_LINE | line
            }
        };
        Some(byte)
    }

    /// The three commands that point the controller cursor at `(page, column)`
    ///
    /// Page first, then the column high and low nibbles.
    pub const fn cursor(page: u8, column: u8) -> [Command; 3] {
        [
            Command::Page(page),
            Command::ColumnHigh(column >> 4),
            Command::ColumnLow(column & 0x0F),
        ]
    }
}
