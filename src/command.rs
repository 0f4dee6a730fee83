//! SSD1306 command definitions
//!
//! This module defines the command bytes used to program the SSD1306 OLED
//! controller, plus the two control bytes that frame every I2C transaction.
//!
//! ## Transaction Structure
//!
//! Over I2C the controller has no D/C pin. Instead the first byte after the
//! address selects how the rest of the write is interpreted:
//!
//! 1. START + slave address (write)
//! 2. Control byte: [`CONTROL_COMMAND`] or [`CONTROL_DATA`]
//! 3. Payload bytes
//! 4. STOP
//!
//! A command and its parameters are sent as separate command transactions,
//! one byte each. Pixel data is staged behind its control byte and sent as a
//! single data write.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ssd1306::{command, DisplayInterface, I2cInterface};
//! # use core::convert::Infallible;
//! # use embedded_hal::i2c::{I2c, Operation, SevenBitAddress};
//! # struct MockI2c;
//! # impl embedded_hal::i2c::ErrorType for MockI2c { type Error = Infallible; }
//! # impl I2c<SevenBitAddress> for MockI2c {
//! #     fn transaction(
//! #         &mut self,
//! #         _address: u8,
//! #         _operations: &mut [Operation<'_>],
//! #     ) -> Result<(), Self::Error> {
//! #         Ok(())
//! #     }
//! # }
//! # let mut interface = I2cInterface::new(MockI2c, 0x3C);
//! // Turn the panel off
//! let _ = interface.send_command(command::DISPLAY_OFF);
//!
//! // Stream pixels into GDDRAM at the current cursor
//! let _ = interface.send_burst(&[command::CONTROL_DATA, 0xFF, 0xFF, 0xFF, 0xFF]);
//! ```

// Control bytes

/// Control byte announcing a command stream (Co = 0, D/C# = 0)
pub const CONTROL_COMMAND: u8 = 0x00;

/// Control byte announcing a data stream (Co = 0, D/C# = 1)
pub const CONTROL_DATA: u8 = 0x40;

// Fundamental commands

/// Set contrast control command (0x81)
///
/// Requires 1 parameter byte: contrast 0x00..=0xFF.
pub const SET_CONTRAST: u8 = 0x81;

/// Resume to RAM content display (0xA4)
///
/// Output follows GDDRAM content.
pub const DISPLAY_RESUME_RAM: u8 = 0xA4;

/// Entire display on (0xA5)
///
/// Output ignores GDDRAM content. Not used by the init program.
pub const DISPLAY_ALL_ON: u8 = 0xA5;

/// Normal display (0xA6)
///
/// Bit=1 in GDDRAM lights the pixel.
pub const NORMAL_DISPLAY: u8 = 0xA6;

/// Inverse display (0xA7)
pub const INVERSE_DISPLAY: u8 = 0xA7;

/// Display off, sleep mode (0xAE)
pub const DISPLAY_OFF: u8 = 0xAE;

/// Display on, normal mode (0xAF)
pub const DISPLAY_ON: u8 = 0xAF;

// Addressing commands

/// Set memory addressing mode command (0x20)
///
/// Requires 1 parameter byte, see [`ADDRESSING_HORIZONTAL`].
pub const SET_MEMORY_ADDRESSING_MODE: u8 = 0x20;

/// Horizontal addressing: column pointer wraps to the next page
pub const ADDRESSING_HORIZONTAL: u8 = 0x00;

/// Vertical addressing: page pointer wraps to the next column
pub const ADDRESSING_VERTICAL: u8 = 0x01;

/// Page addressing (reset default)
pub const ADDRESSING_PAGE: u8 = 0x02;

/// Set column address range command (0x21)
///
/// Requires 2 parameter bytes: [start column, end column], each 0..=127.
/// Only valid in horizontal or vertical addressing mode.
pub const SET_COLUMN_ADDRESS: u8 = 0x21;

/// Set page address range command (0x22)
///
/// Requires 2 parameter bytes: [start page, end page], each 0..=7.
/// Only valid in horizontal or vertical addressing mode.
pub const SET_PAGE_ADDRESS: u8 = 0x22;

// Hardware configuration commands

/// Set display start line (0x40..=0x7F)
///
/// The start line (0..=63) is OR'd into the low 6 bits.
pub const SET_START_LINE: u8 = 0x40;

/// Segment remap: column 0 mapped to SEG0 (0xA0)
pub const SEGMENT_REMAP_NORMAL: u8 = 0xA0;

/// Segment remap: column 127 mapped to SEG0 (0xA1)
pub const SEGMENT_REMAP_REVERSED: u8 = 0xA1;

/// Set multiplex ratio command (0xA8)
///
/// Requires 1 parameter byte: panel rows - 1 (15..=63).
pub const SET_MULTIPLEX_RATIO: u8 = 0xA8;

/// COM output scan direction: COM0 to COM[N-1] (0xC0)
pub const COM_SCAN_NORMAL: u8 = 0xC0;

/// COM output scan direction: COM[N-1] to COM0 (0xC8)
pub const COM_SCAN_REVERSED: u8 = 0xC8;

/// Set display offset command (0xD3)
///
/// Requires 1 parameter byte: vertical shift 0..=63.
pub const SET_DISPLAY_OFFSET: u8 = 0xD3;

/// Set COM pins hardware configuration command (0xDA)
///
/// Requires 1 parameter byte. 0x12 (alternative, no remap) suits 128x64
/// panels, 0x02 (sequential) suits 128x32 panels.
pub const SET_COM_PINS: u8 = 0xDA;

// Timing and driving commands

/// Set display clock divide ratio / oscillator frequency command (0xD5)
///
/// Requires 1 parameter byte: high nibble frequency, low nibble divide ratio - 1.
pub const SET_CLOCK_DIVIDER: u8 = 0xD5;

/// Charge pump setting command (0x8D)
///
/// Requires 1 parameter byte: 0x14 = enable, 0x10 = disable.
pub const CHARGE_PUMP: u8 = 0x8D;

/// Charge pump enabled parameter
pub const CHARGE_PUMP_ENABLE: u8 = 0x14;

/// Charge pump disabled parameter
pub const CHARGE_PUMP_DISABLE: u8 = 0x10;
