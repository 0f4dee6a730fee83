//! Core display operations
//!
//! [`Display`] owns a [`DisplayInterface`] and knows the controller's
//! register program: the one-time init sequence, the addressing window
//! and the full-frame data burst.

use alloc::vec::Vec;

use log::{debug, warn};

use crate::command::{
    ADDRESSING_HORIZONTAL, CONTROL_DATA, COM_SCAN_NORMAL, COM_SCAN_REVERSED, CHARGE_PUMP, DISPLAY_OFF,
    DISPLAY_ON, DISPLAY_RESUME_RAM, NORMAL_DISPLAY, SEGMENT_REMAP_NORMAL, SEGMENT_REMAP_REVERSED,
    SET_CLOCK_DIVIDER, SET_COLUMN_ADDRESS, SET_COM_PINS, SET_CONTRAST, SET_DISPLAY_OFFSET,
    SET_MEMORY_ADDRESSING_MODE, SET_MULTIPLEX_RATIO, SET_PAGE_ADDRESS, SET_START_LINE,
};
use crate::config::{Config, InitPolicy};
use crate::error::Error;
use crate::interface::DisplayInterface;
use crate::registry::Resource;

type DisplayResult<I> = core::result::Result<(), Error<I>>;

/// Length of the register program sent before the first frame
pub const INIT_PROGRAM_LEN: usize = 20;

/// Length of the addressing window program
pub const WINDOW_PROGRAM_LEN: usize = 6;

/// Largest frame the controller's GDDRAM can hold
const MAX_BUFFER_SIZE: usize = 128 * 64 / 8;

/// All-zero full frame, data envelope in place
static BLANK_BURST: [u8; MAX_BUFFER_SIZE + 1] = blank_burst();

const fn blank_burst() -> [u8; MAX_BUFFER_SIZE + 1] {
    let mut burst = [0; MAX_BUFFER_SIZE + 1];
    burst[0] = CONTROL_DATA;
    burst
}

/// Reserve a burst for `len` payload bytes with [`CONTROL_DATA`] at offset 0
///
/// Fails with [`Error::Allocation`] for [`Resource::StagingBuffer`] if the
/// buffer cannot be reserved.
pub(crate) fn stage_burst<I: DisplayInterface>(len: usize) -> Result<Vec<u8>, Error<I>> {
    let staging_failed = || Error::Allocation(Resource::StagingBuffer);
    let capacity = len.checked_add(1).ok_or_else(staging_failed)?;

    let mut burst = Vec::new();
    burst
        .try_reserve_exact(capacity)
        .map_err(|_| staging_failed())?;
    burst.push(CONTROL_DATA);
    Ok(burst)
}

/// Core display driver for SSD1306
///
/// This struct sequences commands and pixel bursts over a
/// [`DisplayInterface`]. It holds no pixel buffer of its own.
pub struct Display<I>
where
    I: DisplayInterface,
{
    /// Hardware interface
    interface: I,
    /// Display configuration
    config: Config,
    /// Whether the panel has been switched on
    is_display_on: bool,
}

impl<I> Display<I>
where
    I: DisplayInterface,
{
    /// Create a new Display instance
    pub fn new(interface: I, config: Config) -> Self {
        Self {
            interface,
            config,
            is_display_on: false,
        }
    }

    /// Bring the controller from reset to a blank, visible panel
    ///
    /// Sends the register program, programs the full-panel window, blanks
    /// GDDRAM with one burst and switches the panel on. Failure handling
    /// follows [`Config::init_policy`]:
    /// - [`InitPolicy::AbortOnError`]: returns at the first failed write
    /// - [`InitPolicy::BestEffort`]: logs each failed write, sends every
    ///   remaining step, and returns `Ok`
    pub fn init(&mut self) -> DisplayResult<I> {
        for byte in self.init_program() {
            self.init_step(|interface| interface.send_command(byte))?;
        }

        for byte in self.window_program() {
            self.init_step(|interface| interface.send_command(byte))?;
        }

        // Overwrite power-on noise before the panel is lit
        let burst = &BLANK_BURST[..=self.blank_frame_len()];
        self.init_step(|interface| interface.send_burst(burst))?;

        self.init_step(|interface| interface.send_command(DISPLAY_ON))?;
        self.is_display_on = true;

        Ok(())
    }

    /// Register program for the configured panel, in send order
    pub fn init_program(&self) -> [u8; INIT_PROGRAM_LEN] {
        let config = &self.config;
        [
            DISPLAY_OFF,
            SET_CLOCK_DIVIDER,
            config.clock_divider,
            SET_MULTIPLEX_RATIO,
            config.dimensions.rows.saturating_sub(1),
            SET_DISPLAY_OFFSET,
            config.display_offset,
            SET_START_LINE | (config.start_line & 0x3F),
            CHARGE_PUMP,
            config.charge_pump,
            SET_MEMORY_ADDRESSING_MODE,
            ADDRESSING_HORIZONTAL,
            if config.segment_remap {
                SEGMENT_REMAP_REVERSED
            } else {
                SEGMENT_REMAP_NORMAL
            },
            if config.com_scan_reversed {
                COM_SCAN_REVERSED
            } else {
                COM_SCAN_NORMAL
            },
            SET_COM_PINS,
            config.com_pins,
            SET_CONTRAST,
            config.contrast,
            DISPLAY_RESUME_RAM,
            NORMAL_DISPLAY,
        ]
    }

    /// Addressing window covering the whole panel, in send order
    pub fn window_program(&self) -> [u8; WINDOW_PROGRAM_LEN] {
        let dims = &self.config.dimensions;
        [
            SET_COLUMN_ADDRESS,
            0,
            dims.cols.saturating_sub(1),
            SET_PAGE_ADDRESS,
            0,
            dims.pages().saturating_sub(1),
        ]
    }

    /// Point the write cursor at the panel origin
    ///
    /// The cursor auto-wraps inside the window, so it is not guaranteed to
    /// be at the origin between bursts.
    pub fn reset_window(&mut self) -> DisplayResult<I> {
        for byte in self.window_program() {
            self.send_command(byte)?;
        }
        Ok(())
    }

    /// Write a frame starting at the panel origin
    ///
    /// Stages `[CONTROL_DATA, frame...]`, resets the addressing window, then
    /// sends the staged buffer as one data burst. The length is not checked
    /// against the panel: an empty frame sends only the data control byte,
    /// and an oversized frame wraps inside the window.
    ///
    /// Returns the number of bytes accepted, which is always `frame.len()`.
    /// On error no byte count is reported. If the staging buffer cannot be
    /// allocated nothing is sent.
    pub fn transfer(&mut self, frame: &[u8]) -> Result<usize, Error<I>> {
        let mut burst = stage_burst(frame.len())?;
        burst.extend_from_slice(frame);
        self.transfer_burst(&burst)
    }

    /// Send a frame already staged behind [`CONTROL_DATA`]
    ///
    /// Resets the addressing window and sends `burst` unchanged. Returns the
    /// payload length.
    pub(crate) fn transfer_burst(&mut self, burst: &[u8]) -> Result<usize, Error<I>> {
        self.reset_window()?;

        let len = burst.len().saturating_sub(1);
        debug!("ssd1306: burst sending {} bytes", len);
        self.interface.send_burst(burst).map_err(Error::Interface)?;

        Ok(len)
    }

    /// Send `data` to GDDRAM at the current cursor as one framed burst
    pub fn send_data(&mut self, data: &[u8]) -> DisplayResult<I> {
        let mut burst = stage_burst(data.len())?;
        burst.extend_from_slice(data);
        self.interface.send_burst(&burst).map_err(Error::Interface)
    }

    /// Blank the whole panel
    pub fn clear(&mut self) -> DisplayResult<I> {
        let len = self.blank_frame_len();
        self.transfer_burst(&BLANK_BURST[..=len])?;
        Ok(())
    }

    /// Switch the panel on
    pub fn display_on(&mut self) -> DisplayResult<I> {
        self.send_command(DISPLAY_ON)?;
        self.is_display_on = true;
        Ok(())
    }

    /// Switch the panel off (sleep mode, GDDRAM retained)
    pub fn display_off(&mut self) -> DisplayResult<I> {
        self.send_command(DISPLAY_OFF)?;
        self.is_display_on = false;
        Ok(())
    }

    /// Whether the last power command switched the panel on
    pub fn is_display_on(&self) -> bool {
        self.is_display_on
    }

    /// Get display dimensions
    pub fn dimensions(&self) -> &crate::config::Dimensions {
        &self.config.dimensions
    }

    /// Access the underlying configuration
    pub fn config(&self) -> &Config {
        &self.config
    }

    /// Give back the interface
    pub fn release(self) -> I {
        self.interface
    }

    fn blank_frame_len(&self) -> usize {
        self.config.dimensions.buffer_size().min(MAX_BUFFER_SIZE)
    }

    fn init_step<F>(&mut self, step: F) -> DisplayResult<I>
    where
        F: FnOnce(&mut I) -> Result<(), I::Error>,
    {
        match step(&mut self.interface) {
            Ok(()) => Ok(()),
            Err(e) => match self.config.init_policy {
                InitPolicy::AbortOnError => Err(Error::Interface(e)),
                InitPolicy::BestEffort => {
                    warn!("ssd1306: init write failed, continuing: {e:?}");
                    Ok(())
                }
            },
        }
    }

    /// Send a command to the display controller
    fn send_command(&mut self, cmd: u8) -> DisplayResult<I> {
        self.interface.send_command(cmd).map_err(Error::Interface)
    }
}
