//! Hardware interface abstraction
//!
//! This module provides the [`DisplayInterface`] trait and the [`I2cInterface`] struct
//! for communicating with the SSD1306 controller over I2C.
//!
//! ## Framing
//!
//! Every bus write starts with a control byte:
//! - [`CONTROL_COMMAND`] (`0x00`): the rest of the write is a command stream
//! - [`CONTROL_DATA`] (`0x40`): the rest of the write goes to GDDRAM
//!
//! A command and a data payload are never combined in one write. A data
//! burst is staged with its control byte in front and sent as one write.
//!
//! ## Example
//!
//! ```rust,no_run
//! use ssd1306::{DisplayInterface, I2cInterface};
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
//! // Create interface for a panel strapped to 0x3C
//! let mut interface = I2cInterface::new(MockI2c, 0x3C);
//!
//! // Send command
//! let _ = interface.send_command(0xAF); // Display on
//!
//! // Send a staged data burst
//! let _ = interface.send_burst(&[0x40, 0xFF, 0x00, 0xFF]);
//! ```

use core::fmt::Debug;
use embedded_hal::i2c::{I2c, SevenBitAddress};

use crate::command::{CONTROL_COMMAND, CONTROL_DATA};

type InterfaceResult<T, E> = core::result::Result<T, E>;

/// Default 7-bit bus address of SSD1306 modules (SA0 low)
pub const DEFAULT_ADDRESS: u8 = 0x3C;

/// Trait for hardware interface to SSD1306 controller
///
/// This trait abstracts over the transport so that the
/// [`Display`](crate::display::Display) can be driven by any implementation
/// that frames commands and data the way the controller expects.
///
/// Each method must result in exactly one bus transaction and must not retry.
pub trait DisplayInterface {
    /// Error type for interface operations
    ///
    /// Must implement [`Debug`] for error reporting.
    type Error: Debug;

    /// Send a single command byte
    ///
    /// Transmits `[CONTROL_COMMAND, command]`, exactly 2 bytes.
    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error>;

    /// Send a staged burst of GDDRAM data
    ///
    /// `burst` must already carry [`CONTROL_DATA`] at offset 0 followed by
    /// the payload. It is transmitted as one bus write of exactly
    /// `burst.len()` bytes, so the controller never sees a repeated start
    /// between the envelope and the pixels.
    fn send_burst(&mut self, burst: &[u8]) -> InterfaceResult<(), Self::Error>;

    /// Send a single GDDRAM data byte
    ///
    /// Transmits `[CONTROL_DATA, byte]`, exactly 2 bytes.
    fn send_data_byte(&mut self, byte: u8) -> InterfaceResult<(), Self::Error> {
        self.send_burst(&[CONTROL_DATA, byte])
    }
}

/// Errors that can occur at the interface level
///
/// Generic over the I2C error type.
#[derive(Debug)]
pub enum InterfaceError<I2cErr> {
    /// I2C communication error
    I2c(I2cErr),
}

impl<I2cErr: Debug> core::fmt::Display for InterfaceError<I2cErr> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::I2c(e) => write!(f, "I2C error: {e:?}"),
        }
    }
}

impl<I2cErr: Debug> core::error::Error for InterfaceError<I2cErr> {}

/// I2C interface implementation for SSD1306
///
/// Owns the bus handle and the 7-bit address of one controller. Implements
/// [`DisplayInterface`] for any embedded-hal v1.0 [`I2c`] bus.
///
/// ## Example
///
/// ```rust,no_run
/// use ssd1306::{Builder, Dimensions, Display, I2cInterface};
/// # use core::convert::Infallible;
/// # use embedded_hal::i2c::{I2c, Operation, SevenBitAddress};
/// # struct MockI2c;
/// # impl embedded_hal::i2c::ErrorType for MockI2c { type Error = Infallible; }
/// # impl I2c<SevenBitAddress> for MockI2c {
/// #     fn transaction(
/// #         &mut self,
/// #         _address: u8,
/// #         _operations: &mut [Operation<'_>],
/// #     ) -> Result<(), Self::Error> {
/// #         Ok(())
/// #     }
/// # }
/// let interface = I2cInterface::new(MockI2c, 0x3C);
///
/// // Use with Display
/// # let dims = match Dimensions::new(128, 64) {
/// #     Ok(dims) => dims,
/// #     Err(_) => return,
/// # };
/// # let config = match Builder::new().dimensions(dims).build() {
/// #     Ok(config) => config,
/// #     Err(_) => return,
/// # };
/// let _display = Display::new(interface, config);
/// ```
pub struct I2cInterface<I2C> {
    /// I2C bus handle
    i2c: I2C,
    /// 7-bit slave address
    address: SevenBitAddress,
}

impl<I2C> I2cInterface<I2C>
where
    I2C: I2c,
{
    /// Create a new I2cInterface
    ///
    /// # Arguments
    ///
    /// * `i2c` - I2C bus (must implement [`I2c`])
    /// * `address` - 7-bit slave address, usually [`DEFAULT_ADDRESS`]
    pub fn new(i2c: I2C, address: SevenBitAddress) -> Self {
        Self { i2c, address }
    }

    /// Get the slave address
    pub fn address(&self) -> SevenBitAddress {
        self.address
    }

    /// Release the bus handle
    pub fn release(self) -> I2C {
        self.i2c
    }
}

impl<I2C> DisplayInterface for I2cInterface<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    type Error = InterfaceError<I2C::Error>;

    fn send_command(&mut self, command: u8) -> InterfaceResult<(), Self::Error> {
        self.i2c
            .write(self.address, &[CONTROL_COMMAND, command])
            .map_err(InterfaceError::I2c)
    }

    fn send_burst(&mut self, burst: &[u8]) -> InterfaceResult<(), Self::Error> {
        self.i2c
            .write(self.address, burst)
            .map_err(InterfaceError::I2c)
    }
}
