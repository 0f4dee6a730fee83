//! SSD1306 OLED Display Driver
//!
//! A driver for the SSD1306 monochrome OLED controller on I2C, exposing the
//! panel as a write-only byte stream of its 1-bit-per-pixel GDDRAM.
//!
//! ## Features
//!
//! - `no_std` compatible (needs `alloc` for the per-write staging buffer)
//! - `embedded-hal` v1.0 support
//! - `embedded-io` [`Write`](embedded_io::Write) for the exposed node
//! - Configurable panel geometry and init register values
//! - Attach/detach lifecycle that never leaves partial registrations behind
//!
//! ## Wire format
//!
//! Every command byte is sent as its own `[0x00, command]` write. A frame is
//! sent as one `[0x40, data...]` burst after the addressing window has been
//! reset to the full panel, so each write always starts at the top-left
//! corner.
//!
//! ## Usage
//!
//! ```rust,no_run
//! use core::convert::Infallible;
//! use embedded_hal::i2c::{I2c, Operation, SevenBitAddress};
//! use ssd1306::{
//!     AllocError, Builder, Dimensions, PlatformDriver, Registry, Resource, Ssd1306,
//! };
//!
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
//! struct Host;
//!
//! impl Registry for Host {
//!     fn register(&mut self, _: Resource, _: &'static str) -> Result<(), AllocError> {
//!         Ok(())
//!     }
//!     fn unregister(&mut self, _: Resource, _: &'static str) {}
//! }
//!
//! if !Ssd1306::<MockI2c>::matches("solomon,ssd1306") {
//!     return;
//! }
//!
//! let dims = match Dimensions::new(128, 64) {
//!     Ok(dims) => dims,
//!     Err(_) => return,
//! };
//! let config = match Builder::new().dimensions(dims).address(0x3C).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//!
//! let mut host = Host;
//! let driver = Ssd1306::new(config);
//! if driver.probe(MockI2c, &mut host).is_err() {
//!     return;
//! }
//!
//! let frame = [0xFFu8; 1024];
//! let _ = PlatformDriver::write(&driver, &frame);
//! let _bus = driver.remove(&mut host);
//! ```

#![no_std]

extern crate alloc;

/// SSD1306 command definitions
pub mod command;
/// Display configuration types and builder
pub mod config;
/// Device lifecycle and the exposed node
pub mod device;
/// Core display operations
pub mod display;
/// Platform driver capability table
pub mod driver;
/// Error types for the driver
pub mod error;
/// Hardware interface abstraction
pub mod interface;
/// Platform registration records
pub mod registry;

pub use config::{
    Builder, CLASS_NAME, COMPATIBLE, Config, DEVICE_NAME, DRIVER_NAME, Dimensions, InitPolicy,
    MAX_COLUMNS, MAX_ROWS,
};
pub use device::{DeviceError, Fault, Lifecycle, Node, Ssd1306, UserBuffer};
pub use display::Display;
pub use driver::PlatformDriver;
pub use error::{AllocError, BuilderError, Error};
pub use interface::InterfaceError;
pub use interface::{DEFAULT_ADDRESS, DisplayInterface, I2cInterface};
pub use registry::{REGISTRATION_ORDER, Registration, Registry, Resource};
