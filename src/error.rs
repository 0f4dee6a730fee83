//! Error types for the driver
//!
//! This module defines error types for configuration building ([`BuilderError`]),
//! platform resource acquisition ([`AllocError`]) and driver operations ([`Error`]).
//!
//! ## Error Types
//!
//! - [`BuilderError`] - Errors during configuration construction
//! - [`AllocError`] - A registration record could not be acquired
//! - [`Error`] - Runtime errors during attach, write and detach
//! - [`InterfaceError`](crate::interface::InterfaceError) - Low-level bus errors
//!
//! ## Example
//!
//! ```
//! use ssd1306::{Builder, Dimensions, BuilderError};
//!
//! // Missing dimensions
//! let result = Builder::new().build();
//! assert!(matches!(result, Err(BuilderError::MissingDimensions)));
//!
//! // Invalid dimensions
//! let result = Dimensions::new(128, 80); // Too many rows
//! assert!(result.is_err());
//! ```

use crate::interface::DisplayInterface;
use crate::registry::Resource;

/// Maximum segment outputs (columns) driven by the SSD1306
pub const MAX_COLUMNS: u8 = 128;

/// Maximum COM outputs (rows) driven by the SSD1306
///
/// NOTE: 128x32 modules wire only half of them; configure [`crate::Dimensions`] accordingly.
pub const MAX_ROWS: u8 = 64;

/// Errors that can occur when driving the display
///
/// Generic over the interface type to preserve the specific error type.
/// This allows error handling code to match on the underlying bus error.
pub enum Error<I: DisplayInterface> {
    /// Interface error (I2C)
    ///
    /// Wraps the underlying bus error from the [`DisplayInterface`] implementation.
    /// Never retried by the driver.
    Interface(I::Error),
    /// A resource could not be acquired
    ///
    /// During attach every record acquired so far has already been released
    /// when this is returned.
    Allocation(Resource),
    /// The caller's buffer could not be read
    ///
    /// Nothing was sent to the controller.
    InvalidUserInput,
    /// Attach was requested on an instance that is already bound
    AlreadyBound,
    /// The instance is not bound to a device (never attached, or detached)
    NotBound,
}

impl<I: DisplayInterface> core::fmt::Debug for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(e) => f.debug_tuple("Interface").field(e).finish(),
            Self::Allocation(resource) => f.debug_tuple("Allocation").field(resource).finish(),
            Self::InvalidUserInput => f.write_str("InvalidUserInput"),
            Self::AlreadyBound => f.write_str("AlreadyBound"),
            Self::NotBound => f.write_str("NotBound"),
        }
    }
}

impl<I: DisplayInterface> core::fmt::Display for Error<I> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::Interface(_) => write!(f, "Interface error"),
            Self::Allocation(resource) => write!(f, "Failed to allocate {resource}"),
            Self::InvalidUserInput => write!(f, "Bad address in user buffer"),
            Self::AlreadyBound => write!(f, "Device already bound"),
            Self::NotBound => write!(f, "No such device"),
        }
    }
}

impl<I: DisplayInterface> core::error::Error for Error<I> {}

impl<I: DisplayInterface> embedded_io::Error for Error<I> {
    fn kind(&self) -> embedded_io::ErrorKind {
        match self {
            Self::Interface(_) => embedded_io::ErrorKind::Other,
            Self::Allocation(_) => embedded_io::ErrorKind::OutOfMemory,
            Self::InvalidUserInput => embedded_io::ErrorKind::InvalidInput,
            Self::AlreadyBound => embedded_io::ErrorKind::AlreadyExists,
            Self::NotBound => embedded_io::ErrorKind::NotConnected,
        }
    }
}

impl<I: DisplayInterface> From<AllocError> for Error<I> {
    fn from(err: AllocError) -> Self {
        Self::Allocation(err.resource)
    }
}

/// A registration record could not be acquired from the platform
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct AllocError {
    /// The record that failed
    pub resource: Resource,
}

impl core::fmt::Display for AllocError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "Failed to allocate {}", self.resource)
    }
}

impl core::error::Error for AllocError {}

/// Errors that can occur when building configuration
///
/// These errors occur during the builder pattern before the driver is created.
#[derive(Debug)]
pub enum BuilderError {
    /// Dimensions were not specified
    ///
    /// [`Builder::dimensions()`](crate::config::Builder::dimensions) must be called before building.
    MissingDimensions,
    /// Invalid dimensions provided
    ///
    /// See [`Dimensions::new()`](crate::config::Dimensions::new) for constraints.
    InvalidDimensions {
        /// Number of columns (width) requested
        cols: u8,
        /// Number of rows (height) requested
        rows: u8,
    },
}

impl core::fmt::Display for BuilderError {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::MissingDimensions => write!(f, "Dimensions must be specified"),
            Self::InvalidDimensions { cols, rows } => write!(
                f,
                "Invalid dimensions {cols}x{rows} (max {MAX_COLUMNS}x{MAX_ROWS}, rows must be multiple of 8)"
            ),
        }
    }
}

impl core::error::Error for BuilderError {}
