//! Capability table the host platform drives an instance through

use core::fmt::Debug;

use embedded_hal::i2c::I2c;

use crate::config::{COMPATIBLE, DRIVER_NAME};
use crate::device::{DeviceError, Ssd1306};
use crate::registry::Registry;

/// Operations a platform invokes on a matched driver
///
/// The platform finds a device whose compatible string satisfies
/// [`PlatformDriver::matches`], hands its bus to [`PlatformDriver::probe`],
/// forwards node writes to [`PlatformDriver::write`] and calls
/// [`PlatformDriver::remove`] when the device goes away.
pub trait PlatformDriver {
    /// Bus handle passed in on probe and handed back on remove
    type Bus;
    /// Error returned by every operation
    type Error;

    /// Compatible strings this driver binds to
    const COMPATIBLE: &'static [&'static str];
    /// Driver name reported to the platform
    const NAME: &'static str;

    /// Whether a device with `compatible` is handled by this driver
    fn matches(compatible: &str) -> bool {
        Self::COMPATIBLE.iter().any(|&entry| entry == compatible)
    }

    /// Bind to a matched device
    fn probe<R: Registry>(&self, bus: Self::Bus, registry: &mut R) -> Result<(), Self::Error>;

    /// Unbind and return the bus
    fn remove<R: Registry>(&self, registry: &mut R) -> Result<Self::Bus, Self::Error>;

    /// Write one frame to the bound device
    fn write(&self, frame: &[u8]) -> Result<usize, Self::Error>;
}

impl<I2C> PlatformDriver for Ssd1306<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    type Bus = I2C;
    type Error = DeviceError<I2C>;

    const COMPATIBLE: &'static [&'static str] = COMPATIBLE;
    const NAME: &'static str = DRIVER_NAME;

    fn probe<R: Registry>(&self, bus: I2C, registry: &mut R) -> Result<(), Self::Error> {
        self.attach(bus, registry)
    }

    fn remove<R: Registry>(&self, registry: &mut R) -> Result<I2C, Self::Error> {
        self.detach(registry)
    }

    fn write(&self, frame: &[u8]) -> Result<usize, Self::Error> {
        Ssd1306::write(self, frame)
    }
}
