//! Platform registration records
//!
//! Exposing the byte-stream node takes four records from the host platform,
//! always acquired in the same order and released in the reverse order:
//!
//! 1. [`Resource::DeviceNumber`] - a device number region
//! 2. [`Resource::CharDevice`] - the character device bound to that number
//! 3. [`Resource::Class`] - the device class
//! 4. [`Resource::Node`] - the named node under the class
//!
//! The host implements [`Registry`]; the driver keeps a [`Registration`]
//! for each bound instance and hands it back on detach.

use log::{debug, warn};

use crate::error::AllocError;

/// A resource the driver acquires on behalf of one instance
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Resource {
    /// Device number region
    DeviceNumber,
    /// Character device registered against the device number
    CharDevice,
    /// Device class
    Class,
    /// Named node the byte stream is exposed through
    Node,
    /// Per-write staging buffer
    StagingBuffer,
}

impl core::fmt::Display for Resource {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        let name = match self {
            Self::DeviceNumber => "device number",
            Self::CharDevice => "character device",
            Self::Class => "device class",
            Self::Node => "device node",
            Self::StagingBuffer => "staging buffer",
        };
        f.write_str(name)
    }
}

/// Order in which registration records are acquired
pub const REGISTRATION_ORDER: [Resource; 4] = [
    Resource::DeviceNumber,
    Resource::CharDevice,
    Resource::Class,
    Resource::Node,
];

/// Host-side registration of device records
///
/// Implemented by the platform the driver is loaded into. `register` may
/// fail; `unregister` must not, and is only called for records whose
/// `register` succeeded.
///
/// Both methods run while the calling [`Ssd1306`](crate::Ssd1306) holds its
/// instance lock. They must not call back into that instance (`lifecycle`,
/// `open`, `write`, ...): the lock is not reentrant and the call spins
/// forever.
pub trait Registry {
    /// Acquire `resource` under `name`
    fn register(&mut self, resource: Resource, name: &'static str) -> Result<(), AllocError>;

    /// Release `resource` previously acquired under `name`
    fn unregister(&mut self, resource: Resource, name: &'static str);
}

/// Registration records held by one bound instance
#[derive(Debug, PartialEq)]
pub struct Registration {
    device_name: &'static str,
    class_name: &'static str,
    /// Number of leading [`REGISTRATION_ORDER`] entries held
    acquired: usize,
}

impl Registration {
    /// Acquire every record in [`REGISTRATION_ORDER`]
    ///
    /// On failure the records acquired by this call are released in reverse
    /// order before the error is returned, so nothing stays registered.
    pub fn acquire<R: Registry>(
        registry: &mut R,
        device_name: &'static str,
        class_name: &'static str,
    ) -> Result<Self, AllocError> {
        let mut registration = Self {
            device_name,
            class_name,
            acquired: 0,
        };

        for resource in REGISTRATION_ORDER {
            let name = registration.name_of(resource);
            if let Err(err) = registry.register(resource, name) {
                warn!("ssd1306: failed to register {resource} '{name}', unwinding");
                registration.release(registry);
                return Err(err);
            }
            debug!("ssd1306: registered {resource} '{name}'");
            registration.acquired += 1;
        }

        Ok(registration)
    }

    /// Release every held record in reverse acquisition order
    pub fn release<R: Registry>(self, registry: &mut R) {
        for &resource in REGISTRATION_ORDER[..self.acquired].iter().rev() {
            let name = self.name_of(resource);
            registry.unregister(resource, name);
            debug!("ssd1306: unregistered {resource} '{name}'");
        }
    }

    /// Name the node is exposed under
    pub fn device_name(&self) -> &'static str {
        self.device_name
    }

    fn name_of(&self, resource: Resource) -> &'static str {
        match resource {
            Resource::Class => self.class_name,
            _ => self.device_name,
        }
    }
}
