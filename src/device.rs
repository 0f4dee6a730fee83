//! Device lifecycle and the exposed byte-stream node
//!
//! [`Ssd1306`] is one driver instance. It starts unbound, is bound to a
//! physical controller by [`Ssd1306::attach`] and returns to unbound on
//! [`Ssd1306::detach`]:
//!
//! ```text
//! Unbound -> Probing -> Bound -> Detaching -> Unbound
//! ```
//!
//! While bound, frames written through [`Ssd1306::write`] or a [`Node`]
//! are sent to the panel with [`Display::transfer`].
//!
//! ## Locking
//!
//! All state sits behind one spin lock held for the whole of `attach`,
//! `write` and `detach`. A window reset and its burst are therefore never
//! interleaved with another write, and detach cannot take the bus away from
//! a write in progress.
//!
//! ## Example
//!
//! ```rust,no_run
//! use embedded_io::Write;
//! use ssd1306::{AllocError, Builder, Dimensions, Registry, Resource, Ssd1306};
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
//! # struct Host;
//! # impl Registry for Host {
//! #     fn register(&mut self, _: Resource, _: &'static str) -> Result<(), AllocError> { Ok(()) }
//! #     fn unregister(&mut self, _: Resource, _: &'static str) {}
//! # }
//! # let mut host = Host;
//! let config = match Builder::new().dimensions(Dimensions::default()).build() {
//!     Ok(config) => config,
//!     Err(_) => return,
//! };
//! let device = Ssd1306::new(config);
//! if device.attach(MockI2c, &mut host).is_err() {
//!     return;
//! }
//!
//! if let Ok(mut node) = device.open() {
//!     let stripes = [0xAAu8; 1024];
//!     let _ = node.write_all(&stripes);
//! }
//!
//! let _bus = device.detach(&mut host);
//! ```

use core::fmt::Debug;

use embedded_hal::i2c::I2c;
use log::{debug, info, warn};
use spin::Mutex;

use crate::config::Config;
use crate::display::{Display, stage_burst};
use crate::error::Error;
use crate::interface::I2cInterface;
use crate::registry::{Registration, Registry};

/// Error type of a driver instance bound to bus `I2C`
pub type DeviceError<I2C> = Error<I2cInterface<I2C>>;

type DeviceResult<T, I2C> = core::result::Result<T, DeviceError<I2C>>;

/// Lifecycle state of a driver instance
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Lifecycle {
    /// No device bound
    #[default]
    Unbound,
    /// Attach in progress
    Probing,
    /// Device initialised and node registered
    Bound,
    /// Detach in progress
    Detaching,
}

/// Everything held while bound, released in reverse field order
struct Bound<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    display: Display<I2cInterface<I2C>>,
    registration: Registration,
}

struct State<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    lifecycle: Lifecycle,
    bound: Option<Bound<I2C>>,
}

impl<I2C> State<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    fn enter(&mut self, next: Lifecycle) {
        debug!("ssd1306: {:?} -> {:?}", self.lifecycle, next);
        self.lifecycle = next;
    }
}

/// SSD1306 driver instance
///
/// Owns the bus handle, the display state and the registration records of
/// one controller from attach until detach. Nothing outside the instance
/// can release them.
pub struct Ssd1306<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    config: Config,
    state: Mutex<State<I2C>>,
}

impl<I2C> Ssd1306<I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    /// Create an unbound instance
    pub fn new(config: Config) -> Self {
        Self {
            config,
            state: Mutex::new(State {
                lifecycle: Lifecycle::Unbound,
                bound: None,
            }),
        }
    }

    /// Bind to the controller reachable through `i2c`
    ///
    /// Initialises the panel, then registers the node in `registry`. On any
    /// failure the records acquired so far are released in reverse order,
    /// the panel is switched off if it had been lit, `i2c` is dropped, and
    /// the instance stays unbound.
    ///
    /// `registry` is called with the instance lock held and must not call
    /// back into this instance.
    ///
    /// # Errors
    ///
    /// - [`Error::AlreadyBound`] if the instance is not unbound; the existing
    ///   binding is left untouched and init is not re-run
    /// - [`Error::Interface`] if init failed under
    ///   [`InitPolicy::AbortOnError`](crate::InitPolicy::AbortOnError)
    /// - [`Error::Allocation`] if a registration record could not be acquired
    pub fn attach<R: Registry>(&self, i2c: I2C, registry: &mut R) -> DeviceResult<(), I2C> {
        let mut state = self.state.lock();
        if state.lifecycle != Lifecycle::Unbound {
            warn!("ssd1306: attach on a bound instance rejected");
            return Err(Error::AlreadyBound);
        }
        state.enter(Lifecycle::Probing);

        let interface = I2cInterface::new(i2c, self.config.address);
        let mut display = Display::new(interface, self.config.clone());

        if let Err(err) = display.init() {
            warn!("ssd1306: init failed, aborting probe");
            state.enter(Lifecycle::Unbound);
            return Err(err);
        }

        let registration =
            match Registration::acquire(registry, self.config.device_name, self.config.class_name)
            {
                Ok(registration) => registration,
                Err(err) => {
                    if display.display_off().is_err() {
                        warn!("ssd1306: display off failed during unwind");
                    }
                    state.enter(Lifecycle::Unbound);
                    return Err(err.into());
                }
            };

        info!(
            "ssd1306: probe success on 0x{:02x}, node '{}'",
            self.config.address,
            registration.device_name()
        );
        state.bound = Some(Bound {
            display,
            registration,
        });
        state.enter(Lifecycle::Bound);

        Ok(())
    }

    /// Unbind and hand back the bus handle
    ///
    /// Switches the panel off (a failure is logged and ignored, the device
    /// may already be gone), releases the registration records in reverse
    /// order, then releases the bus by returning it. Writes issued after
    /// this fail with [`Error::NotBound`].
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBound`] if the instance is not bound.
    pub fn detach<R: Registry>(&self, registry: &mut R) -> DeviceResult<I2C, I2C> {
        let mut state = self.state.lock();
        let Some(bound) = state.bound.take() else {
            return Err(Error::NotBound);
        };
        state.enter(Lifecycle::Detaching);

        let Bound {
            mut display,
            registration,
        } = bound;

        if let Err(err) = display.display_off() {
            warn!("ssd1306: display off failed during detach, ignoring: {err:?}");
        }
        registration.release(registry);
        let i2c = display.release().release();

        state.enter(Lifecycle::Unbound);
        Ok(i2c)
    }

    /// Send one frame to the panel
    ///
    /// Stages `frame` behind the data control byte, resets the addressing
    /// window and bursts it, holding the instance lock throughout.
    ///
    /// # Errors
    ///
    /// - [`Error::NotBound`] if the instance is not bound
    /// - [`Error::Allocation`] if the burst could not be staged
    /// - [`Error::Interface`] if the bus failed; the instance stays usable
    pub fn write(&self, frame: &[u8]) -> DeviceResult<usize, I2C> {
        self.with_display(|display| display.transfer(frame))
    }

    /// Send a burst already staged behind the data control byte
    fn write_burst(&self, burst: &[u8]) -> DeviceResult<usize, I2C> {
        self.with_display(|display| display.transfer_burst(burst))
    }

    fn with_display<T, F>(&self, op: F) -> DeviceResult<T, I2C>
    where
        F: FnOnce(&mut Display<I2cInterface<I2C>>) -> DeviceResult<T, I2C>,
    {
        let mut state = self.state.lock();
        let bound = state.bound.as_mut().ok_or(Error::NotBound)?;
        op(&mut bound.display)
    }

    /// Open the exposed node
    ///
    /// # Errors
    ///
    /// Returns [`Error::NotBound`] if the instance is not bound.
    pub fn open(&self) -> DeviceResult<Node<'_, I2C>, I2C> {
        if self.lifecycle() != Lifecycle::Bound {
            return Err(Error::NotBound);
        }
        Ok(Node { device: self })
    }

    /// Current lifecycle state
    pub fn lifecycle(&self) -> Lifecycle {
        self.state.lock().lifecycle
    }

    /// Access the configuration
    pub fn config(&self) -> &Config {
        &self.config
    }
}

/// Returned by a [`UserBuffer`] that cannot be read
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Fault;

/// Source of bytes written through a [`Node`] from outside the driver
///
/// Models a caller buffer that may turn out to be unreadable partway
/// through the copy.
pub trait UserBuffer {
    /// Number of bytes the caller asked to write
    fn len(&self) -> usize;

    /// Whether the write is empty
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Copy all `self.len()` bytes into `dst`
    fn copy_to(&self, dst: &mut [u8]) -> Result<(), Fault>;
}

impl UserBuffer for [u8] {
    fn len(&self) -> usize {
        <[u8]>::len(self)
    }

    fn copy_to(&self, dst: &mut [u8]) -> Result<(), Fault> {
        dst.copy_from_slice(self);
        Ok(())
    }
}

/// Write-only handle to the exposed node of a bound instance
///
/// Every write maps to exactly one [`Ssd1306::write`]. There is no read,
/// seek or control surface. A handle outliving a detach keeps failing with
/// [`Error::NotBound`].
pub struct Node<'a, I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    device: &'a Ssd1306<I2C>,
}

impl<I2C> Node<'_, I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    /// Copy `src` into a staging buffer and send it as one frame
    ///
    /// The buffer is staged with the data control byte in front, so the
    /// copy is the only one made. Nothing reaches the bus unless both the
    /// allocation and the copy succeed.
    ///
    /// # Errors
    ///
    /// - [`Error::Allocation`] with
    ///   [`Resource::StagingBuffer`](crate::Resource::StagingBuffer) if the
    ///   staging buffer could not be allocated
    /// - [`Error::InvalidUserInput`] if `src` faulted
    /// - anything [`Ssd1306::write`] returns
    pub fn write_user<U>(&self, src: &U) -> DeviceResult<usize, I2C>
    where
        U: UserBuffer + ?Sized,
    {
        let len = src.len();
        let mut staging = stage_burst(len)?;
        staging.resize(len + 1, 0);

        src.copy_to(&mut staging[1..])
            .map_err(|Fault| Error::InvalidUserInput)?;

        self.device.write_burst(&staging)
    }
}

impl<I2C> embedded_io::ErrorType for Node<'_, I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    type Error = DeviceError<I2C>;
}

impl<I2C> embedded_io::Write for Node<'_, I2C>
where
    I2C: I2c,
    I2C::Error: Debug,
{
    fn write(&mut self, buf: &[u8]) -> Result<usize, Self::Error> {
        self.device.write(buf)
    }

    fn flush(&mut self) -> Result<(), Self::Error> {
        Ok(())
    }
}

#[cfg(test)]
pub(crate) mod tests {
    extern crate std;

    use super::*;
    use crate::config::{Builder, Dimensions, InitPolicy};
    use crate::display::tests::{EXPECTED_INIT_128X64, EXPECTED_WINDOW_128X64};
    use crate::error::AllocError;
    use crate::registry::{REGISTRATION_ORDER, Resource};
    use embedded_hal::i2c::{ErrorKind, ErrorType, Operation, SevenBitAddress};
    use std::cell::{Cell, RefCell};
    use std::rc::Rc;
    use std::sync::{Arc, Mutex as StdMutex, mpsc};
    use std::thread;
    use std::time::Duration;
    use std::vec;
    use std::vec::Vec;

    #[derive(Clone, Debug, PartialEq)]
    pub(crate) enum Event {
        Bus(u8, Vec<u8>),
        Register(Resource, &'static str),
        Unregister(Resource, &'static str),
        Dropped(u8),
    }

    pub(crate) type Log = Rc<RefCell<Vec<Event>>>;

    /// I2C bus double: records each transaction as it appears on the wire
    #[derive(Debug)]
    pub(crate) struct MockI2c {
        pub(crate) id: u8,
        pub(crate) log: Log,
        pub(crate) offline: Rc<Cell<bool>>,
    }

    impl MockI2c {
        pub(crate) fn new(id: u8, log: &Log) -> Self {
            Self {
                id,
                log: Rc::clone(log),
                offline: Rc::new(Cell::new(false)),
            }
        }
    }

    impl Drop for MockI2c {
        fn drop(&mut self) {
            self.log.borrow_mut().push(Event::Dropped(self.id));
        }
    }

    impl ErrorType for MockI2c {
        type Error = ErrorKind;
    }

    impl I2c<SevenBitAddress> for MockI2c {
        fn transaction(
            &mut self,
            address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            if self.offline.get() {
                return Err(ErrorKind::Other);
            }
            let mut wire = Vec::new();
            for operation in operations.iter() {
                if let Operation::Write(bytes) = operation {
                    wire.extend_from_slice(bytes);
                }
            }
            self.log.borrow_mut().push(Event::Bus(address, wire));
            Ok(())
        }
    }

    /// Registry double sharing the bus log, optionally failing one record
    #[derive(Debug)]
    pub(crate) struct Host {
        pub(crate) log: Log,
        pub(crate) live: Vec<(Resource, &'static str)>,
        pub(crate) fail_on: Option<Resource>,
    }

    impl Host {
        pub(crate) fn new(log: &Log) -> Self {
            Self {
                log: Rc::clone(log),
                live: Vec::new(),
                fail_on: None,
            }
        }
    }

    impl Registry for Host {
        fn register(&mut self, resource: Resource, name: &'static str) -> Result<(), AllocError> {
            if self.fail_on == Some(resource) {
                return Err(AllocError { resource });
            }
            self.live.push((resource, name));
            self.log.borrow_mut().push(Event::Register(resource, name));
            Ok(())
        }

        fn unregister(&mut self, resource: Resource, name: &'static str) {
            self.live.retain(|entry| *entry != (resource, name));
            self.log.borrow_mut().push(Event::Unregister(resource, name));
        }
    }

    pub(crate) fn test_config(policy: InitPolicy) -> Config {
        Builder::new()
            .dimensions(Dimensions::new(128, 64).unwrap())
            .init_policy(policy)
            .build()
            .unwrap()
    }

    fn cmd(byte: u8) -> Event {
        Event::Bus(0x3C, vec![0x00, byte])
    }

    fn data(bytes: &[u8]) -> Event {
        let mut wire = vec![0x40];
        wire.extend_from_slice(bytes);
        Event::Bus(0x3C, wire)
    }

    fn bus_events(log: &Log) -> Vec<Event> {
        log.borrow()
            .iter()
            .filter(|event| matches!(event, Event::Bus(..)))
            .cloned()
            .collect()
    }

    fn expected_init_events() -> Vec<Event> {
        let mut events: Vec<Event> = EXPECTED_INIT_128X64.iter().map(|&b| cmd(b)).collect();
        events.extend(EXPECTED_WINDOW_128X64.iter().map(|&b| cmd(b)));
        events.push(data(&[0u8; 1024]));
        events.push(cmd(0xAF));
        events
    }

    fn bound_device(log: &Log, host: &mut Host) -> (Ssd1306<MockI2c>, Rc<Cell<bool>>) {
        let device = Ssd1306::new(test_config(InitPolicy::AbortOnError));
        let i2c = MockI2c::new(1, log);
        let offline = Rc::clone(&i2c.offline);
        device.attach(i2c, host).unwrap();
        (device, offline)
    }

    #[test]
    fn test_new_instance_is_unbound() {
        let device: Ssd1306<MockI2c> = Ssd1306::new(test_config(InitPolicy::AbortOnError));
        assert_eq!(device.lifecycle(), Lifecycle::Unbound);
        assert!(matches!(device.write(&[0u8; 4]), Err(Error::NotBound)));
        assert!(matches!(device.open(), Err(Error::NotBound)));
    }

    #[test]
    fn test_attach_initialises_then_registers() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);

        assert_eq!(device.lifecycle(), Lifecycle::Bound);
        assert_eq!(bus_events(&log), expected_init_events());

        let events = log.borrow();
        let init_len = expected_init_events().len();
        let registered: Vec<_> = events[init_len..].to_vec();
        assert_eq!(
            registered,
            [
                Event::Register(Resource::DeviceNumber, "ssd1306"),
                Event::Register(Resource::CharDevice, "ssd1306"),
                Event::Register(Resource::Class, "ssd_class"),
                Event::Register(Resource::Node, "ssd1306"),
            ]
        );
    }

    #[test]
    fn test_attach_on_bound_instance_is_rejected() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let before = log.borrow().len();

        let result = device.attach(MockI2c::new(2, &log), &mut host);

        assert!(matches!(result, Err(Error::AlreadyBound)));
        assert_eq!(log.borrow()[before..], [Event::Dropped(2)]);
        assert_eq!(device.lifecycle(), Lifecycle::Bound);
        assert_eq!(host.live.len(), REGISTRATION_ORDER.len());
        assert_eq!(device.write(&[0x11; 8]).unwrap(), 8);
    }

    #[test]
    fn test_detach_releases_in_reverse_order() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let before = log.borrow().len();

        let i2c = device.detach(&mut host).unwrap();
        assert_eq!(i2c.id, 1);
        drop(i2c);

        assert_eq!(
            log.borrow()[before..],
            [
                cmd(0xAE),
                Event::Unregister(Resource::Node, "ssd1306"),
                Event::Unregister(Resource::Class, "ssd_class"),
                Event::Unregister(Resource::CharDevice, "ssd1306"),
                Event::Unregister(Resource::DeviceNumber, "ssd1306"),
                Event::Dropped(1),
            ]
        );
        assert!(host.live.is_empty());
        assert_eq!(device.lifecycle(), Lifecycle::Unbound);
    }

    #[test]
    fn test_writes_after_detach_fail() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let node = device.open().unwrap();

        let _bus = device.detach(&mut host).unwrap();
        let before = log.borrow().len();

        assert!(matches!(device.write(&[0xFF; 16]), Err(Error::NotBound)));
        assert!(matches!(node.write_user(&[0xFFu8; 16][..]), Err(Error::NotBound)));
        assert!(matches!(device.detach(&mut host), Err(Error::NotBound)));
        assert_eq!(log.borrow().len(), before);
    }

    #[test]
    fn test_detach_ignores_display_off_failure() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, offline) = bound_device(&log, &mut host);
        offline.set(true);

        assert!(device.detach(&mut host).is_ok());
        assert!(host.live.is_empty());
        assert_eq!(device.lifecycle(), Lifecycle::Unbound);
    }

    #[test]
    fn test_instance_can_rebind_after_detach() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let _bus = device.detach(&mut host).unwrap();

        assert!(device.attach(MockI2c::new(2, &log), &mut host).is_ok());
        assert_eq!(device.lifecycle(), Lifecycle::Bound);
        assert_eq!(host.live.len(), REGISTRATION_ORDER.len());
    }

    #[test]
    fn test_write_resets_window_then_bursts() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let before = log.borrow().len();

        let frame: Vec<u8> = (0..1024).map(|i| if i % 2 == 0 { 0xAA } else { 0x55 }).collect();
        assert_eq!(device.write(&frame).unwrap(), 1024);

        let mut expected: Vec<Event> = EXPECTED_WINDOW_128X64.iter().map(|&b| cmd(b)).collect();
        expected.push(data(&frame));
        assert_eq!(log.borrow()[before..], expected[..]);
    }

    #[test]
    fn test_zero_length_write_sends_envelope_only() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);

        assert_eq!(device.write(&[]).unwrap(), 0);
        assert_eq!(log.borrow().last(), Some(&data(&[])));
    }

    #[test]
    fn test_write_failure_is_returned_and_instance_recovers() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, offline) = bound_device(&log, &mut host);

        offline.set(true);
        let result = device.write(&[0xFF; 1024]);
        assert!(matches!(
            result,
            Err(Error::Interface(crate::InterfaceError::I2c(ErrorKind::Other)))
        ));

        offline.set(false);
        assert_eq!(device.write(&[0xFF; 1024]).unwrap(), 1024);
        assert_eq!(device.lifecycle(), Lifecycle::Bound);
    }

    #[test]
    fn test_allocation_fault_at_each_step_unwinds_everything() {
        for failing in REGISTRATION_ORDER {
            let log = Log::default();
            let mut host = Host::new(&log);
            host.fail_on = Some(failing);
            let device = Ssd1306::new(test_config(InitPolicy::AbortOnError));

            let result = device.attach(MockI2c::new(1, &log), &mut host);

            assert!(matches!(result, Err(Error::Allocation(r)) if r == failing));
            assert!(host.live.is_empty(), "leaked records after failing {failing}");
            assert_eq!(device.lifecycle(), Lifecycle::Unbound);

            let events = log.borrow();
            let tail = &events[events.len() - 2..];
            assert_eq!(tail, [cmd(0xAE), Event::Dropped(1)]);
        }
    }

    #[test]
    fn test_instance_usable_after_failed_attach() {
        let log = Log::default();
        let mut host = Host::new(&log);
        host.fail_on = Some(Resource::Class);
        let device = Ssd1306::new(test_config(InitPolicy::AbortOnError));
        assert!(device.attach(MockI2c::new(1, &log), &mut host).is_err());

        host.fail_on = None;
        assert!(device.attach(MockI2c::new(2, &log), &mut host).is_ok());
        assert_eq!(host.live.len(), REGISTRATION_ORDER.len());
    }

    #[test]
    fn test_init_failure_aborts_attach_before_registration() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let device = Ssd1306::new(test_config(InitPolicy::AbortOnError));
        let i2c = MockI2c::new(1, &log);
        i2c.offline.set(true);

        let result = device.attach(i2c, &mut host);

        assert!(matches!(result, Err(Error::Interface(_))));
        assert_eq!(*log.borrow(), [Event::Dropped(1)]);
        assert_eq!(device.lifecycle(), Lifecycle::Unbound);
    }

    #[test]
    fn test_best_effort_init_binds_despite_bus_failure() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let device = Ssd1306::new(test_config(InitPolicy::BestEffort));
        let i2c = MockI2c::new(1, &log);
        i2c.offline.set(true);

        assert!(device.attach(i2c, &mut host).is_ok());
        assert_eq!(device.lifecycle(), Lifecycle::Bound);
        assert_eq!(host.live.len(), REGISTRATION_ORDER.len());
    }

    #[test]
    fn test_node_write_all_is_one_frame() {
        use embedded_io::Write;

        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let mut node = device.open().unwrap();
        let before = log.borrow().len();

        node.write_all(&[0xF0; 1024]).unwrap();
        node.flush().unwrap();

        let events = log.borrow();
        assert_eq!(events.len() - before, EXPECTED_WINDOW_128X64.len() + 1);
        assert_eq!(events.last(), Some(&data(&[0xF0; 1024])));
    }

    struct FaultyBuffer;

    impl UserBuffer for FaultyBuffer {
        fn len(&self) -> usize {
            1024
        }

        fn copy_to(&self, _dst: &mut [u8]) -> Result<(), Fault> {
            Err(Fault)
        }
    }

    struct HugeBuffer;

    impl UserBuffer for HugeBuffer {
        fn len(&self) -> usize {
            usize::MAX
        }

        fn copy_to(&self, _dst: &mut [u8]) -> Result<(), Fault> {
            Ok(())
        }
    }

    #[test]
    fn test_write_user_copies_then_sends() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let node = device.open().unwrap();

        let frame = [0x3Cu8; 64];
        assert_eq!(node.write_user(&frame[..]).unwrap(), 64);
        assert_eq!(log.borrow().last(), Some(&data(&frame)));
    }

    #[test]
    fn test_write_user_fault_sends_nothing() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let node = device.open().unwrap();
        let before = log.borrow().len();

        assert!(matches!(
            node.write_user(&FaultyBuffer),
            Err(Error::InvalidUserInput)
        ));
        assert_eq!(log.borrow().len(), before);
        assert_eq!(device.write(&[0u8; 4]).unwrap(), 4);
    }

    #[test]
    fn test_write_user_allocation_failure_sends_nothing() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let (device, _) = bound_device(&log, &mut host);
        let node = device.open().unwrap();
        let before = log.borrow().len();

        assert!(matches!(
            node.write_user(&HugeBuffer),
            Err(Error::Allocation(Resource::StagingBuffer))
        ));
        assert_eq!(log.borrow().len(), before);
    }

    #[test]
    fn test_custom_address_and_names() {
        let log = Log::default();
        let mut host = Host::new(&log);
        let config = Builder::new()
            .dimensions(Dimensions::default())
            .address(0x3D)
            .device_name("oled0")
            .class_name("oled")
            .build()
            .unwrap();
        let device = Ssd1306::new(config);

        device.attach(MockI2c::new(1, &log), &mut host).unwrap();

        assert!(host.live.contains(&(Resource::Node, "oled0")));
        assert!(host.live.contains(&(Resource::Class, "oled")));
        assert!(
            log.borrow()
                .iter()
                .all(|event| !matches!(event, Event::Bus(address, _) if *address != 0x3D))
        );
    }

    #[derive(Clone, Debug, PartialEq)]
    enum Wire {
        Bus(Vec<u8>),
        Unregister(Resource),
    }

    type SharedLog = Arc<StdMutex<Vec<Wire>>>;
    type Gate = Arc<StdMutex<Option<(mpsc::Sender<()>, mpsc::Receiver<()>)>>>;

    /// Bus that can park the next data burst until the test releases it
    struct GatedI2c {
        log: SharedLog,
        gate: Gate,
    }

    impl ErrorType for GatedI2c {
        type Error = ErrorKind;
    }

    impl I2c<SevenBitAddress> for GatedI2c {
        fn transaction(
            &mut self,
            _address: u8,
            operations: &mut [Operation<'_>],
        ) -> Result<(), Self::Error> {
            let mut wire = Vec::new();
            for operation in operations.iter() {
                if let Operation::Write(bytes) = operation {
                    wire.extend_from_slice(bytes);
                }
            }
            if wire.first() == Some(&0x40) {
                let parked = self.gate.lock().unwrap().take();
                if let Some((entered, release)) = parked {
                    entered.send(()).unwrap();
                    release.recv().unwrap();
                }
            }
            self.log.lock().unwrap().push(Wire::Bus(wire));
            Ok(())
        }
    }

    struct SharedHost {
        log: SharedLog,
    }

    impl Registry for SharedHost {
        fn register(&mut self, _: Resource, _: &'static str) -> Result<(), AllocError> {
            Ok(())
        }

        fn unregister(&mut self, resource: Resource, _: &'static str) {
            self.log.lock().unwrap().push(Wire::Unregister(resource));
        }
    }

    #[test]
    fn test_burst_in_flight_is_not_interleaved() {
        let log = SharedLog::default();
        let gate = Gate::default();
        let mut host = SharedHost {
            log: Arc::clone(&log),
        };
        let device = Ssd1306::new(test_config(InitPolicy::AbortOnError));
        let bus = GatedI2c {
            log: Arc::clone(&log),
            gate: Arc::clone(&gate),
        };
        device.attach(bus, &mut host).unwrap();
        log.lock().unwrap().clear();

        let (entered_tx, entered_rx) = mpsc::channel();
        let (release_tx, release_rx) = mpsc::channel();
        *gate.lock().unwrap() = Some((entered_tx, release_rx));

        let (first, second, detached) = thread::scope(|scope| {
            let first = scope.spawn(|| device.write(&[0x11; 1024]));
            entered_rx.recv().unwrap();

            let detacher = scope.spawn(|| device.detach(&mut host).map(drop));
            let second = scope.spawn(|| device.write(&[0x22; 1024]));
            thread::sleep(Duration::from_millis(50));
            release_tx.send(()).unwrap();

            (
                first.join().unwrap(),
                second.join().unwrap(),
                detacher.join().unwrap(),
            )
        });

        assert_eq!(first.unwrap(), 1024);
        assert!(detached.is_ok());

        let framed = |fill: u8| {
            let mut expected: Vec<Wire> = EXPECTED_WINDOW_128X64
                .iter()
                .map(|&b| Wire::Bus(vec![0x00, b]))
                .collect();
            let mut burst = vec![0x40];
            burst.extend_from_slice(&[fill; 1024]);
            expected.push(Wire::Bus(burst));
            expected
        };
        let teardown = [
            Wire::Bus(vec![0x00, 0xAE]),
            Wire::Unregister(Resource::Node),
            Wire::Unregister(Resource::Class),
            Wire::Unregister(Resource::CharDevice),
            Wire::Unregister(Resource::DeviceNumber),
        ];

        let mut expected = framed(0x11);
        if second.is_ok() {
            expected.extend(framed(0x22));
        } else {
            assert!(matches!(second, Err(Error::NotBound)));
        }
        expected.extend(teardown);
        assert_eq!(*log.lock().unwrap(), expected);
    }
}
