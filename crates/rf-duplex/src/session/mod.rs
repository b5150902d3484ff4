//! The duplex session: one exclusively-owned device handle, an
//! init/close lifecycle, and a synchronous read/write contract.

use core::fmt::{Debug, Display, Formatter};

use embedded_hal::delay::DelayNs;

use crate::device::{RadioDetails, RadioDevice};
use crate::types::{PayloadLength, PipeAddress};

mod config;
mod io;
mod pipes;
pub use config::SessionConfig;
pub use pipes::ReadPipeSet;

/// Number of hardware reading slots a session may program.
///
/// Slot 0 is reserved for the device's auto-acknowledgement address,
/// leaving slots 1 through 5 for caller-supplied pipes.
pub const MAX_RX_PIPES: usize = 5;

/// How long the device needs after a receive-mode transition before data
/// is reliably available. A hardware requirement, not tunable.
const LISTEN_SETTLE_MS: u32 = 1000;

/// The ways a session operation can fail.
///
/// `E` is the driver's error type. Lower-level faults are wrapped together
/// with the pipe context involved, so the failing operation can be
/// diagnosed. Input-validation failures are raised before any driver call.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SessionError<E> {
    /// `init()` was called again without an intervening `close()`.
    AlreadyInitialized,
    /// The operation requires a prior successful `init()`.
    NotInitialized,
    /// The driver faulted while opening or configuring the device.
    Init(E),
    /// The driver faulted while releasing the device.
    ///
    /// The session counts as closed regardless.
    Close(E),
    /// The driver faulted during a transmission to `pipe`.
    Write {
        pipe: PipeAddress,
        source: E,
    },
    /// The driver faulted while polling `pipes`.
    Read {
        pipes: ReadPipeSet,
        source: E,
    },
    /// A `write()` payload exceeded the session's fixed transfer length.
    PayloadTooLarge {
        len: usize,
        max: u8,
    },
    /// A `read()` buffer did not match the session's fixed transfer length.
    BufferSizeMismatch {
        len: usize,
        expected: u8,
    },
    /// `read()` was given no pipes to poll.
    EmptyPipeSet,
    /// `read()` was given more pipes than the device has reading slots.
    TooManyPipes {
        len: usize,
    },
}

impl<E: Debug> Display for SessionError<E> {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        match self {
            SessionError::AlreadyInitialized => {
                write!(f, "session is already initialized, call close() first")
            }
            SessionError::NotInitialized => write!(f, "session was not initialized"),
            SessionError::Init(source) => write!(f, "device initialization failed: {source:?}"),
            SessionError::Close(source) => write!(f, "device release failed: {source:?}"),
            SessionError::Write { pipe, source } => {
                write!(f, "transmission to {pipe} failed: {source:?}")
            }
            SessionError::Read { pipes, source } => {
                write!(f, "poll of {pipes} failed: {source:?}")
            }
            SessionError::PayloadTooLarge { len, max } => {
                write!(f, "payload of {len} bytes exceeds transfer length of {max}")
            }
            SessionError::BufferSizeMismatch { len, expected } => {
                write!(f, "buffer of {len} bytes, transfer length is {expected}")
            }
            SessionError::EmptyPipeSet => write!(f, "need at least 1 pipe to read from"),
            SessionError::TooManyPipes { len } => {
                write!(f, "{len} reading pipes requested, device has {MAX_RX_PIPES} slots")
            }
        }
    }
}

#[cfg(feature = "std")]
impl<E: Debug> std::error::Error for SessionError<E> {}

/// A duplex session over one radio transceiver.
///
/// The session owns its driver exclusively; it is neither [`Clone`] nor
/// [`Copy`], so the mutual exclusion the underlying register state demands
/// falls out of the `&mut self` receivers. To share a session across
/// threads, wrap it in a lock; to drive several radios, construct one
/// session per device.
///
/// Lifecycle: a fresh session is uninitialized. [`RadioSession::init()`]
/// acquires the hardware handle and leaves the device listening;
/// [`RadioSession::close()`] releases the handle. Dropping an initialized
/// session releases the handle as well.
pub struct RadioSession<D: RadioDevice, DELAY> {
    device: D,
    delay: DELAY,
    config: SessionConfig,
    initialized: bool,
    rx_pipes: Option<ReadPipeSet>,
}

impl<D: RadioDevice, DELAY> RadioSession<D, DELAY> {
    /// Bind a session to `device`.
    ///
    /// No hardware interaction happens until [`RadioSession::init()`].
    /// The `delay` implementation is used to wait out the device's settling
    /// time after receive-mode transitions.
    pub fn new(device: D, delay: DELAY, config: SessionConfig) -> Self {
        RadioSession {
            device,
            delay,
            config,
            initialized: false,
            rx_pipes: None,
        }
    }

    /// Has `init()` succeeded without a `close()` since?
    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    /// The session's fixed transfer length.
    pub fn payload_length(&self) -> PayloadLength {
        self.config.payload_length()
    }

    /// The configuration this session was constructed with.
    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    /// Access the owned driver, for driver-specific extensions.
    pub fn device(&mut self) -> &mut D {
        &mut self.device
    }
}

impl<D, DELAY> RadioSession<D, DELAY>
where
    D: RadioDevice,
    DELAY: DelayNs,
{
    /// Acquire the hardware handle, apply the session configuration and
    /// enter receive mode.
    ///
    /// Fails with [`SessionError::AlreadyInitialized`] when called twice
    /// without an intervening [`RadioSession::close()`]. A driver fault is
    /// reported as [`SessionError::Init`]; if the handle was already
    /// acquired at that point, the session still counts as initialized so
    /// `close()` can release it.
    pub fn init(&mut self) -> Result<(), SessionError<D::Error>> {
        if self.initialized {
            return Err(SessionError::AlreadyInitialized);
        }
        self.device
            .open(self.config.pins())
            .map_err(SessionError::Init)?;
        self.initialized = true;
        self.device
            .set_payload_length(self.config.payload_length().get())
            .map_err(SessionError::Init)?;
        let retries = self.config.retries();
        self.device
            .set_auto_retries(retries.delay(), retries.count())
            .map_err(SessionError::Init)?;
        self.enter_listening().map_err(SessionError::Init)
    }

    /// Release the hardware handle.
    ///
    /// Fails with [`SessionError::NotInitialized`] before `init()` or after
    /// a prior `close()`. The session is marked closed before the driver's
    /// release runs, so a release fault ([`SessionError::Close`]) cannot
    /// leave it stuck initialized. `init()` may be called again afterwards.
    pub fn close(&mut self) -> Result<(), SessionError<D::Error>> {
        if !self.initialized {
            return Err(SessionError::NotInitialized);
        }
        self.initialized = false;
        self.rx_pipes = None;
        self.device.release().map_err(SessionError::Close)
    }

    /// Put the device into receive mode and wait out its settling time.
    ///
    /// Every transition into listening goes through here.
    fn enter_listening(&mut self) -> Result<(), D::Error> {
        self.device.as_rx()?;
        self.delay.delay_ms(LISTEN_SETTLE_MS);
        Ok(())
    }
}

impl<D, DELAY> RadioSession<D, DELAY>
where
    D: RadioDevice + RadioDetails,
{
    /// Write the driver's diagnostic self-description into `out`.
    ///
    /// This should only be used for debugging development.
    pub fn describe(&mut self, out: &mut dyn core::fmt::Write) -> core::fmt::Result {
        self.device.describe(out)
    }
}

impl<D: RadioDevice, DELAY> Debug for RadioSession<D, DELAY> {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        f.debug_struct("RadioSession")
            .field("initialized", &self.initialized)
            .field("read_pipes", &self.rx_pipes)
            .field("pins", self.config.pins())
            .field("retries", &self.config.retries())
            .field("payload_length", &self.config.payload_length())
            .finish()
    }
}

impl<D: RadioDevice, DELAY> Drop for RadioSession<D, DELAY> {
    /// Release the handle if the session is still initialized.
    ///
    /// A fault from the driver's release has nowhere to go here and is
    /// discarded; call [`RadioSession::close()`] to observe it.
    fn drop(&mut self) {
        if self.initialized {
            self.initialized = false;
            let _ = self.device.release();
        }
    }
}
