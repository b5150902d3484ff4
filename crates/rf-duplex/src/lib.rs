//! A driver-agnostic duplex session manager for ESB-style radio
//! transceivers.
//!
//! The underlying radio hardware exposes register-level state shared
//! across its receive and transmit modes, demands settling time after
//! every receive-mode transition, and offers a small number of reading
//! slots that are expensive to reprogram. This crate owns exactly that
//! sequencing problem: [`RadioSession`] wraps a [`RadioDevice`]
//! implementation, enforces the init/close lifecycle, resumes listening
//! after every transmission (even a failed one), and caches the
//! programmed reading pipes so a repeated poll never pays for
//! reconfiguration.
//!
//! Anything below the [`RadioDevice`] boundary (bus transfers, register
//! maps, CRC and acknowledgement handling) belongs to the driver, which
//! may be real hardware or a simulated link.
//!
//! ## Basic API
//!
//! - [`RadioSession::new()`]
//! - [`RadioSession::init()`]
//! - [`RadioSession::write()`]
//! - [`RadioSession::read()`]
//! - [`RadioSession::read_pipe()`]
//! - [`RadioSession::close()`]
//!
//! ## Configuration API
//!
//! - [`SessionConfig::with_pins()`]
//! - [`SessionConfig::with_retries()`]
//! - [`SessionConfig::with_payload_length()`]
//!
//! ## Typical exchange
//!
//! ```ignore
//! let mut session = RadioSession::new(driver, delay, config);
//! session.init()?;
//! session.write(&peer, &payload)?;
//! let mut buffer = [0u8; 8];
//! while !session.read_pipe(&local, &mut buffer)? {
//!     // poll against your own deadline; read() never blocks
//! }
//! session.close()?;
//! ```
#![no_std]

#[cfg(feature = "std")]
extern crate std;

mod device;
mod types;
pub use device::{RadioDetails, RadioDevice};
pub use types::{
    ClockSpeed, InvalidPayloadLength, InvalidPipeAddress, InvalidRetryPolicy, PayloadLength,
    PinConfig, PipeAddress, RetryPolicy,
};
pub mod session;
pub use session::{RadioSession, ReadPipeSet, SessionConfig, SessionError, MAX_RX_PIPES};
