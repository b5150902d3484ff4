//! This module defines the traits a transceiver driver must implement
//! to be driven by a [`RadioSession`](crate::RadioSession).
//!
//! The session only sequences these operations; everything below them
//! (bus transfers, register programming, CRC and acknowledgement handling)
//! belongs to the driver. Implementations may talk to real hardware or
//! simulate a link entirely in memory.

use crate::types::{PinConfig, PipeAddress};

/// The operations a session sequences on an underlying transceiver.
///
/// A driver is handed to the session at construction and owned by it
/// exclusively from then on. The session guarantees the call ordering
/// documented on each method; drivers do not need to re-validate it.
pub trait RadioDevice {
    type Error;

    /// Acquire the physical device using the given pin assignment.
    ///
    /// Called once per session lifecycle, before any other operation.
    fn open(&mut self, pins: &PinConfig) -> Result<(), Self::Error>;

    /// Apply the fixed transfer length, in range [1, 32].
    ///
    /// Every subsequent [`RadioDevice::send()`] and [`RadioDevice::read()`]
    /// moves exactly this many bytes over the air.
    fn set_payload_length(&mut self, length: u8) -> Result<(), Self::Error>;

    /// Apply the auto-retransmit configuration.
    ///
    /// `delay` is in multiples of 250 us; both parameters are in range [0, 15].
    fn set_auto_retries(&mut self, delay: u8, count: u8) -> Result<(), Self::Error>;

    /// Put the device into receive mode.
    ///
    /// The session waits out the device's settling time after this returns;
    /// the driver only needs to flip the mode.
    fn as_rx(&mut self) -> Result<(), Self::Error>;

    /// Take the device out of receive mode, allowing pipes to be
    /// reprogrammed and payloads to be transmitted.
    fn as_tx(&mut self) -> Result<(), Self::Error>;

    /// Program `address` into reading slot `slot`.
    ///
    /// The session only uses slots 1 through 5; slot 0 stays reserved for
    /// the device's own auto-acknowledgement address.
    fn open_rx_pipe(&mut self, slot: u8, address: &PipeAddress) -> Result<(), Self::Error>;

    /// Program `address` as the transmit target.
    fn open_tx_pipe(&mut self, address: &PipeAddress) -> Result<(), Self::Error>;

    /// Is a received payload waiting to be read?
    ///
    /// Must not block; the session polls this.
    fn available(&mut self) -> Result<bool, Self::Error>;

    /// Copy the next received payload into `buf`.
    ///
    /// Only called after [`RadioDevice::available()`] returned `true`,
    /// with `buf.len()` equal to the configured payload length.
    fn read(&mut self, buf: &mut [u8]) -> Result<(), Self::Error>;

    /// Transmit `buf` to the address given to [`RadioDevice::open_tx_pipe()`],
    /// blocking for the duration of one attempt (bounded by the retry
    /// configuration).
    ///
    /// `buf` may be shorter than the configured payload length; the driver
    /// pads the remainder. Returns `true` iff the peer acknowledged receipt.
    fn send(&mut self, buf: &[u8]) -> Result<bool, Self::Error>;

    /// Release the physical device.
    ///
    /// The session considers the handle gone even when this reports an error.
    fn release(&mut self) -> Result<(), Self::Error>;
}

/// Optional diagnostic capability for a driver.
///
/// This should only be used during debugging and development.
pub trait RadioDetails {
    /// Write a human-readable description of the driver's current
    /// configuration into `out`.
    fn describe(&mut self, out: &mut dyn core::fmt::Write) -> core::fmt::Result;
}
