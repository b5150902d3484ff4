//! Tracking of the reading pipes currently programmed into hardware.
//!
//! Reprogramming reading slots forces the device out of receive mode and
//! back in, which costs a full settling delay. The session therefore keeps
//! the last-programmed set and only touches the hardware when a `read()`
//! call asks for something different.

use core::fmt::{Debug, Display, Formatter};

use embedded_hal::delay::DelayNs;

use super::{RadioSession, MAX_RX_PIPES};
use crate::device::RadioDevice;
use crate::types::PipeAddress;

/// The ordered set of reading pipes last programmed into the device.
///
/// Holds up to [`MAX_RX_PIPES`] addresses mapped to hardware slots
/// 1 through 5. Order is significant: the same addresses in a different
/// order occupy different slots and count as a different set.
#[derive(Clone, Copy, PartialEq, Eq)]
pub struct ReadPipeSet {
    addresses: [PipeAddress; MAX_RX_PIPES],
    len: u8,
}

impl ReadPipeSet {
    /// Snapshot a validated pipe slice; `pipes` holds 1 to 5 addresses.
    pub(crate) fn from_slice(pipes: &[PipeAddress]) -> Self {
        debug_assert!(!pipes.is_empty() && pipes.len() <= MAX_RX_PIPES);
        let mut addresses = [PipeAddress::from_bytes([0; 5]); MAX_RX_PIPES];
        addresses[..pipes.len()].copy_from_slice(pipes);
        ReadPipeSet {
            addresses,
            len: pipes.len() as u8,
        }
    }

    /// The programmed addresses in slot order.
    pub fn addresses(&self) -> &[PipeAddress] {
        &self.addresses[..self.len as usize]
    }

    /// Number of programmed addresses.
    pub fn len(&self) -> usize {
        self.len as usize
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    /// Position-wise comparison against a requested slice.
    ///
    /// Differing lengths or any address in a different slot makes the
    /// cached set stale.
    pub(crate) fn matches(&self, requested: &[PipeAddress]) -> bool {
        self.addresses() == requested
    }
}

impl Debug for ReadPipeSet {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        f.debug_list().entries(self.addresses()).finish()
    }
}

impl Display for ReadPipeSet {
    fn fmt(&self, f: &mut Formatter) -> core::fmt::Result {
        write!(f, "[")?;
        for (index, address) in self.addresses().iter().enumerate() {
            if index > 0 {
                write!(f, ", ")?;
            }
            write!(f, "{address}")?;
        }
        write!(f, "]")
    }
}

impl<D, DELAY> RadioSession<D, DELAY>
where
    D: RadioDevice,
    DELAY: DelayNs,
{
    /// Reprogram the device's reading slots when `pipes` differs from what
    /// is currently programmed. A fresh set costs no mode switch.
    pub(super) fn sync_rx_pipes(&mut self, pipes: &[PipeAddress]) -> Result<(), D::Error> {
        if self
            .rx_pipes
            .as_ref()
            .map_or(false, |cached| cached.matches(pipes))
        {
            return Ok(());
        }
        self.device.as_tx()?;
        for (index, address) in pipes.iter().enumerate() {
            // slot 0 stays reserved for the device's auto-ack address
            self.device.open_rx_pipe(index as u8 + 1, address)?;
        }
        self.rx_pipes = Some(ReadPipeSet::from_slice(pipes));
        self.enter_listening()
    }
}
