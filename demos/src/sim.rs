//! An in-memory radio link: two [`RadioDevice`] endpoints wired back to back.
//!
//! Acknowledgement follows the hardware model: a transmission is acked iff
//! the peer endpoint is in receive mode with a reading slot programmed to
//! the transmit address, and an acked payload lands in the peer's inbox in
//! the same moment, padded to the peer's fixed transfer length. Unacked
//! attempts are retried per the endpoint's auto-retransmit configuration
//! before the transmission is reported as lost.

use std::collections::VecDeque;
use std::fmt::{self, Display, Formatter, Write};
use std::sync::{Arc, Mutex};
use std::thread;
use std::time::Duration;

use rf_duplex::{PinConfig, PipeAddress, RadioDetails, RadioDevice, MAX_RX_PIPES};

/// Faults a simulated endpoint can report.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SimError {
    /// The operation needs an open device handle.
    Closed,
    /// A transmission was attempted before any target address was programmed.
    NoTarget,
    /// A read was attempted with nothing in the inbox.
    NoData,
    /// The other endpoint panicked while holding the link.
    LinkDown,
}

impl Display for SimError {
    fn fmt(&self, f: &mut Formatter) -> fmt::Result {
        match self {
            SimError::Closed => write!(f, "device handle is not open"),
            SimError::NoTarget => write!(f, "no transmit address programmed"),
            SimError::NoData => write!(f, "inbox is empty"),
            SimError::LinkDown => write!(f, "peer endpoint poisoned the link"),
        }
    }
}

impl std::error::Error for SimError {}

#[derive(Debug, Default)]
struct Endpoint {
    open: bool,
    listening: bool,
    payload_length: u8,
    retries: (u8, u8),
    rx_slots: [Option<PipeAddress>; MAX_RX_PIPES],
    tx_address: Option<PipeAddress>,
    inbox: VecDeque<Vec<u8>>,
}

impl Endpoint {
    fn slot_open_for(&self, address: &PipeAddress) -> bool {
        self.rx_slots.iter().flatten().any(|slot| slot == address)
    }

    /// Can this endpoint acknowledge a payload sent to `address` right now?
    fn can_receive(&self, address: &PipeAddress) -> bool {
        self.open && self.listening && self.payload_length > 0 && self.slot_open_for(address)
    }
}

struct Link {
    ends: [Endpoint; 2],
}

impl Link {
    /// Both endpoints, near side first.
    fn pair(&mut self, side: usize) -> (&mut Endpoint, &mut Endpoint) {
        let (head, tail) = self.ends.split_at_mut(1);
        if side == 0 {
            (&mut head[0], &mut tail[0])
        } else {
            (&mut tail[0], &mut head[0])
        }
    }
}

/// One endpoint of a simulated link.
pub struct SimRadio {
    link: Arc<Mutex<Link>>,
    side: usize,
}

/// Create the two endpoints of a fresh link.
pub fn link() -> (SimRadio, SimRadio) {
    let link = Arc::new(Mutex::new(Link {
        ends: [Endpoint::default(), Endpoint::default()],
    }));
    (
        SimRadio {
            link: Arc::clone(&link),
            side: 0,
        },
        SimRadio { link, side: 1 },
    )
}

impl SimRadio {
    fn with_link<T>(
        &self,
        operate: impl FnOnce(&mut Endpoint, &mut Endpoint) -> Result<T, SimError>,
    ) -> Result<T, SimError> {
        let mut link = self.link.lock().map_err(|_| SimError::LinkDown)?;
        let (near, far) = link.pair(self.side);
        operate(near, far)
    }
}

impl RadioDevice for SimRadio {
    type Error = SimError;

    fn open(&mut self, _pins: &PinConfig) -> Result<(), SimError> {
        self.with_link(|near, _| {
            near.open = true;
            Ok(())
        })
    }

    fn set_payload_length(&mut self, length: u8) -> Result<(), SimError> {
        self.with_link(|near, _| {
            near.payload_length = length;
            Ok(())
        })
    }

    fn set_auto_retries(&mut self, delay: u8, count: u8) -> Result<(), SimError> {
        self.with_link(|near, _| {
            near.retries = (delay, count);
            Ok(())
        })
    }

    fn as_rx(&mut self) -> Result<(), SimError> {
        self.with_link(|near, _| {
            if !near.open {
                return Err(SimError::Closed);
            }
            near.listening = true;
            Ok(())
        })
    }

    fn as_tx(&mut self) -> Result<(), SimError> {
        self.with_link(|near, _| {
            if !near.open {
                return Err(SimError::Closed);
            }
            near.listening = false;
            Ok(())
        })
    }

    fn open_rx_pipe(&mut self, slot: u8, address: &PipeAddress) -> Result<(), SimError> {
        self.with_link(|near, _| {
            // slot 0 is the device's own ack address; 1..=5 are addressable
            if (1..=MAX_RX_PIPES as u8).contains(&slot) {
                near.rx_slots[slot as usize - 1] = Some(*address);
            }
            Ok(())
        })
    }

    fn open_tx_pipe(&mut self, address: &PipeAddress) -> Result<(), SimError> {
        self.with_link(|near, _| {
            near.tx_address = Some(*address);
            Ok(())
        })
    }

    fn available(&mut self) -> Result<bool, SimError> {
        self.with_link(|near, _| Ok(near.listening && !near.inbox.is_empty()))
    }

    fn read(&mut self, buf: &mut [u8]) -> Result<(), SimError> {
        self.with_link(|near, _| {
            let frame = near.inbox.pop_front().ok_or(SimError::NoData)?;
            let len = buf.len().min(frame.len());
            buf[..len].copy_from_slice(&frame[..len]);
            Ok(())
        })
    }

    /// One attempt plus `count` retries, like the hardware auto-retransmit.
    /// The link is unlocked between attempts so the peer can switch modes.
    fn send(&mut self, buf: &[u8]) -> Result<bool, SimError> {
        let (delay, count) = self.with_link(|near, _| {
            if !near.open {
                return Err(SimError::Closed);
            }
            near.tx_address.ok_or(SimError::NoTarget)?;
            Ok(near.retries)
        })?;
        for attempt in 0..=count {
            let delivered = self.with_link(|near, far| {
                let address = near.tx_address.ok_or(SimError::NoTarget)?;
                if !far.can_receive(&address) {
                    return Ok(false);
                }
                let mut frame = buf.to_vec();
                frame.resize(far.payload_length as usize, 0);
                far.inbox.push_back(frame);
                Ok(true)
            })?;
            if delivered {
                return Ok(true);
            }
            if attempt < count {
                thread::sleep(Duration::from_micros((delay as u64 + 1) * 250));
            }
        }
        Ok(false)
    }

    fn release(&mut self) -> Result<(), SimError> {
        self.with_link(|near, _| {
            *near = Endpoint::default();
            Ok(())
        })
    }
}

impl RadioDetails for SimRadio {
    fn describe(&mut self, out: &mut dyn Write) -> fmt::Result {
        let Ok(mut link) = self.link.lock() else {
            return write!(out, "simulated radio (link down)");
        };
        let (near, _) = link.pair(self.side);
        write!(
            out,
            "simulated radio: open={}, listening={}, payload={}, retries={:?}, tx={:?}, slots={:?}, queued={}",
            near.open,
            near.listening,
            near.payload_length,
            near.retries,
            near.tx_address,
            near.rx_slots,
            near.inbox.len()
        )
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    use super::{link, SimError};
    use rf_duplex::{PinConfig, PipeAddress, RadioDevice};

    const TARGET: PipeAddress = PipeAddress::from_bytes(*b"1Node");

    #[test]
    fn send_without_listening_peer_is_not_acked() {
        let (mut near, _far) = link();
        near.open(&PinConfig::default()).unwrap();
        near.set_payload_length(8).unwrap();
        near.open_tx_pipe(&TARGET).unwrap();
        assert_eq!(near.send(&[1, 2, 3]), Ok(false));
    }

    #[test]
    fn send_delivers_padded_frame_to_matching_slot() {
        let (mut near, mut far) = link();
        near.open(&PinConfig::default()).unwrap();
        near.set_payload_length(8).unwrap();
        near.open_tx_pipe(&TARGET).unwrap();

        far.open(&PinConfig::default()).unwrap();
        far.set_payload_length(8).unwrap();
        far.open_rx_pipe(1, &TARGET).unwrap();
        far.as_rx().unwrap();

        assert_eq!(near.send(&[1, 2, 3]), Ok(true));
        assert_eq!(far.available(), Ok(true));
        let mut buf = [0xFFu8; 8];
        far.read(&mut buf).unwrap();
        assert_eq!(buf, [1, 2, 3, 0, 0, 0, 0, 0]);
        assert_eq!(far.available(), Ok(false));
    }

    #[test]
    fn peer_stops_acking_while_transmitting() {
        let (mut near, mut far) = link();
        near.open(&PinConfig::default()).unwrap();
        near.set_payload_length(8).unwrap();
        near.open_tx_pipe(&TARGET).unwrap();

        far.open(&PinConfig::default()).unwrap();
        far.set_payload_length(8).unwrap();
        far.open_rx_pipe(1, &TARGET).unwrap();
        far.as_rx().unwrap();
        far.as_tx().unwrap();

        assert_eq!(near.send(&[9u8; 8]), Ok(false));
    }

    #[test]
    fn send_needs_handle_and_target() {
        let (mut near, _far) = link();
        assert_eq!(near.send(&[0]), Err(SimError::Closed));
        near.open(&PinConfig::default()).unwrap();
        assert_eq!(near.send(&[0]), Err(SimError::NoTarget));
    }

    #[test]
    fn release_resets_endpoint_state() {
        let (mut near, _far) = link();
        near.open(&PinConfig::default()).unwrap();
        near.open_tx_pipe(&TARGET).unwrap();
        near.release().unwrap();
        assert_eq!(near.as_rx(), Err(SimError::Closed));
        assert_eq!(near.send(&[0]), Err(SimError::Closed));
    }
}
