//! The synchronous read/write contract.

use embedded_hal::delay::DelayNs;

use super::{RadioSession, ReadPipeSet, SessionError, MAX_RX_PIPES};
use crate::device::RadioDevice;
use crate::types::PipeAddress;

impl<D, DELAY> RadioSession<D, DELAY>
where
    D: RadioDevice,
    DELAY: DelayNs,
{
    /// Transmit `data` to `pipe`.
    ///
    /// The device leaves receive mode for the duration of one transmit
    /// attempt and re-enters it before this returns, whether or not the
    /// attempt faulted. Returns `Ok(true)` iff the peer acknowledged
    /// receipt, `Ok(false)` on no-ack.
    ///
    /// `data` may be shorter than the session's transfer length (the driver
    /// pads), but never longer: [`SessionError::PayloadTooLarge`] is raised
    /// before any driver call. Driver faults are wrapped as
    /// [`SessionError::Write`] carrying `pipe`, after listening has been
    /// resumed.
    pub fn write(
        &mut self,
        pipe: &PipeAddress,
        data: &[u8],
    ) -> Result<bool, SessionError<D::Error>> {
        if !self.initialized {
            return Err(SessionError::NotInitialized);
        }
        let max = self.config.payload_length().get();
        if data.len() > max as usize {
            return Err(SessionError::PayloadTooLarge {
                len: data.len(),
                max,
            });
        }
        // resuming listening must happen on the fault path too, so the
        // transmit outcome is held until the device is back in receive mode
        let sent = self.transmit(pipe, data);
        let resumed = self.enter_listening();
        let acked = sent.map_err(|source| SessionError::Write {
            pipe: *pipe,
            source,
        })?;
        resumed.map_err(|source| SessionError::Write {
            pipe: *pipe,
            source,
        })?;
        Ok(acked)
    }

    fn transmit(&mut self, pipe: &PipeAddress, data: &[u8]) -> Result<bool, D::Error> {
        self.device.as_tx()?;
        self.device.open_tx_pipe(pipe)?;
        self.device.send(data)
    }

    /// Poll `pipes` once for a received payload.
    ///
    /// Reading slots are reprogrammed only when `pipes` differs from the
    /// set a previous call programmed (order-sensitive); a repeated set
    /// costs no mode switch. The poll itself never blocks: on available
    /// data `buffer` is filled with exactly the session's transfer length
    /// and `true` is returned, otherwise `false`, immediately. Callers
    /// wanting a timeout poll in a loop against their own deadline.
    ///
    /// `buffer` must be exactly the transfer length
    /// ([`SessionError::BufferSizeMismatch`]); `pipes` must hold 1 to
    /// [`MAX_RX_PIPES`] addresses ([`SessionError::EmptyPipeSet`],
    /// [`SessionError::TooManyPipes`]). Driver faults are wrapped as
    /// [`SessionError::Read`] carrying the requested set.
    pub fn read(
        &mut self,
        pipes: &[PipeAddress],
        buffer: &mut [u8],
    ) -> Result<bool, SessionError<D::Error>> {
        if !self.initialized {
            return Err(SessionError::NotInitialized);
        }
        if pipes.is_empty() {
            return Err(SessionError::EmptyPipeSet);
        }
        if pipes.len() > MAX_RX_PIPES {
            return Err(SessionError::TooManyPipes { len: pipes.len() });
        }
        let expected = self.config.payload_length().get();
        if buffer.len() != expected as usize {
            return Err(SessionError::BufferSizeMismatch {
                len: buffer.len(),
                expected,
            });
        }
        self.poll(pipes, buffer).map_err(|source| SessionError::Read {
            pipes: ReadPipeSet::from_slice(pipes),
            source,
        })
    }

    /// Single-pipe convenience for [`RadioSession::read()`].
    pub fn read_pipe(
        &mut self,
        pipe: &PipeAddress,
        buffer: &mut [u8],
    ) -> Result<bool, SessionError<D::Error>> {
        self.read(core::slice::from_ref(pipe), buffer)
    }

    fn poll(&mut self, pipes: &[PipeAddress], buffer: &mut [u8]) -> Result<bool, D::Error> {
        self.sync_rx_pipes(pipes)?;
        if self.device.available()? {
            self.device.read(buffer)?;
            Ok(true)
        } else {
            Ok(false)
        }
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use crate::test::{init_expects, mk_session, DeviceFault, Expect};
    use crate::{PayloadLength, PipeAddress, RetryPolicy, SessionConfig, SessionError};
    use std::vec::Vec;

    const PEER: PipeAddress = PipeAddress::from_bytes(*b"1Node");
    const LOCAL: PipeAddress = PipeAddress::from_bytes(*b"2Node");

    fn payload8_config() -> SessionConfig {
        SessionConfig::default()
            .with_payload_length(PayloadLength::new(8).unwrap())
            .with_retries(RetryPolicy::new(5, 15).unwrap())
    }

    #[test]
    fn write_before_init_is_rejected() {
        let (mut session, device) = mk_session(&[], SessionConfig::default());
        assert_eq!(
            session.write(&PEER, &[0u8; 4]),
            Err(SessionError::NotInitialized)
        );
        drop(session);
        device.done();
    }

    #[test]
    fn oversized_payload_is_rejected_without_device_calls() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.push(Expect::Release(Ok(())));
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        assert_eq!(
            session.write(&PEER, &[0u8; 9]),
            Err(SessionError::PayloadTooLarge { len: 9, max: 8 })
        );
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn write_reports_ack_and_resumes_listening() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            Expect::AsTx,
            Expect::OpenTxPipe(PEER),
            Expect::Send([0x55u8; 8].into(), Ok(true)),
            Expect::AsRx(Ok(())),
            // a no-ack transmission follows the same sequence
            Expect::AsTx,
            Expect::OpenTxPipe(PEER),
            Expect::Send([0x55u8; 8].into(), Ok(false)),
            Expect::AsRx(Ok(())),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        assert!(session.write(&PEER, &[0x55; 8]).unwrap());
        assert!(!session.write(&PEER, &[0x55; 8]).unwrap());
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn short_payload_is_accepted() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            Expect::AsTx,
            Expect::OpenTxPipe(PEER),
            Expect::Send([1u8, 2].into(), Ok(true)),
            Expect::AsRx(Ok(())),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        assert!(session.write(&PEER, &[1, 2]).unwrap());
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn write_fault_still_resumes_listening() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            Expect::AsTx,
            Expect::OpenTxPipe(PEER),
            Expect::Send([7u8; 8].into(), Err(DeviceFault)),
            // listening resumes before the fault propagates
            Expect::AsRx(Ok(())),
            // and a subsequent poll works
            Expect::AsTx,
            Expect::OpenRxPipe(1, LOCAL),
            Expect::AsRx(Ok(())),
            Expect::Available(Ok(true)),
            Expect::Read(Ok([9u8; 8].into())),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        assert_eq!(
            session.write(&PEER, &[7; 8]),
            Err(SessionError::Write {
                pipe: PEER,
                source: DeviceFault
            })
        );
        let mut buffer = [0u8; 8];
        assert!(session.read_pipe(&LOCAL, &mut buffer).unwrap());
        assert_eq!(buffer, [9u8; 8]);
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn read_validates_input_without_device_calls() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.push(Expect::Release(Ok(())));
        let (mut session, device) = mk_session(&expectations, config);
        let mut buffer = [0u8; 8];
        assert_eq!(
            session.read(&[LOCAL], &mut buffer),
            Err(SessionError::NotInitialized)
        );
        session.init().unwrap();
        assert_eq!(
            session.read(&[], &mut buffer),
            Err(SessionError::EmptyPipeSet)
        );
        assert_eq!(
            session.read(&[PEER; 6], &mut buffer),
            Err(SessionError::TooManyPipes { len: 6 })
        );
        let mut short = [0u8; 4];
        assert_eq!(
            session.read(&[LOCAL], &mut short),
            Err(SessionError::BufferSizeMismatch {
                len: 4,
                expected: 8
            })
        );
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn repeated_pipe_set_reconfigures_once() {
        let config = payload8_config();
        let pipes = [LOCAL, PEER];
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            // first read programs the slots
            Expect::AsTx,
            Expect::OpenRxPipe(1, LOCAL),
            Expect::OpenRxPipe(2, PEER),
            Expect::AsRx(Ok(())),
            Expect::Available(Ok(false)),
            // identical set: poll only
            Expect::Available(Ok(false)),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        let mut buffer = [0u8; 8];
        assert!(!session.read(&pipes, &mut buffer).unwrap());
        assert!(!session.read(&pipes, &mut buffer).unwrap());
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn reordered_pipe_set_reconfigures_again() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            Expect::AsTx,
            Expect::OpenRxPipe(1, LOCAL),
            Expect::OpenRxPipe(2, PEER),
            Expect::AsRx(Ok(())),
            Expect::Available(Ok(false)),
            // same addresses, swapped slots: programmed again
            Expect::AsTx,
            Expect::OpenRxPipe(1, PEER),
            Expect::OpenRxPipe(2, LOCAL),
            Expect::AsRx(Ok(())),
            Expect::Available(Ok(false)),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        let mut buffer = [0u8; 8];
        assert!(!session.read(&[LOCAL, PEER], &mut buffer).unwrap());
        assert!(!session.read(&[PEER, LOCAL], &mut buffer).unwrap());
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn read_fault_carries_requested_pipes() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            Expect::AsTx,
            Expect::OpenRxPipe(1, LOCAL),
            Expect::AsRx(Ok(())),
            Expect::Available(Err(DeviceFault)),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        let mut buffer = [0u8; 8];
        match session.read(&[LOCAL], &mut buffer) {
            Err(SessionError::Read { pipes, source }) => {
                assert_eq!(pipes.addresses(), &[LOCAL]);
                assert_eq!(source, DeviceFault);
            }
            other => panic!("expected a wrapped read fault, got {other:?}"),
        }
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn echoed_payload_round_trips() {
        // a peer that echoes the written value back into the read pipe
        let value = 0x1122334455667788u64.to_le_bytes();
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            Expect::AsTx,
            Expect::OpenTxPipe(PEER),
            Expect::Send(value.into(), Ok(true)),
            Expect::AsRx(Ok(())),
            Expect::AsTx,
            Expect::OpenRxPipe(1, LOCAL),
            Expect::AsRx(Ok(())),
            Expect::Available(Ok(true)),
            Expect::Read(Ok(value.into())),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        assert!(session.write(&PEER, &value).unwrap());
        let mut buffer = [0u8; 8];
        assert!(session.read_pipe(&LOCAL, &mut buffer).unwrap());
        assert_eq!(buffer, value);
        session.close().unwrap();
        device.done();
    }

    #[test]
    fn empty_air_polls_false_every_time() {
        let config = payload8_config();
        let mut expectations = Vec::from(init_expects(&config));
        expectations.extend([
            Expect::AsTx,
            Expect::OpenRxPipe(1, LOCAL),
            Expect::AsRx(Ok(())),
            Expect::Available(Ok(false)),
            Expect::Available(Ok(false)),
            Expect::Available(Ok(false)),
            Expect::Release(Ok(())),
        ]);
        let (mut session, device) = mk_session(&expectations, config);
        session.init().unwrap();
        let mut buffer = [0u8; 8];
        for _ in 0..3 {
            assert!(!session.read_pipe(&LOCAL, &mut buffer).unwrap());
        }
        session.close().unwrap();
        device.done();
    }
}
