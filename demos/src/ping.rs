//! The ping-pong round-trip loop: send a timestamp, wait (bounded) for the
//! peer to echo it back, report the measured latency.
//!
//! The payload convention is an 8-byte little-endian count of milliseconds
//! since the Unix epoch. This is an application convention only; the
//! session itself is payload-agnostic.

use std::fmt::Debug;
use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant, SystemTime, UNIX_EPOCH};

use embedded_hal::delay::DelayNs;
use rf_duplex::{PipeAddress, RadioDevice, RadioSession, SessionError};

/// The payload convention: 8 bytes, little-endian milliseconds.
pub const PAYLOAD_BYTES: usize = 8;

/// Milliseconds since the Unix epoch.
pub fn unix_millis() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|elapsed| elapsed.as_millis() as u64)
        .unwrap_or(0)
}

/// Outcome counters for a [`PingPong::run()`] call.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RoundStats {
    /// Rounds attempted.
    pub sent: u64,
    /// Rounds that saw the echoed timestamp within the response window.
    pub completed: u64,
    /// Rounds that expired without a reply.
    pub timeouts: u64,
}

/// Sends timestamps to a peer pipe and measures how long the echo takes.
///
/// The session must be initialized and configured with an 8-byte transfer
/// length. Faults from the session are reported and the loop moves on to
/// the next iteration; they never abort a run.
pub struct PingPong<D: RadioDevice, DELAY> {
    session: RadioSession<D, DELAY>,
    write_pipe: PipeAddress,
    read_pipe: PipeAddress,
    response_window: Duration,
    poll_interval: Duration,
    iteration_delay: Duration,
}

impl<D, DELAY> PingPong<D, DELAY>
where
    D: RadioDevice,
    D::Error: Debug,
    DELAY: DelayNs,
{
    /// Wrap an initialized session.
    ///
    /// Defaults: a 1 s response window, 1 ms between polls, 1 s between
    /// iterations.
    pub fn new(
        session: RadioSession<D, DELAY>,
        write_pipe: PipeAddress,
        read_pipe: PipeAddress,
    ) -> Self {
        debug_assert_eq!(session.payload_length().get() as usize, PAYLOAD_BYTES);
        PingPong {
            session,
            write_pipe,
            read_pipe,
            response_window: Duration::from_secs(1),
            poll_interval: Duration::from_millis(1),
            iteration_delay: Duration::from_secs(1),
        }
    }

    /// How long each round waits for the echo.
    pub fn with_response_window(mut self, window: Duration) -> Self {
        self.response_window = window;
        self
    }

    /// How long to sleep between polls inside the response window.
    pub fn with_poll_interval(mut self, interval: Duration) -> Self {
        self.poll_interval = interval;
        self
    }

    /// How long to pause between iterations.
    pub fn with_iteration_delay(mut self, delay: Duration) -> Self {
        self.iteration_delay = delay;
        self
    }

    /// Program the reading slots ahead of the first round, so the first
    /// poll does not spend its response window on pipe reconfiguration.
    pub fn prime(&mut self) -> Result<(), SessionError<D::Error>> {
        let mut scratch = [0u8; PAYLOAD_BYTES];
        self.session.read_pipe(&self.read_pipe, &mut scratch)?;
        Ok(())
    }

    /// Run `rounds` iterations, or indefinitely when given [`None`].
    pub fn run(&mut self, rounds: Option<u64>) -> RoundStats {
        let mut stats = RoundStats::default();
        while rounds.map_or(true, |total| stats.sent < total) {
            stats.sent += 1;
            println!("Iteration #{}", stats.sent);
            if self.round() {
                stats.completed += 1;
            } else {
                stats.timeouts += 1;
            }
            std::thread::sleep(self.iteration_delay);
        }
        stats
    }

    /// One send/await-echo exchange. Returns whether the echo arrived
    /// within the response window.
    fn round(&mut self) -> bool {
        let sent = unix_millis();
        println!("Now sending {sent}...");
        match self.session.write(&self.write_pipe, &sent.to_le_bytes()) {
            Ok(true) => {}
            Ok(false) => eprintln!("Failed sending {sent}!"),
            Err(err) => eprintln!("Failed sending {sent}: {err}"),
        }

        let mut buffer = [0u8; PAYLOAD_BYTES];
        let deadline = Instant::now() + self.response_window;
        loop {
            match self.session.read_pipe(&self.read_pipe, &mut buffer) {
                Ok(true) => {
                    let echoed = u64::from_le_bytes(buffer);
                    let elapsed = unix_millis().saturating_sub(echoed);
                    println!(
                        "Got {echoed}, round trip time {}.{:03} s",
                        elapsed / 1000,
                        elapsed % 1000
                    );
                    return true;
                }
                Ok(false) => {}
                Err(err) => {
                    eprintln!("Error while reading: {err}");
                    break;
                }
            }
            if Instant::now() >= deadline {
                break;
            }
            std::thread::sleep(self.poll_interval);
        }
        eprintln!("Timeout!");
        false
    }

    /// Hand the session back, e.g. to `close()` it.
    pub fn into_session(self) -> RadioSession<D, DELAY> {
        self.session
    }
}

/// Echo every payload received on `read_pipe` back out to `write_pipe`
/// until `stop` is raised. Returns the number of acknowledged echoes.
pub fn run_echo<D, DELAY>(
    session: &mut RadioSession<D, DELAY>,
    read_pipe: &PipeAddress,
    write_pipe: &PipeAddress,
    stop: &AtomicBool,
) -> u64
where
    D: RadioDevice,
    D::Error: Debug,
    DELAY: DelayNs,
{
    let mut echoed = 0;
    let mut buffer = [0u8; PAYLOAD_BYTES];
    while !stop.load(Ordering::Relaxed) {
        match session.read_pipe(read_pipe, &mut buffer) {
            Ok(true) => match session.write(write_pipe, &buffer) {
                Ok(true) => echoed += 1,
                Ok(false) => eprintln!("Echo was not acknowledged!"),
                Err(err) => eprintln!("Failed echoing: {err}"),
            },
            Ok(false) => std::thread::sleep(Duration::from_millis(1)),
            Err(err) => {
                eprintln!("Error while reading: {err}");
                std::thread::sleep(Duration::from_millis(1));
            }
        }
    }
    echoed
}
