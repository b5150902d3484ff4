//! A self-contained round-trip demo: two simulated radios on one link, an
//! echo peer on a second thread, and the ping-pong driver measuring how
//! long each echo takes.
//!
//! Takes an optional round count as the first argument (default 10,
//! 0 means run until interrupted).

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread;

use anyhow::{anyhow, Result};
use rf_duplex::{PayloadLength, PipeAddress, RadioSession, SessionConfig};
use rf_duplex_demos::ping::{run_echo, PingPong, PAYLOAD_BYTES};
use rf_duplex_demos::{debug_err, sim, StdDelay};

const PING_PIPE: PipeAddress = PipeAddress::from_bytes(*b"1Node");
const PONG_PIPE: PipeAddress = PipeAddress::from_bytes(*b"2Node");

fn main() -> Result<()> {
    let rounds = std::env::args()
        .nth(1)
        .and_then(|arg| arg.parse::<u64>().ok())
        .unwrap_or(10);
    let rounds = (rounds > 0).then_some(rounds);

    let config = SessionConfig::default()
        .with_payload_length(PayloadLength::new(PAYLOAD_BYTES as u8).map_err(debug_err)?);

    println!("Write pipe: {PING_PIPE}");
    println!("Read  pipe: {PONG_PIPE}");
    println!("Pins: {}", config.pins());
    println!("Retry: {}", config.retries());
    println!("Payload: {}", config.payload_length());

    let (near, far) = sim::link();
    let stop = Arc::new(AtomicBool::new(false));
    let ready = Arc::new(AtomicBool::new(false));

    let echo_stop = Arc::clone(&stop);
    let echo_ready = Arc::clone(&ready);
    let echo = thread::spawn(move || -> Result<u64> {
        let mut session = RadioSession::new(far, StdDelay, config);
        session.init().map_err(debug_err)?;
        // program the reading slots before signalling readiness, so the
        // first ping already finds an acknowledging peer
        let mut scratch = [0u8; PAYLOAD_BYTES];
        session.read_pipe(&PING_PIPE, &mut scratch).map_err(debug_err)?;
        echo_ready.store(true, Ordering::Release);
        let echoed = run_echo(&mut session, &PING_PIPE, &PONG_PIPE, &echo_stop);
        session.close().map_err(debug_err)?;
        Ok(echoed)
    });

    let mut session = RadioSession::new(near, StdDelay, config);
    session.init().map_err(debug_err)?;
    let mut describe_out = String::new();
    session.describe(&mut describe_out).map_err(debug_err)?;
    println!("{describe_out}");

    let mut driver = PingPong::new(session, PING_PIPE, PONG_PIPE);
    driver.prime().map_err(debug_err)?;
    while !ready.load(Ordering::Acquire) {
        thread::sleep(std::time::Duration::from_millis(1));
    }

    let stats = driver.run(rounds);
    stop.store(true, Ordering::Release);
    let echoed = echo
        .join()
        .map_err(|_| anyhow!("echo thread panicked"))??;

    println!(
        "{} of {} rounds completed, {} timeouts; peer echoed {} payloads",
        stats.completed, stats.sent, stats.timeouts, echoed
    );
    driver.into_session().close().map_err(debug_err)?;
    Ok(())
}
