//! Orchestration examples for `rf-duplex` sessions, driven against an
//! in-memory simulated radio link instead of physical hardware.

pub mod ping;
pub mod sim;

use std::fmt::Debug;
use std::time::Duration;

use anyhow::{anyhow, Error};
use embedded_hal::delay::DelayNs;

pub fn debug_err(err: impl Debug) -> Error {
    anyhow!("{err:?}")
}

/// Blocking delay backed by the OS scheduler.
pub struct StdDelay;

impl DelayNs for StdDelay {
    fn delay_ns(&mut self, ns: u32) {
        std::thread::sleep(Duration::from_nanos(ns as u64));
    }
}
