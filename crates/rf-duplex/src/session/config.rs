use crate::types::{PayloadLength, PinConfig, RetryPolicy};

/// An object to configure a session.
///
/// This struct follows a builder pattern. Start from
/// [`SessionConfig::default`], then chain the `with_*` methods.
/// ```
/// use rf_duplex::{PayloadLength, RetryPolicy, SessionConfig};
///
/// let config = SessionConfig::default()
///     .with_payload_length(PayloadLength::new(8).unwrap())
///     .with_retries(RetryPolicy::new(5, 15).unwrap());
/// ```
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SessionConfig {
    pins: PinConfig,
    retries: RetryPolicy,
    payload_length: PayloadLength,
}

impl Default for SessionConfig {
    /// Instantiate a [`SessionConfig`] object with library defaults.
    ///
    /// | feature | default value |
    /// |--------:|:--------------|
    /// | [`SessionConfig::pins()`] | CE 22, CSN 0, 8 MHz |
    /// | [`SessionConfig::retries()`] | delay `5`, count `15` |
    /// | [`SessionConfig::payload_length()`] | `32` |
    fn default() -> Self {
        SessionConfig {
            pins: PinConfig::default(),
            retries: RetryPolicy::default(),
            payload_length: PayloadLength::default(),
        }
    }
}

impl SessionConfig {
    /// Set the pin assignment handed to the driver on `init()`.
    pub fn with_pins(mut self, pins: PinConfig) -> Self {
        self.pins = pins;
        self
    }

    /// Set the auto-retransmit behavior applied on `init()`.
    pub fn with_retries(mut self, retries: RetryPolicy) -> Self {
        self.retries = retries;
        self
    }

    /// Set the fixed transfer length applied on `init()`.
    ///
    /// Every buffer passed to the session's `read()` must be exactly this
    /// long, and every `write()` payload at most this long.
    pub fn with_payload_length(mut self, payload_length: PayloadLength) -> Self {
        self.payload_length = payload_length;
        self
    }

    /// The configured pin assignment.
    pub fn pins(&self) -> &PinConfig {
        &self.pins
    }

    /// The configured auto-retransmit behavior.
    pub fn retries(&self) -> RetryPolicy {
        self.retries
    }

    /// The configured transfer length.
    pub fn payload_length(&self) -> PayloadLength {
        self.payload_length
    }
}
