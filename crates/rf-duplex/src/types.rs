//! This module defines the value types used by the session API.
//! These types are meant to be agnostic of any particular driver implementation.

use core::fmt::{Display, Formatter, Result};

/// A 40-bit radio pipe address.
///
/// The canonical form is 5 bytes stored least-significant byte first,
/// matching the order the bytes appear on air.
///
/// Addresses compare by value and are immutable once constructed.
/// ```
/// use rf_duplex::PipeAddress;
///
/// let node = PipeAddress::from_bytes(*b"1Node");
/// assert_eq!(node, PipeAddress::from_value(node.value()).unwrap());
/// ```
#[derive(Clone, Copy, PartialEq, Eq, Hash)]
pub struct PipeAddress([u8; 5]);

impl PipeAddress {
    /// The largest value a 5-byte address can encode.
    pub const MAX_VALUE: u64 = (1 << 40) - 1;

    /// Build an address from its 5-byte on-air form (least-significant byte first).
    pub const fn from_bytes(bytes: [u8; 5]) -> Self {
        PipeAddress(bytes)
    }

    /// Build an address from its numeric value.
    ///
    /// Values that do not fit in 40 bits are rejected.
    pub const fn from_value(value: u64) -> core::result::Result<Self, InvalidPipeAddress> {
        if value > Self::MAX_VALUE {
            return Err(InvalidPipeAddress { value });
        }
        Ok(PipeAddress([
            value as u8,
            (value >> 8) as u8,
            (value >> 16) as u8,
            (value >> 24) as u8,
            (value >> 32) as u8,
        ]))
    }

    /// The numeric value of this address.
    pub const fn value(&self) -> u64 {
        self.0[0] as u64
            | (self.0[1] as u64) << 8
            | (self.0[2] as u64) << 16
            | (self.0[3] as u64) << 24
            | (self.0[4] as u64) << 32
    }

    /// The 5-byte on-air form (least-significant byte first).
    pub const fn bytes(&self) -> &[u8; 5] {
        &self.0
    }
}

impl From<[u8; 5]> for PipeAddress {
    fn from(bytes: [u8; 5]) -> Self {
        PipeAddress::from_bytes(bytes)
    }
}

impl TryFrom<u64> for PipeAddress {
    type Error = InvalidPipeAddress;

    fn try_from(value: u64) -> core::result::Result<Self, Self::Error> {
        PipeAddress::from_value(value)
    }
}

impl Display for PipeAddress {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{:#012X}", self.value())
    }
}

impl core::fmt::Debug for PipeAddress {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "PipeAddress({:#012X})", self.value())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PipeAddress {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "PipeAddress({=u64:#x})", self.value());
    }
}

/// The error returned when a numeric pipe address exceeds 40 bits.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidPipeAddress {
    /// The rejected value.
    pub value: u64,
}

impl Display for InvalidPipeAddress {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "pipe address {:#X} does not fit in 40 bits", self.value)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidPipeAddress {}

/// Auto-retransmit behavior applied to the device during `init()`.
///
/// `delay` selects the wait between attempts in multiples of 250 us,
/// `count` the number of attempts. Both must be in range [0, 15].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RetryPolicy {
    delay: u8,
    count: u8,
}

impl RetryPolicy {
    /// Upper bound for both the `delay` and `count` parameters.
    pub const MAX: u8 = 15;

    /// Validate and build a retry policy.
    pub const fn new(delay: u8, count: u8) -> core::result::Result<Self, InvalidRetryPolicy> {
        if delay > Self::MAX || count > Self::MAX {
            return Err(InvalidRetryPolicy { delay, count });
        }
        Ok(RetryPolicy { delay, count })
    }

    /// The delay between attempts, in multiples of 250 us.
    pub const fn delay(&self) -> u8 {
        self.delay
    }

    /// The number of retransmit attempts.
    pub const fn count(&self) -> u8 {
        self.count
    }
}

impl Default for RetryPolicy {
    /// The device default: 1500 us (`5 * 250 + 250`) between 15 attempts.
    fn default() -> Self {
        RetryPolicy {
            delay: 5,
            count: 15,
        }
    }
}

impl Display for RetryPolicy {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "{} us delay, {} attempts",
            (self.delay as u16 + 1) * 250,
            self.count
        )
    }
}

/// The error returned when a retry delay or count exceeds the device range.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidRetryPolicy {
    /// The rejected delay.
    pub delay: u8,
    /// The rejected count.
    pub count: u8,
}

impl Display for InvalidRetryPolicy {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "retry policy (delay {}, count {}) outside device range [0, 15]",
            self.delay, self.count
        )
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidRetryPolicy {}

/// The fixed transfer length used for every payload on a session.
///
/// Must be in range [1, 32].
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PayloadLength(u8);

impl PayloadLength {
    /// The largest payload the device FIFO can hold.
    pub const MAX: u8 = 32;

    /// Validate and build a payload length.
    pub const fn new(length: u8) -> core::result::Result<Self, InvalidPayloadLength> {
        if length == 0 || length > Self::MAX {
            return Err(InvalidPayloadLength { length });
        }
        Ok(PayloadLength(length))
    }

    /// The length in bytes.
    pub const fn get(&self) -> u8 {
        self.0
    }
}

impl Default for PayloadLength {
    fn default() -> Self {
        PayloadLength(Self::MAX)
    }
}

impl Display for PayloadLength {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "{} bytes", self.0)
    }
}

/// The error returned when a payload length is zero or exceeds the device FIFO.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct InvalidPayloadLength {
    /// The rejected length.
    pub length: u8,
}

impl Display for InvalidPayloadLength {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(f, "payload length {} outside range [1, 32]", self.length)
    }
}

#[cfg(feature = "std")]
impl std::error::Error for InvalidPayloadLength {}

/// Bus clock speed used when opening the device.
///
/// Opaque to the session; forwarded verbatim to [`RadioDevice::open()`](crate::RadioDevice::open).
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum ClockSpeed {
    /// 1 MHz
    Mhz1,
    /// 2 MHz
    Mhz2,
    /// 4 MHz
    Mhz4,
    /// 8 MHz
    #[default]
    Mhz8,
    /// 10 MHz
    Mhz10,
}

impl ClockSpeed {
    /// The speed in Hz.
    pub const fn hz(&self) -> u32 {
        match self {
            ClockSpeed::Mhz1 => 1_000_000,
            ClockSpeed::Mhz2 => 2_000_000,
            ClockSpeed::Mhz4 => 4_000_000,
            ClockSpeed::Mhz8 => 8_000_000,
            ClockSpeed::Mhz10 => 10_000_000,
        }
    }
}

impl Display for ClockSpeed {
    fn fmt(&self, f: &mut Formatter) -> Result {
        match self {
            ClockSpeed::Mhz1 => write!(f, "1 MHz"),
            ClockSpeed::Mhz2 => write!(f, "2 MHz"),
            ClockSpeed::Mhz4 => write!(f, "4 MHz"),
            ClockSpeed::Mhz8 => write!(f, "8 MHz"),
            ClockSpeed::Mhz10 => write!(f, "10 MHz"),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for ClockSpeed {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{=u32} Hz", self.hz());
    }
}

/// Platform pin assignment for the device.
///
/// The session never interprets these values; they are handed to
/// [`RadioDevice::open()`](crate::RadioDevice::open) as-is.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct PinConfig {
    /// The chip-enable pin number.
    pub ce_pin: u16,
    /// The chip-select pin number.
    pub csn_pin: u16,
    /// The bus clock speed.
    pub clock_speed: ClockSpeed,
}

impl PinConfig {
    pub const fn new(ce_pin: u16, csn_pin: u16, clock_speed: ClockSpeed) -> Self {
        PinConfig {
            ce_pin,
            csn_pin,
            clock_speed,
        }
    }
}

impl Default for PinConfig {
    fn default() -> Self {
        PinConfig {
            ce_pin: 22,
            csn_pin: 0,
            clock_speed: ClockSpeed::default(),
        }
    }
}

impl Display for PinConfig {
    fn fmt(&self, f: &mut Formatter) -> Result {
        write!(
            f,
            "CE {}, CSN {}, {}",
            self.ce_pin, self.csn_pin, self.clock_speed
        )
    }
}

/////////////////////////////////////////////////////////////////////////////////
/// unit tests
#[cfg(test)]
mod test {
    extern crate std;
    use super::{
        ClockSpeed, InvalidPayloadLength, InvalidPipeAddress, InvalidRetryPolicy, PayloadLength,
        PipeAddress, RetryPolicy,
    };
    use std::format;

    #[test]
    fn address_round_trips_value() {
        for value in [0u64, 1, 0x1122334455, 0xE7E7E7E7E7, PipeAddress::MAX_VALUE] {
            let address = PipeAddress::from_value(value).unwrap();
            assert_eq!(address.value(), value);
            assert_eq!(PipeAddress::from_bytes(*address.bytes()), address);
        }
    }

    #[test]
    fn address_bytes_are_lsb_first() {
        let address = PipeAddress::from_value(0x1122334455).unwrap();
        assert_eq!(address.bytes(), &[0x55, 0x44, 0x33, 0x22, 0x11]);
    }

    #[test]
    fn address_rejects_values_past_40_bits() {
        assert_eq!(
            PipeAddress::from_value(1 << 40),
            Err(InvalidPipeAddress { value: 1 << 40 })
        );
        assert_eq!(
            PipeAddress::try_from(u64::MAX),
            Err(InvalidPipeAddress { value: u64::MAX })
        );
    }

    #[test]
    fn address_from_ascii_label() {
        let address = PipeAddress::from_bytes(*b"1Node");
        assert_eq!(address.bytes(), b"1Node");
        assert_ne!(address, PipeAddress::from_bytes(*b"2Node"));
    }

    #[test]
    fn address_display_is_hex() {
        let address = PipeAddress::from_value(0xE7).unwrap();
        assert_eq!(format!("{address}"), "0x00000000E7");
    }

    #[test]
    fn retry_policy_bounds() {
        assert!(RetryPolicy::new(15, 15).is_ok());
        assert_eq!(
            RetryPolicy::new(16, 0),
            Err(InvalidRetryPolicy { delay: 16, count: 0 })
        );
        assert_eq!(
            RetryPolicy::new(0, 16),
            Err(InvalidRetryPolicy { delay: 0, count: 16 })
        );
        let default = RetryPolicy::default();
        assert_eq!((default.delay(), default.count()), (5, 15));
    }

    #[test]
    fn payload_length_bounds() {
        assert_eq!(PayloadLength::new(0), Err(InvalidPayloadLength { length: 0 }));
        assert_eq!(
            PayloadLength::new(33),
            Err(InvalidPayloadLength { length: 33 })
        );
        assert_eq!(PayloadLength::new(8).unwrap().get(), 8);
        assert_eq!(PayloadLength::default().get(), 32);
    }

    #[test]
    fn clock_speed_hz() {
        assert_eq!(ClockSpeed::default(), ClockSpeed::Mhz8);
        assert_eq!(ClockSpeed::Mhz10.hz(), 10_000_000);
    }
}
