//! Error types for 6rd option decoding.

use sixrd_networking::NetworkError;
use thiserror::Error;

/// Errors that can occur when decoding a 6rd option.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum OptionError {
    /// The payload is empty.
    #[error("6rd option payload is empty")]
    Empty,

    /// The text form has fewer fields than mask, prefix length, prefix and one relay.
    #[error("6rd option has {found} fields, expected at least 4")]
    MissingFields { found: usize },

    /// A field could not be parsed.
    #[error("invalid 6rd option {field}: '{value}'")]
    InvalidField { field: &'static str, value: String },

    /// A byte in the hex form is not valid hex.
    #[error("invalid hex byte in 6rd option: '{0}'")]
    InvalidHex(String),

    /// The wire form does not hold mask, prefix length, prefix and one relay.
    #[error("6rd option payload too short: {len} bytes")]
    Truncated { len: usize },

    /// The relay list in the wire form is not a whole number of IPv4 addresses.
    #[error("6rd option relay list has {len} bytes, not a multiple of 4")]
    RelayLength { len: usize },

    /// No border relay was supplied.
    #[error("6rd option carries no border relay")]
    NoRelays,

    /// IPv4 mask length above 32.
    #[error("6rd IPv4 mask length {0} exceeds 32")]
    MaskTooLong(u8),

    /// 6rd prefix length above 128.
    #[error("6rd prefix length {0} exceeds 128")]
    PrefixTooLong(u8),

    /// The prefix plus the embedded IPv4 bits exceed 128 bits.
    #[error("6rd prefix /{prefix_len} with IPv4 mask /{ipv4_mask_len} exceeds 128 bits")]
    PrefixOverflow { prefix_len: u8, ipv4_mask_len: u8 },

    /// Delegated prefix computation failed.
    #[error(transparent)]
    Network(#[from] NetworkError),
}
