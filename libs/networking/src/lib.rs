//! Networking utilities for 6rd tunnel configuration.
//!
//! This library provides helpers for:
//! - IPv6 prefixes and interface addresses as `ip` understands them
//! - 6rd address embedding (RFC 5969 section 7.1.1)
//! - MTU validation for the tunnel device

use std::net::{Ipv4Addr, Ipv6Addr};
use std::str::FromStr;

use thiserror::Error;

/// Networking errors.
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NetworkError {
    /// Invalid IP address.
    #[error("invalid IP address: {0}")]
    InvalidAddress(String),

    /// Invalid CIDR prefix.
    #[error("invalid CIDR prefix: {0}")]
    InvalidPrefix(String),

    /// Embedded IPv4 bits do not fit behind the 6rd prefix.
    #[error("6rd prefix /{prefix_len} cannot hold {embedded_bits} embedded IPv4 bits")]
    EmbeddingOverflow { prefix_len: u8, embedded_bits: u8 },

    /// Invalid MTU value.
    #[error("invalid MTU: {value} (must be between {min} and {max})")]
    InvalidMtu { value: u16, min: u16, max: u16 },
}

// ============================================================================
// Prefixes and addresses
// ============================================================================

/// IPv6 network prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct Ipv6Prefix {
    /// Base address of the prefix.
    pub address: Ipv6Addr,

    /// Prefix length (e.g., 64 for /64).
    pub prefix_len: u8,
}

impl Ipv6Prefix {
    /// Create a new prefix. Host bits of `address` are cleared.
    pub fn new(address: Ipv6Addr, prefix_len: u8) -> Result<Self, NetworkError> {
        if prefix_len > 128 {
            return Err(NetworkError::InvalidPrefix(format!(
                "prefix length {} exceeds 128",
                prefix_len
            )));
        }

        Ok(Self {
            address: mask_ipv6(address, prefix_len),
            prefix_len,
        })
    }

    /// Parse from CIDR notation (e.g., "2001:db8::/32").
    pub fn from_cidr(s: &str) -> Result<Self, NetworkError> {
        let Some((addr_str, prefix_str)) = s.split_once('/') else {
            return Err(NetworkError::InvalidPrefix(format!(
                "missing '/' in CIDR: {}",
                s
            )));
        };

        let address = Ipv6Addr::from_str(addr_str)
            .map_err(|_| NetworkError::InvalidAddress(addr_str.to_string()))?;

        let prefix_len = prefix_str
            .parse::<u8>()
            .map_err(|_| NetworkError::InvalidPrefix(prefix_str.to_string()))?;

        Self::new(address, prefix_len)
    }

    /// Check if an address is within this prefix.
    pub fn contains(&self, addr: Ipv6Addr) -> bool {
        mask_ipv6(addr, self.prefix_len) == self.address
    }

    /// The network address with only the lowest bit set (`<network>::1`).
    pub fn first_host(&self) -> Ipv6Addr {
        let bits = u128::from_be_bytes(self.address.octets()) | 1;
        Ipv6Addr::from(bits.to_be_bytes())
    }
}

impl std::fmt::Display for Ipv6Prefix {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// An address assigned to an interface, together with the on-link prefix
/// length (`2001:db8::1/64`). Unlike [`Ipv6Prefix`] the host bits are kept.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct InterfaceAddress {
    pub address: Ipv6Addr,
    pub prefix_len: u8,
}

impl InterfaceAddress {
    /// Single host address (`/128`).
    pub fn host(address: Ipv6Addr) -> Self {
        Self {
            address,
            prefix_len: 128,
        }
    }

    /// The prefix this address sits in.
    pub fn network(&self) -> Ipv6Prefix {
        Ipv6Prefix {
            address: mask_ipv6(self.address, self.prefix_len),
            prefix_len: self.prefix_len,
        }
    }
}

impl std::fmt::Display for InterfaceAddress {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}/{}", self.address, self.prefix_len)
    }
}

/// Mask an IPv6 address to a prefix length.
fn mask_ipv6(addr: Ipv6Addr, prefix_len: u8) -> Ipv6Addr {
    let bits = u128::from_be_bytes(addr.octets());
    let mask = if prefix_len == 0 {
        0
    } else if prefix_len >= 128 {
        u128::MAX
    } else {
        u128::MAX << (128 - prefix_len)
    };
    Ipv6Addr::from((bits & mask).to_be_bytes())
}

// ============================================================================
// 6rd address embedding
// ============================================================================

/// Embed the non-common bits of `ipv4` behind a 6rd prefix.
///
/// The top `ipv4_mask_len` bits of the IPv4 address are shared by every CE in
/// the 6rd domain and are dropped; the remaining `32 - ipv4_mask_len` bits are
/// appended to `prefix`. The result is the CE's delegated prefix, of length
/// `prefix.prefix_len + 32 - ipv4_mask_len`.
pub fn embed_ipv4(
    prefix: Ipv6Prefix,
    ipv4: Ipv4Addr,
    ipv4_mask_len: u8,
) -> Result<Ipv6Prefix, NetworkError> {
    if ipv4_mask_len > 32 {
        return Err(NetworkError::InvalidPrefix(format!(
            "IPv4 mask length {} exceeds 32",
            ipv4_mask_len
        )));
    }

    let embedded_bits = 32 - ipv4_mask_len;
    let total = u16::from(prefix.prefix_len) + u16::from(embedded_bits);
    if total > 128 {
        return Err(NetworkError::EmbeddingOverflow {
            prefix_len: prefix.prefix_len,
            embedded_bits,
        });
    }

    let mut bits = u128::from_be_bytes(prefix.address.octets());
    if embedded_bits > 0 {
        let suffix = u128::from(u32::from(ipv4)) & ((1u128 << embedded_bits) - 1);
        bits |= suffix << (128 - total);
    }

    Ipv6Prefix::new(Ipv6Addr::from(bits.to_be_bytes()), total as u8)
}

// ============================================================================
// MTU Configuration
// ============================================================================

/// Minimum MTU for IPv6.
pub const MTU_MIN_IPV6: u16 = 1280;

/// Maximum MTU for jumbo frames.
pub const MTU_MAX_JUMBO: u16 = 9000;

/// Default MTU for Ethernet.
pub const MTU_DEFAULT_ETHERNET: u16 = 1500;

/// SIT encapsulation overhead (outer IPv4 header).
pub const SIT_OVERHEAD: u16 = 20;

/// Validate an MTU value.
pub fn validate_mtu(mtu: u16) -> Result<u16, NetworkError> {
    if !(MTU_MIN_IPV6..=MTU_MAX_JUMBO).contains(&mtu) {
        return Err(NetworkError::InvalidMtu {
            value: mtu,
            min: MTU_MIN_IPV6,
            max: MTU_MAX_JUMBO,
        });
    }
    Ok(mtu)
}

/// Default MTU for a SIT tunnel over Ethernet.
pub const MTU_DEFAULT_SIT: u16 = MTU_DEFAULT_ETHERNET - SIT_OVERHEAD;
