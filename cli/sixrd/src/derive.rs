//! Tunnel parameters derived from a decoded 6rd option.

use std::fmt;
use std::net::Ipv4Addr;

use sixrd_networking::{InterfaceAddress, Ipv6Prefix};

use crate::decode::DecodedOption;

/// Prefix length of the LAN subnet carved out of the delegated prefix.
pub const LAN_PREFIX_LEN: u8 = 64;

/// Default route next hop: the border relay's IPv4 address written as an
/// IPv4-compatible IPv6 literal (`::198.51.100.1`), which the 6rd tunnel
/// driver resolves to the relay.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Gateway(pub Ipv4Addr);

impl Gateway {
    /// The border relay this gateway points at.
    pub fn relay(&self) -> Ipv4Addr {
        self.0
    }
}

impl fmt::Display for Gateway {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "::{}", self.0)
    }
}

/// Concrete configuration values for one invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DerivedConfig {
    /// Local tunnel endpoint (the WAN address).
    pub local: Ipv4Addr,

    /// `<subnet>::1/128`, assigned to the tunnel device.
    pub tunnel_address: InterfaceAddress,

    /// `<subnet>::1/64`, assigned to the LAN interface.
    pub lan_subnet: InterfaceAddress,

    /// Prefix length of the delegated subnet.
    pub prefix_size: u8,

    /// The delegated subnet, target of the blackhole route.
    pub full_subnet: Ipv6Prefix,

    /// `prefix/prefix_len` as sent by the server.
    pub tunnel_prefix: String,

    pub gateway: Gateway,
}

impl DerivedConfig {
    /// Derive the configuration. The decoded option is trusted as is.
    pub fn from_decoded(decoded: &DecodedOption) -> Self {
        let subnet = decoded.derived_subnet;
        let host = subnet.first_host();

        Self {
            local: decoded.wan,
            tunnel_address: InterfaceAddress::host(host),
            lan_subnet: InterfaceAddress {
                address: host,
                prefix_len: LAN_PREFIX_LEN,
            },
            prefix_size: subnet.prefix_len,
            full_subnet: subnet,
            tunnel_prefix: format!("{}/{}", decoded.prefix, decoded.prefix_len),
            gateway: Gateway(decoded.relay),
        }
    }

    /// Whether unused space in the delegated subnet has to be discarded.
    ///
    /// True when the subnet is wider than the /64 a LAN can absorb, or when
    /// there is no LAN interface at all.
    pub fn needs_blackhole(&self, lan_interface: Option<&str>) -> bool {
        self.prefix_size < LAN_PREFIX_LEN || lan_interface.is_none()
    }
}
