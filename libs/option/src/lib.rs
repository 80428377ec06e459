//! # sixrd-option
//!
//! Decoding of DHCPv4 option 212 (OPTION_6RD, RFC 5969 section 7.1.1) and
//! derivation of the delegated IPv6 prefix for a given WAN address.
//!
//! Two payload encodings are accepted:
//!
//! - the text form dhclient exports when the option is declared as
//!   `{ integer 8, integer 8, ip6-address, array of ip-address }`:
//!   `0 32 2001:db8:: 198.51.100.1`
//! - the raw payload bytes, either as a slice or in the colon separated hex
//!   form dhclient prints for undeclared options: `0:20:20:1:d:b8:...`

use std::net::{Ipv4Addr, Ipv6Addr};

use sixrd_networking::{embed_ipv4, Ipv6Prefix};

mod error;
mod wire;

pub use error::OptionError;

/// DHCPv4 option code for 6rd.
pub const OPTION_6RD: u8 = 212;

/// A decoded and validated 6rd option.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SixrdOption {
    /// Number of high-order IPv4 bits common to all CEs in the domain.
    pub ipv4_mask_len: u8,

    /// Length of the 6rd prefix.
    pub prefix_len: u8,

    /// The 6rd prefix as sent by the server.
    pub prefix: Ipv6Addr,

    /// Border relay addresses, in server order. Never empty.
    pub relays: Vec<Ipv4Addr>,
}

impl SixrdOption {
    /// Build an option from its fields, validating lengths and relays.
    pub fn new(
        ipv4_mask_len: u8,
        prefix_len: u8,
        prefix: Ipv6Addr,
        relays: Vec<Ipv4Addr>,
    ) -> Result<Self, OptionError> {
        if ipv4_mask_len > 32 {
            return Err(OptionError::MaskTooLong(ipv4_mask_len));
        }
        if prefix_len > 128 {
            return Err(OptionError::PrefixTooLong(prefix_len));
        }
        if u16::from(prefix_len) + u16::from(32 - ipv4_mask_len) > 128 {
            return Err(OptionError::PrefixOverflow {
                prefix_len,
                ipv4_mask_len,
            });
        }
        if relays.is_empty() {
            return Err(OptionError::NoRelays);
        }

        Ok(Self {
            ipv4_mask_len,
            prefix_len,
            prefix,
            relays,
        })
    }

    /// Parse a payload as handed over by the DHCP client, in either the
    /// dhclient text form or the colon separated hex form.
    pub fn parse(payload: &str) -> Result<Self, OptionError> {
        let payload = payload.trim();
        if payload.is_empty() {
            return Err(OptionError::Empty);
        }

        if payload.contains(|c: char| c.is_whitespace() || c == ',') {
            Self::from_dhclient(payload)
        } else {
            Self::from_wire(&wire::parse_hex(payload)?)
        }
    }

    /// Parse the dhclient text form:
    /// `<ipv4-mask-len> <6rd-prefix-len> <6rd-prefix> <br> [<br>...]`.
    ///
    /// Relays may be separated by whitespace or commas.
    pub fn from_dhclient(s: &str) -> Result<Self, OptionError> {
        let fields: Vec<&str> = s
            .split(|c: char| c.is_whitespace() || c == ',')
            .filter(|f| !f.is_empty())
            .collect();

        if fields.is_empty() {
            return Err(OptionError::Empty);
        }
        if fields.len() < 4 {
            return Err(OptionError::MissingFields {
                found: fields.len(),
            });
        }

        let ipv4_mask_len = parse_field::<u8>("IPv4 mask length", fields[0])?;
        let prefix_len = parse_field::<u8>("prefix length", fields[1])?;
        let prefix = parse_field::<Ipv6Addr>("prefix", fields[2])?;
        let relays = fields[3..]
            .iter()
            .map(|f| parse_field::<Ipv4Addr>("border relay", f))
            .collect::<Result<Vec<_>, _>>()?;

        Self::new(ipv4_mask_len, prefix_len, prefix, relays)
    }

    /// Decode the binary option payload (without code and length octets).
    pub fn from_wire(bytes: &[u8]) -> Result<Self, OptionError> {
        wire::decode(bytes)
    }

    /// The primary border relay.
    pub fn relay(&self) -> Result<Ipv4Addr, OptionError> {
        self.relays.first().copied().ok_or(OptionError::NoRelays)
    }

    /// The 6rd prefix with its host bits cleared.
    pub fn sixrd_prefix(&self) -> Result<Ipv6Prefix, OptionError> {
        Ok(Ipv6Prefix::new(self.prefix, self.prefix_len)?)
    }

    /// The prefix delegated to a CE holding `wan` as its IPv4 address.
    pub fn delegated_prefix(&self, wan: Ipv4Addr) -> Result<Ipv6Prefix, OptionError> {
        Ok(embed_ipv4(self.sixrd_prefix()?, wan, self.ipv4_mask_len)?)
    }
}

fn parse_field<T: std::str::FromStr>(field: &'static str, value: &str) -> Result<T, OptionError> {
    value.parse().map_err(|_| OptionError::InvalidField {
        field,
        value: value.to_string(),
    })
}
