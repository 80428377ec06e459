//! Binary layout of option 212.
//!
//! ```text
//!  0                   1                   2                   3
//!  0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1 2 3 4 5 6 7 8 9 0 1
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |  IPv4MaskLen  |  6rdPrefixLen |                               |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               |
//! |                           6rdPrefix                           |
//! |                          (16 octets)                          |
//! |                               +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! |                               |     6rdBRIPv4Address(es)      |
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+                               |
//! .                                                               .
//! +-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+-+
//! ```
//!
//! The option code and length octets are not part of the payload.

use std::net::{Ipv4Addr, Ipv6Addr};

use crate::error::OptionError;
use crate::SixrdOption;

/// Mask length, prefix length and the 16 prefix octets.
const FIXED_LEN: usize = 18;

/// Decode the option payload (without code and length octets).
pub(crate) fn decode(bytes: &[u8]) -> Result<SixrdOption, OptionError> {
    if bytes.is_empty() {
        return Err(OptionError::Empty);
    }
    if bytes.len() < FIXED_LEN + 4 {
        return Err(OptionError::Truncated { len: bytes.len() });
    }

    let relay_bytes = &bytes[FIXED_LEN..];
    if relay_bytes.len() % 4 != 0 {
        return Err(OptionError::RelayLength {
            len: relay_bytes.len(),
        });
    }

    let mut prefix = [0u8; 16];
    prefix.copy_from_slice(&bytes[2..FIXED_LEN]);

    let relays = relay_bytes
        .chunks_exact(4)
        .map(|c| Ipv4Addr::new(c[0], c[1], c[2], c[3]))
        .collect();

    SixrdOption::new(bytes[0], bytes[1], Ipv6Addr::from(prefix), relays)
}

/// Parse the colon separated hex form dhclient prints for options it has no
/// format declaration for (`0:20:20:1:d:b8:0:0:...`).
pub(crate) fn parse_hex(s: &str) -> Result<Vec<u8>, OptionError> {
    s.split(':')
        .map(|part| {
            if part.is_empty() || part.len() > 2 {
                return Err(OptionError::InvalidHex(part.to_string()));
            }
            u8::from_str_radix(part, 16).map_err(|_| OptionError::InvalidHex(part.to_string()))
        })
        .collect()
}
