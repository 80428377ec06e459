//! Adapter between the DHCP client's raw inputs and the option decoder.

use std::net::{Ipv4Addr, Ipv6Addr};

use sixrd_networking::Ipv6Prefix;
use sixrd_option::{SixrdOption, OPTION_6RD};
use tracing::debug;

use crate::error::SixrdError;

/// A decoded 6rd option bound to the WAN address it was received for.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DecodedOption {
    /// WAN IPv4 address the option applies to.
    pub wan: Ipv4Addr,

    /// The 6rd prefix as sent by the server.
    pub prefix: Ipv6Addr,

    /// Length of the 6rd prefix.
    pub prefix_len: u8,

    /// Border relay the default route points at.
    pub relay: Ipv4Addr,

    /// Further relays from the option, in server order. Not used.
    pub backup_relays: Vec<Ipv4Addr>,

    /// The CE's delegated prefix: `wan` embedded behind the 6rd prefix.
    pub derived_subnet: Ipv6Prefix,
}

/// Decode the option payload and WAN address handed over by the DHCP client.
pub fn decode(options: &str, ip: &str) -> Result<DecodedOption, SixrdError> {
    let wan: Ipv4Addr = ip
        .trim()
        .parse()
        .map_err(|_| SixrdError::InvalidAddress(ip.to_string()))?;

    let option = SixrdOption::parse(options)?;
    let relay = option.relay()?;
    let derived_subnet = option.delegated_prefix(wan)?;

    debug!(
        code = OPTION_6RD,
        wan = %wan,
        ipv4_mask_len = option.ipv4_mask_len,
        prefix = %option.prefix,
        prefix_len = option.prefix_len,
        relays = ?option.relays,
        subnet = %derived_subnet,
        "decoded 6rd option"
    );

    Ok(DecodedOption {
        wan,
        prefix: option.prefix,
        prefix_len: option.prefix_len,
        relay,
        backup_relays: option.relays.into_iter().skip(1).collect(),
        derived_subnet,
    })
}
