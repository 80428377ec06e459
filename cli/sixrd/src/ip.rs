//! `ip` (iproute2) invocations used to configure the tunnel.
//!
//! Each constructor maps to one host primitive. The rendered argument order
//! is what operators see in the logs, so keep it stable.

use std::fmt;
use std::net::Ipv4Addr;

use sixrd_networking::{InterfaceAddress, Ipv6Prefix};

/// Program every command is run with.
pub const IP_PROGRAM: &str = "ip";

/// A single `ip` invocation.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IpCommand {
    args: Vec<String>,
}

impl IpCommand {
    fn new<I, S>(args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: ToString,
    {
        Self {
            args: args.into_iter().map(|a| a.to_string()).collect(),
        }
    }

    /// `ip tunnel add <name> mode sit local <local> ttl <ttl>`
    pub fn tunnel_add_sit(name: &str, local: Ipv4Addr, ttl: u8) -> Self {
        Self::new([
            "tunnel",
            "add",
            name,
            "mode",
            "sit",
            "local",
            local.to_string().as_str(),
            "ttl",
            ttl.to_string().as_str(),
        ])
    }

    /// `ip tunnel 6rd dev <name> 6rd-prefix <prefix>`
    pub fn tunnel_set_6rd_prefix(name: &str, prefix: &str) -> Self {
        Self::new(["tunnel", "6rd", "dev", name, "6rd-prefix", prefix])
    }

    /// `ip tunnel del <name>`
    pub fn tunnel_del(name: &str) -> Self {
        Self::new(["tunnel", "del", name])
    }

    /// `ip addr add <address> dev <dev>`
    pub fn addr_add(address: &InterfaceAddress, dev: &str) -> Self {
        Self::new(["addr", "add", address.to_string().as_str(), "dev", dev])
    }

    /// `ip addr del <address> dev <dev>`
    pub fn addr_del(address: &InterfaceAddress, dev: &str) -> Self {
        Self::new(["addr", "del", address.to_string().as_str(), "dev", dev])
    }

    /// `ip link set mtu <mtu> dev <dev>`
    pub fn link_set_mtu(dev: &str, mtu: u16) -> Self {
        Self::new(["link", "set", "mtu", mtu.to_string().as_str(), "dev", dev])
    }

    /// `ip link set <dev> up`
    pub fn link_set_up(dev: &str) -> Self {
        Self::new(["link", "set", dev, "up"])
    }

    /// `ip route add default via <gateway> dev <dev>`
    pub fn route_add_default(gateway: impl fmt::Display, dev: &str) -> Self {
        Self::new(["route", "add", "default", "via", gateway.to_string().as_str(), "dev", dev])
    }

    /// `ip route add blackhole <network> [metric <metric>]`
    pub fn route_add_blackhole(network: &Ipv6Prefix, metric: Option<u32>) -> Self {
        let mut cmd = Self::new(["route", "add", "blackhole", network.to_string().as_str()]);
        if let Some(metric) = metric {
            cmd.args.push("metric".to_string());
            cmd.args.push(metric.to_string());
        }
        cmd
    }

    /// `ip route del <network> dev <dev>`
    pub fn route_del(network: &Ipv6Prefix, dev: &str) -> Self {
        Self::new(["route", "del", network.to_string().as_str(), "dev", dev])
    }

    /// Arguments passed to [`IP_PROGRAM`].
    pub fn args(&self) -> &[String] {
        &self.args
    }
}

impl fmt::Display for IpCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} {}", IP_PROGRAM, self.args.join(" "))
    }
}
