//! Resolved runtime settings.
//!
//! Built once from flags and environment and passed by reference to the
//! apply and teardown sequences.

/// Default tunnel device name.
pub const DEFAULT_TUNNEL_INTERFACE: &str = "ipv6rd";

/// TTL of the encapsulating IPv4 packets.
pub const TUNNEL_TTL: u8 = 64;

/// Metric of the installed blackhole route.
pub const DEFAULT_BLACKHOLE_METRIC: u32 = 1024;

/// Device the kernel attaches IPv6 blackhole routes to.
pub const DEFAULT_DISCARD_DEVICE: &str = "lo";

/// How the blackhole route is installed and later found again for removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiscardRoute {
    /// Metric given to `ip route add blackhole`.
    pub metric: u32,

    /// Device passed to `ip route del`; must match where the kernel put the
    /// blackhole route.
    pub device: String,
}

impl Default for DiscardRoute {
    fn default() -> Self {
        Self {
            metric: DEFAULT_BLACKHOLE_METRIC,
            device: DEFAULT_DISCARD_DEVICE.to_string(),
        }
    }
}

/// Settings shared by both subcommands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Settings {
    /// SIT device to (de)configure.
    pub tunnel_interface: String,

    /// LAN interface to hand the /64 to, if any.
    pub lan_interface: Option<String>,

    pub discard: DiscardRoute,
}

impl Settings {
    /// Create settings. An empty LAN interface name disables LAN integration.
    pub fn new(tunnel_interface: impl Into<String>, lan_interface: &str) -> Self {
        let lan_interface = lan_interface.trim();
        Self {
            tunnel_interface: tunnel_interface.into(),
            lan_interface: (!lan_interface.is_empty()).then(|| lan_interface.to_string()),
            discard: DiscardRoute::default(),
        }
    }

    pub fn with_discard(mut self, discard: DiscardRoute) -> Self {
        self.discard = discard;
        self
    }

    pub fn lan_interface(&self) -> Option<&str> {
        self.lan_interface.as_deref()
    }
}

impl Default for Settings {
    fn default() -> Self {
        Self::new(DEFAULT_TUNNEL_INTERFACE, "")
    }
}
