//! Apply and teardown sequences.
//!
//! Both run each step strictly in order and stop at the first fatal error.
//! Nothing is rolled back: a partially applied configuration is converged by
//! the next invocation the DHCP client makes.

use tracing::info;

use crate::config::{Settings, TUNNEL_TTL};
use crate::decode::decode;
use crate::derive::DerivedConfig;
use crate::error::SixrdError;
use crate::exec::{classify_delete_error, CommandRunner, Executor};
use crate::ip::IpCommand;

/// WAN address and 6rd option payload of one DHCP lease.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Lease {
    pub ip: String,
    pub options: String,
}

impl Lease {
    pub fn new(ip: impl Into<String>, options: impl Into<String>) -> Self {
        Self {
            ip: ip.into(),
            options: options.into(),
        }
    }

    /// Lease context for teardown; `None` unless both parts are present and
    /// non-empty.
    pub fn from_optional(ip: Option<String>, options: Option<String>) -> Option<Self> {
        match (ip, options) {
            (Some(ip), Some(options)) if !ip.trim().is_empty() && !options.trim().is_empty() => {
                Some(Self::new(ip, options))
            }
            _ => None,
        }
    }

    /// Decode and derive the tunnel parameters for this lease.
    pub fn derive(&self) -> Result<DerivedConfig, SixrdError> {
        let decoded = decode(&self.options, &self.ip)?;
        Ok(DerivedConfig::from_decoded(&decoded))
    }
}

/// Configure the tunnel for a newly acquired lease.
pub fn apply<R: CommandRunner>(
    executor: &Executor<R>,
    settings: &Settings,
    lease: &Lease,
    mtu: u16,
) -> Result<DerivedConfig, SixrdError> {
    let config = lease.derive()?;
    let tunnel = settings.tunnel_interface.as_str();
    let lan = settings.lan_interface();

    info!(
        tunnel = %tunnel,
        wan = %config.local,
        subnet = %config.full_subnet,
        relay = %config.gateway.relay(),
        lan = lan.unwrap_or("-"),
        "applying 6rd configuration"
    );

    executor.execute(&IpCommand::tunnel_add_sit(tunnel, config.local, TUNNEL_TTL))?;
    executor.execute(&IpCommand::tunnel_set_6rd_prefix(tunnel, &config.tunnel_prefix))?;
    executor.execute(&IpCommand::addr_add(&config.tunnel_address, tunnel))?;
    executor.execute(&IpCommand::link_set_mtu(tunnel, mtu))?;

    if config.needs_blackhole(lan) {
        executor.execute(&IpCommand::route_add_blackhole(
            &config.full_subnet,
            Some(settings.discard.metric),
        ))?;
    }

    executor.execute(&IpCommand::link_set_up(tunnel))?;
    executor.execute(&IpCommand::route_add_default(config.gateway, tunnel))?;

    if let Some(lan) = lan {
        executor.execute(&IpCommand::addr_add(&config.lan_subnet, lan))?;
    }

    info!(tunnel = %tunnel, "6rd configuration applied");
    Ok(config)
}

/// Remove the tunnel and, when the released lease is known, the routes and
/// addresses derived from it.
pub fn teardown<R: CommandRunner>(
    executor: &Executor<R>,
    settings: &Settings,
    old: Option<&Lease>,
) -> Result<(), SixrdError> {
    let tunnel = settings.tunnel_interface.as_str();
    info!(tunnel = %tunnel, "tearing down 6rd configuration");

    executor.execute_tolerating(&IpCommand::tunnel_del(tunnel), classify_delete_error)?;

    let Some(old) = old else {
        info!("no previous lease supplied, tunnel removal only");
        return Ok(());
    };

    let config = old.derive()?;
    let lan = settings.lan_interface();

    if config.needs_blackhole(lan) {
        executor.execute(&IpCommand::route_del(
            &config.full_subnet,
            &settings.discard.device,
        ))?;
    }

    if let Some(lan) = lan {
        executor.execute(&IpCommand::addr_del(&config.lan_subnet, lan))?;
    }

    info!(tunnel = %tunnel, subnet = %config.full_subnet, "6rd configuration removed");
    Ok(())
}
