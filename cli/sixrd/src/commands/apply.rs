//! `apply`: configure the tunnel for an acquired lease.

use anyhow::Result;
use clap::Args;
use sixrd_networking::{validate_mtu, MTU_DEFAULT_SIT};

use crate::config::Settings;
use crate::error::SixrdError;
use crate::exec::{CommandRunner, Executor};
use crate::lifecycle::{self, Lease};

/// (Re)configure IPv6 connectivity.
#[derive(Debug, Args)]
pub struct ApplyCommand {
    /// (Newly) received WAN IP address.
    #[arg(long)]
    ip: String,

    /// (Newly) received 6rd options.
    #[arg(long)]
    options: String,

    /// MTU for the tunnel.
    #[arg(long, env = "SIXRD_MTU", default_value_t = MTU_DEFAULT_SIT)]
    sixrd_mtu: u16,
}

impl ApplyCommand {
    pub fn run<R: CommandRunner>(self, executor: &Executor<R>, settings: &Settings) -> Result<()> {
        let mtu = validate_mtu(self.sixrd_mtu).map_err(SixrdError::from)?;
        let lease = Lease::new(self.ip, self.options);

        lifecycle::apply(executor, settings, &lease, mtu)?;
        Ok(())
    }
}
