//! `teardown`: remove the tunnel for a released lease.

use anyhow::Result;
use clap::Args;

use crate::config::Settings;
use crate::exec::{CommandRunner, Executor};
use crate::lifecycle::{self, Lease};

/// Teardown IPv6 configuration.
#[derive(Debug, Args)]
pub struct TeardownCommand {
    /// (Old/current) WAN IP address.
    #[arg(long)]
    ip: Option<String>,

    /// (Old/current) 6rd options.
    #[arg(long)]
    options: Option<String>,
}

impl TeardownCommand {
    pub fn run<R: CommandRunner>(self, executor: &Executor<R>, settings: &Settings) -> Result<()> {
        let old = Lease::from_optional(self.ip, self.options);
        lifecycle::teardown(executor, settings, old.as_ref())?;
        Ok(())
    }
}
