//! CLI commands.

mod apply;
mod teardown;

use anyhow::Result;
use clap::{Parser, Subcommand};

use crate::config::{
    DiscardRoute, Settings, DEFAULT_BLACKHOLE_METRIC, DEFAULT_DISCARD_DEVICE,
    DEFAULT_TUNNEL_INTERFACE,
};
use crate::exec::{CommandRunner, Executor, SystemRunner};
use crate::logging::LogDestination;

pub use apply::ApplyCommand;
pub use teardown::TeardownCommand;

/// dhclient configuration helper for IPv6 rapid deployment (6rd).
#[derive(Debug, Parser)]
#[command(name = "sixrd")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Log destination.
    #[arg(long, global = true, value_enum, default_value_t = LogDestination::Syslog)]
    log_dest: LogDestination,

    /// SIT interface to (de)configure.
    #[arg(long, global = true, env = "SIXRD_INTERFACE", default_value = DEFAULT_TUNNEL_INTERFACE)]
    sixrd_interface: String,

    /// LAN interface to set up routing for. Empty disables LAN integration.
    #[arg(long, global = true, env = "SIXRD_LAN_INTERFACE", default_value = "")]
    lan_interface: String,

    /// Device blackhole routes are attached to when removing them.
    #[arg(long, global = true, env = "SIXRD_DISCARD_DEVICE", default_value = DEFAULT_DISCARD_DEVICE)]
    discard_device: String,

    /// Metric of the blackhole route for the delegated subnet.
    #[arg(long, global = true, env = "SIXRD_BLACKHOLE_METRIC", default_value_t = DEFAULT_BLACKHOLE_METRIC)]
    blackhole_metric: u32,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Debug, Subcommand)]
enum Commands {
    /// (Re)configure IPv6 connectivity for an acquired lease.
    #[command(alias = "start")]
    Apply(ApplyCommand),

    /// Tear down IPv6 configuration for a released lease.
    #[command(alias = "stop")]
    Teardown(TeardownCommand),
}

impl Cli {
    /// Where logs should go.
    pub fn log_dest(&self) -> LogDestination {
        self.log_dest
    }

    /// Settings shared by both subcommands.
    pub fn settings(&self) -> Settings {
        Settings::new(self.sixrd_interface.clone(), &self.lan_interface).with_discard(
            DiscardRoute {
                metric: self.blackhole_metric,
                device: self.discard_device.clone(),
            },
        )
    }

    /// Run the command against the host.
    pub fn run(self) -> Result<()> {
        self.run_with(&Executor::new(SystemRunner))
    }

    /// Run the command with the given executor.
    pub fn run_with<R: CommandRunner>(self, executor: &Executor<R>) -> Result<()> {
        let settings = self.settings();

        match self.command {
            Commands::Apply(cmd) => cmd.run(executor, &settings),
            Commands::Teardown(cmd) => cmd.run(executor, &settings),
        }
    }
}
