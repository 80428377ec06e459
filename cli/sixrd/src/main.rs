//! sixrd - dhclient configuration helper for IPv6 rapid deployment (6rd).
//!
//! Invoked from a dhclient exit hook:
//!
//! ```text
//! sixrd apply --ip "$new_ip_address" --options "$new_option_6rd"
//! sixrd teardown --ip "$old_ip_address" --options "$old_option_6rd"
//! ```

use std::process::ExitCode;

use clap::Parser;
use sixrd::commands::Cli;
use sixrd::{logging, SixrdError};
use tracing::{error, info};

fn main() -> ExitCode {
    let cli = Cli::parse();

    if let Err(e) = logging::init(cli.log_dest()) {
        eprintln!("Failed to initialize logging: {}", e);
        return ExitCode::from(1);
    }

    info!(version = env!("CARGO_PKG_VERSION"), "sixrd starting");

    match cli.run() {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            let (reason, input_error) = match e.downcast_ref::<SixrdError>() {
                Some(err) => (err.reason_code(), err.is_input_error()),
                None => ("internal", false),
            };
            error!(reason, input_error, error = %e, "6rd configuration failed");

            for cause in e.chain().skip(1) {
                error!(cause = %cause, "caused by");
            }
            ExitCode::from(1)
        }
    }
}
