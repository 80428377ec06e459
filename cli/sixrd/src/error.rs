//! Error types for the 6rd helper.

use sixrd_networking::NetworkError;
use sixrd_option::OptionError;
use thiserror::Error;

/// Fatal errors, each aborting the current invocation.
#[derive(Debug, Error)]
pub enum SixrdError {
    /// The WAN address handed over by the DHCP client is not IPv4.
    #[error("invalid WAN IPv4 address: '{0}'")]
    InvalidAddress(String),

    /// The 6rd option could not be decoded into a subnet.
    #[error("could not parse 6rd options: {0}")]
    Decode(#[from] OptionError),

    /// The tunnel MTU is out of range.
    #[error("invalid tunnel MTU: {0}")]
    InvalidMtu(#[from] NetworkError),

    /// A configuration command exited non-zero or could not be started.
    #[error("failed to execute: {command}: {detail}")]
    CommandFailed { command: String, detail: String },
}

impl SixrdError {
    /// Create a command failure from the rendered command line.
    pub fn command_failed(command: impl ToString, detail: impl Into<String>) -> Self {
        Self::CommandFailed {
            command: command.to_string(),
            detail: detail.into(),
        }
    }

    /// Get the standardized reason code for this error.
    pub fn reason_code(&self) -> &'static str {
        match self {
            SixrdError::InvalidAddress(_) => "invalid_address",
            SixrdError::Decode(_) => "decode_failed",
            SixrdError::InvalidMtu(_) => "invalid_mtu",
            SixrdError::CommandFailed { .. } => "command_failed",
        }
    }

    /// Returns true for bad inputs (address, option payload, MTU) as opposed to
    /// a failed command.
    pub fn is_input_error(&self) -> bool {
        !matches!(self, SixrdError::CommandFailed { .. })
    }
}
