//! Process exit statuses.
//!
//! The numeric values are part of the CLI's external contract and must not
//! be renumbered.

use std::fmt;

/// Outcome category of a single `strata` invocation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum ExitStatus {
    /// The command (or a help request) completed.
    Success = 0,
    /// The command ran and returned an error.
    CommandFailed = 1,
    /// Flags or positionals did not match the command's schema.
    InvalidFlags = 2,
    /// The service name is not registered.
    UnknownService = 3,
    /// The command name is not part of the resolved service.
    UnknownCommand = 4,
    /// The service or command token is missing.
    Incomplete = 5,
    /// Configuration or registry initialization failed.
    Startup = 6,
}

impl ExitStatus {
    pub fn code(self) -> u8 {
        self as u8
    }

    pub fn is_success(self) -> bool {
        self == Self::Success
    }
}

impl fmt::Display for ExitStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let label = match self {
            Self::Success => "success",
            Self::CommandFailed => "command failed",
            Self::InvalidFlags => "invalid flags",
            Self::UnknownService => "unknown service",
            Self::UnknownCommand => "unknown command",
            Self::Incomplete => "incomplete command line",
            Self::Startup => "startup failure",
        };
        write!(f, "{label} ({})", self.code())
    }
}

impl From<ExitStatus> for std::process::ExitCode {
    fn from(status: ExitStatus) -> Self {
        std::process::ExitCode::from(status.code())
    }
}
