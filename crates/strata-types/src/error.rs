use std::error::Error as StdError;
use std::path::PathBuf;

use thiserror::Error;

use crate::exit::ExitStatus;

/// Errors raised while assembling the command registry at startup.
///
/// These are programmer errors in the static service declarations and are
/// fatal to process initialization.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    #[error("service '{0}' is already registered")]
    DuplicateService(String),

    #[error("service '{0}' declares no commands")]
    EmptyService(String),

    #[error("service '{service}' declares command '{command}' more than once")]
    DuplicateCommand { service: String, command: String },

    #[error("invalid name '{0}': use lowercase letters, digits and '-', starting with a letter")]
    InvalidName(String),

    #[error("'{0}' is a reserved name")]
    ReservedName(String),

    #[error("'{0}' has no description")]
    MissingDescription(String),

    #[error("command '{service} {command}' declares an invalid flag '{flag}': {reason}")]
    InvalidFlag {
        service: String,
        command: String,
        flag: String,
        reason: String,
    },
}

/// Errors raised while resolving a command line against the registry.
///
/// All variants are user errors: they are reported with a usage message and
/// never invoke a command.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DispatchError {
    #[error("no service given")]
    MissingService,

    #[error("unknown service '{0}'")]
    UnknownService(String),

    #[error("no command given for service '{0}'")]
    MissingCommand(String),

    #[error("unknown command '{command}' for service '{service}'")]
    UnknownCommand { service: String, command: String },

    #[error("unexpected argument '{0}' before the service name")]
    UnexpectedFlag(String),

    #[error("{reason}")]
    FlagParse {
        service: String,
        command: String,
        reason: String,
    },
}

impl DispatchError {
    /// Exit status reported for this resolution failure.
    pub fn exit_status(&self) -> ExitStatus {
        match self {
            Self::MissingService | Self::MissingCommand(_) => ExitStatus::Incomplete,
            Self::UnknownService(_) => ExitStatus::UnknownService,
            Self::UnknownCommand { .. } => ExitStatus::UnknownCommand,
            Self::UnexpectedFlag(_) | Self::FlagParse { .. } => ExitStatus::InvalidFlags,
        }
    }
}

/// Failure returned by a command's `run`.
///
/// Carries a user-facing message and an optional cause. The dispatcher prints
/// the message followed by the cause chain.
#[derive(Debug, Error)]
#[error("{message}")]
pub struct CommandError {
    message: String,
    #[source]
    source: Option<Box<dyn StdError + Send + Sync + 'static>>,
}

impl CommandError {
    /// A failure with a message and no underlying cause.
    pub fn new(message: impl Into<String>) -> Self {
        Self {
            message: message.into(),
            source: None,
        }
    }

    /// A failure with a message wrapping an underlying cause.
    pub fn with_source(
        message: impl Into<String>,
        source: impl StdError + Send + Sync + 'static,
    ) -> Self {
        Self {
            message: message.into(),
            source: Some(Box::new(source)),
        }
    }

    /// Use an error's own display text as the message and keep it as the cause.
    pub fn from_error(err: impl StdError + Send + Sync + 'static) -> Self {
        Self {
            message: err.to_string(),
            source: Some(Box::new(err)),
        }
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

impl From<JournalError> for CommandError {
    fn from(err: JournalError) -> Self {
        Self::from_error(err)
    }
}

impl From<ConfigError> for CommandError {
    fn from(err: ConfigError) -> Self {
        Self::from_error(err)
    }
}

/// Errors from loading or querying the CLI configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config file {path}")]
    Read {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("invalid config file {path}: {message}")]
    Parse { path: PathBuf, message: String },

    #[error("unknown config key '{0}'")]
    UnknownKey(String),

    #[error("config could not be flattened: {0}")]
    Serialize(String),
}

/// Errors from local journal maintenance operations.
#[derive(Debug, Error)]
pub enum JournalError {
    #[error("journal folder {0} is not formatted")]
    NotFormatted(PathBuf),

    #[error("journal folder {0} already contains entries; pass --force to format it")]
    NotEmpty(PathBuf),

    #[error("journal folder {0} already contains entries and no terminal is attached to confirm; pass --force")]
    ConfirmationRequired(PathBuf),

    #[error("format of {0} aborted")]
    Aborted(PathBuf),

    #[error("journal format version {found} is not supported (expected {expected})")]
    UnsupportedVersion { found: String, expected: String },

    #[error("invalid journal marker {path}: {message}")]
    InvalidMarker { path: PathBuf, message: String },

    #[error("backup directory {0} already exists")]
    BackupExists(PathBuf),

    #[error("invalid backup manifest {path}: {message}")]
    InvalidManifest { path: PathBuf, message: String },

    #[error("backup {path} failed verification: {}", .problems.join(", "))]
    VerificationFailed { path: PathBuf, problems: Vec<String> },

    #[error("I/O error on {path}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
}

impl JournalError {
    /// Wrap an I/O error with the path it happened on.
    pub fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        Self::Io {
            path: path.into(),
            source,
        }
    }
}
