//! The `Command` contract and its type-erased wrapper.
//!
//! Follows the blanket-impl pattern used for other RPITIT traits:
//! 1. `Command` is the ergonomic trait concrete operations implement
//! 2. `CommandDyn` is an object-safe mirror with a boxed future
//! 3. `BoxCommand` wraps `Box<dyn CommandDyn>` so services can hold
//!    heterogeneous commands

use std::fmt;
use std::future::Future;
use std::path::PathBuf;
use std::pin::Pin;
use std::sync::Arc;

use strata_types::command::{CommandOutput, FlagSchema, ParsedArgs};
use strata_types::config::CliConfig;
use strata_types::error::CommandError;

/// Everything a command may read besides its own arguments.
#[derive(Debug, Clone)]
pub struct CommandContext {
    /// Effective configuration, loaded once at startup.
    pub config: Arc<CliConfig>,
    /// File the configuration was read from; `None` when defaults were used.
    pub config_path: Option<PathBuf>,
    /// Emit machine-readable JSON instead of styled text.
    pub json: bool,
    /// Suppress progress output.
    pub quiet: bool,
    /// Whether a terminal is attached for confirmation prompts.
    pub interactive: bool,
}

impl CommandContext {
    pub fn new(config: CliConfig) -> Self {
        Self {
            config: Arc::new(config),
            config_path: None,
            json: false,
            quiet: false,
            interactive: false,
        }
    }
}

/// One executable administrative operation.
///
/// `run` is invoked at most once per dispatch and never retried by the
/// dispatcher. Any side effects are the command's own business.
pub trait Command: Send + Sync {
    /// Name used on the command line; unique within its service.
    fn name(&self) -> &str;

    /// One-line description shown in service usage.
    fn description(&self) -> &str;

    /// Flags, options and positionals this command accepts.
    fn flag_schema(&self) -> FlagSchema {
        FlagSchema::new()
    }

    /// Perform the operation.
    fn run(
        &self,
        ctx: &CommandContext,
        args: ParsedArgs,
    ) -> impl Future<Output = Result<CommandOutput, CommandError>> + Send;
}

/// Object-safe version of [`Command`] with a boxed future.
pub trait CommandDyn: Send + Sync {
    fn name(&self) -> &str;

    fn description(&self) -> &str;

    fn flag_schema(&self) -> FlagSchema;

    fn run_boxed<'a>(
        &'a self,
        ctx: &'a CommandContext,
        args: ParsedArgs,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, CommandError>> + Send + 'a>>;
}

impl<T: Command> CommandDyn for T {
    fn name(&self) -> &str {
        Command::name(self)
    }

    fn description(&self) -> &str {
        Command::description(self)
    }

    fn flag_schema(&self) -> FlagSchema {
        Command::flag_schema(self)
    }

    fn run_boxed<'a>(
        &'a self,
        ctx: &'a CommandContext,
        args: ParsedArgs,
    ) -> Pin<Box<dyn Future<Output = Result<CommandOutput, CommandError>> + Send + 'a>> {
        Box::pin(self.run(ctx, args))
    }
}

/// Type-erased command held by a [`Service`](crate::service::Service).
pub struct BoxCommand {
    inner: Box<dyn CommandDyn>,
}

impl BoxCommand {
    pub fn new<T: Command + 'static>(command: T) -> Self {
        Self {
            inner: Box::new(command),
        }
    }

    pub fn name(&self) -> &str {
        self.inner.name()
    }

    pub fn description(&self) -> &str {
        self.inner.description()
    }

    pub fn flag_schema(&self) -> FlagSchema {
        self.inner.flag_schema()
    }

    pub async fn run(
        &self,
        ctx: &CommandContext,
        args: ParsedArgs,
    ) -> Result<CommandOutput, CommandError> {
        self.inner.run_boxed(ctx, args).await
    }
}

impl fmt::Debug for BoxCommand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BoxCommand")
            .field("name", &self.name())
            .finish()
    }
}
