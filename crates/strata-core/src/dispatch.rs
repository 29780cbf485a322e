//! Command-line resolution and execution.
//!
//! Resolution walks a fixed sequence and fails fast on the first token it
//! cannot resolve:
//!
//! ```text
//! Start --service--> ServiceResolved --command--> CommandResolved --flags--> Ready --run--> Done
//!   |                      |                            |
//!   +-> UnknownService     +-> UnknownCommand           +-> FlagParse
//! ```
//!
//! A flag-looking token where the service belongs is reported as a flag
//! error rather than an unknown service.
//!
//! A failure prints usage for the deepest level that did resolve: global
//! usage for an unknown service, service usage for an unknown command,
//! command usage for bad flags. `--help`/`-h` at any level prints that
//! level's usage and succeeds.

use std::error::Error as StdError;
use std::io::{self, Write};

use clap::error::ErrorKind;
use strata_types::error::{CommandError, DispatchError};
use strata_types::exit::ExitStatus;
use tracing::{Instrument, debug, info_span, warn};

use crate::command::{BoxCommand, CommandContext};
use crate::flags;
use crate::registry::Registry;
use crate::service::Service;
use crate::usage;

/// Program name used in usage text when none is configured.
pub const DEFAULT_PROGRAM: &str = "strata";

/// Where resolution ended when it did not fail.
#[derive(Debug)]
pub enum Resolution<'r> {
    /// A help request; the text is the usage for the requested level.
    Help(String),
    /// A fully resolved command ready to run.
    Ready(Invocation<'r>),
}

/// A resolved command and its validated arguments.
#[derive(Debug)]
pub struct Invocation<'r> {
    pub service: &'r Service,
    pub command: &'r BoxCommand,
    pub args: strata_types::command::ParsedArgs,
}

/// Resolves argument vectors against a [`Registry`] and runs the result.
///
/// Holds the registry by shared reference; the registry is never modified
/// during dispatch.
#[derive(Debug, Clone)]
pub struct Dispatcher<'r> {
    registry: &'r Registry,
    program: String,
}

impl<'r> Dispatcher<'r> {
    pub fn new(registry: &'r Registry) -> Self {
        Self {
            registry,
            program: DEFAULT_PROGRAM.to_string(),
        }
    }

    /// Override the program name shown in usage text.
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn registry(&self) -> &'r Registry {
        self.registry
    }

    /// Resolve `argv` (without the program name) to a help text or a ready
    /// invocation. Never runs a command.
    pub fn resolve(&self, argv: &[String]) -> Result<Resolution<'r>, DispatchError> {
        let Some((first, rest)) = argv.split_first() else {
            return Err(DispatchError::MissingService);
        };

        // `help [service [command]]` is `[service [command]] --help`.
        if first == "help" {
            if rest.is_empty() {
                return Ok(Resolution::Help(self.global_usage()));
            }
            let mut rewritten = rest.to_vec();
            rewritten.push("--help".to_string());
            return self.resolve(&rewritten);
        }
        if is_help(first) {
            return Ok(Resolution::Help(self.global_usage()));
        }
        // Global flags are consumed before dispatch; a leftover one is misspelt.
        if first.starts_with('-') {
            return Err(DispatchError::UnexpectedFlag(first.clone()));
        }

        let service = self.registry.lookup(first)?;
        debug!(service = service.name(), "Resolved service");

        let Some((second, tokens)) = rest.split_first() else {
            return Err(DispatchError::MissingCommand(service.name().to_string()));
        };
        if is_help(second) {
            return Ok(Resolution::Help(usage::service_usage(&self.program, service)));
        }

        let command = service.find_command(second)?;
        debug!(
            service = service.name(),
            command = command.name(),
            "Resolved command"
        );

        let schema = command.flag_schema();
        let parser = flags::build_parser(
            &self.display_name(service, command),
            command.description(),
            &schema,
        );
        match flags::parse(parser, &schema, tokens) {
            Ok(args) => Ok(Resolution::Ready(Invocation {
                service,
                command,
                args,
            })),
            Err(err) if err.kind() == ErrorKind::DisplayHelp => {
                Ok(Resolution::Help(err.to_string()))
            }
            Err(err) => Err(DispatchError::FlagParse {
                service: service.name().to_string(),
                command: command.name().to_string(),
                reason: flags::error_reason(&err),
            }),
        }
    }

    /// Usage scoped to the deepest level `err` managed to resolve.
    pub fn usage_for(&self, err: &DispatchError) -> String {
        match err {
            DispatchError::MissingService
            | DispatchError::UnexpectedFlag(_)
            | DispatchError::UnknownService(_) => self.global_usage(),
            DispatchError::MissingCommand(service)
            | DispatchError::UnknownCommand { service, .. } => self
                .registry
                .lookup(service)
                .map(|s| usage::service_usage(&self.program, s))
                .unwrap_or_else(|_| self.global_usage()),
            DispatchError::FlagParse {
                service, command, ..
            } => match self.registry.lookup(service) {
                Ok(s) => match s.find_command(command) {
                    Ok(c) => self.command_usage(s, c),
                    Err(_) => usage::service_usage(&self.program, s),
                },
                Err(_) => self.global_usage(),
            },
        }
    }

    /// Resolve and run one command line, writing results to `out` and
    /// diagnostics to `err`.
    ///
    /// I/O errors on the output streams are the only errors returned; every
    /// dispatch or command failure is reported through the exit status.
    pub async fn dispatch<O, E>(
        &self,
        ctx: &CommandContext,
        argv: &[String],
        out: &mut O,
        err: &mut E,
    ) -> io::Result<ExitStatus>
    where
        O: Write,
        E: Write,
    {
        let invocation = match self.resolve(argv) {
            Ok(Resolution::Ready(invocation)) => invocation,
            Ok(Resolution::Help(text)) => {
                writeln!(out, "{}", text.trim_end())?;
                return Ok(ExitStatus::Success);
            }
            Err(dispatch_err) => {
                let status = dispatch_err.exit_status();
                debug!(error = %dispatch_err, exit = status.code(), "Resolution failed");
                writeln!(err, "error: {dispatch_err}")?;
                writeln!(err)?;
                writeln!(err, "{}", self.usage_for(&dispatch_err).trim_end())?;
                return Ok(status);
            }
        };

        let span = info_span!(
            "cli.dispatch",
            cli.service = invocation.service.name(),
            cli.command = invocation.command.name(),
        );
        let result = invocation
            .command
            .run(ctx, invocation.args)
            .instrument(span)
            .await;

        match result {
            Ok(output) => {
                if let Some(message) = output.message {
                    writeln!(out, "{}", message.trim_end())?;
                }
                Ok(ExitStatus::Success)
            }
            Err(command_err) => {
                warn!(
                    service = invocation.service.name(),
                    command = invocation.command.name(),
                    error = %command_err,
                    "Command failed"
                );
                write_command_error(err, &command_err)?;
                Ok(ExitStatus::CommandFailed)
            }
        }
    }

    fn global_usage(&self) -> String {
        usage::global_usage(&self.program, self.registry)
    }

    fn command_usage(&self, service: &Service, command: &BoxCommand) -> String {
        let mut parser = flags::build_parser(
            &self.display_name(service, command),
            command.description(),
            &command.flag_schema(),
        );
        parser.render_help().to_string()
    }

    fn display_name(&self, service: &Service, command: &BoxCommand) -> String {
        format!("{} {} {}", self.program, service.name(), command.name())
    }
}

fn is_help(token: &str) -> bool {
    token == "--help" || token == "-h"
}

/// Print the message, then each distinct cause in the source chain.
fn write_command_error<E: Write>(w: &mut E, err: &CommandError) -> io::Result<()> {
    writeln!(w, "error: {err}")?;
    let mut last = err.to_string();
    let mut source = err.source();
    while let Some(cause) = source {
        let text = cause.to_string();
        if text != last {
            writeln!(w, "  caused by: {text}")?;
        }
        last = text;
        source = cause.source();
    }
    Ok(())
}
