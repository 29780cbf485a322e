//! strata cluster administration CLI entry point.
//!
//! Binary name: `strata`
//!
//! Parses global flags, sets up tracing, loads configuration, builds the
//! service registry, then hands the rest of the command line to the
//! dispatcher. The process exit code is the dispatcher's [`ExitStatus`].

mod cli;

use std::io::IsTerminal;
use std::process::ExitCode;

use anyhow::Context;
use clap::Parser;
use strata_core::command::CommandContext;
use strata_core::dispatch::Dispatcher;
use strata_infra::config::{load_config, resolve_conf_dir};
use strata_observe::tracing_setup::{init_tracing, shutdown_tracing, verbosity_filter};
use strata_types::exit::ExitStatus;

use cli::Cli;

#[tokio::main]
async fn main() -> ExitCode {
    let cli = Cli::parse();

    let verbose = if cli.debug_log {
        cli.verbose.max(1)
    } else {
        cli.verbose
    };
    if let Err(e) = init_tracing(verbosity_filter(verbose, cli.quiet), cli.otel) {
        eprintln!("Warning: failed to initialize tracing: {e}");
    }

    let status = match run(cli).await {
        Ok(status) => status,
        Err(e) => {
            eprintln!("error: {e:#}");
            ExitStatus::Startup
        }
    };

    shutdown_tracing();
    status.into()
}

/// Everything after flag parsing. Errors returned here are startup failures;
/// dispatch outcomes travel back as an [`ExitStatus`].
async fn run(cli: Cli) -> anyhow::Result<ExitStatus> {
    let conf_dir = resolve_conf_dir(cli.conf_dir.as_deref());
    let loaded = load_config(&conf_dir)
        .await
        .context("failed to load configuration")?;

    let registry = cli::registry().context("failed to register services")?;
    tracing::debug!(services = registry.len(), "Registry ready");

    let mut ctx = CommandContext::new(loaded.config);
    ctx.config_path = loaded.source;
    ctx.json = cli.json;
    ctx.quiet = cli.quiet;
    ctx.interactive = std::io::stdin().is_terminal() && std::io::stderr().is_terminal();

    let dispatcher = Dispatcher::new(&registry);
    let status = dispatcher
        .dispatch(&ctx, &cli.args, &mut std::io::stdout(), &mut std::io::stderr())
        .await
        .context("failed to write command output")?;

    tracing::debug!(exit = status.code(), "Dispatch finished");
    Ok(status)
}
