//! Global flags and the service table for the `strata` binary.
//!
//! clap parses only the flags that come before the service name. Everything
//! from the service name on is handed to the dispatcher untouched, so the
//! command line reads `strata [GLOBAL FLAGS] <SERVICE> <COMMAND> [ARGS]`.

pub mod conf;
pub mod journal;
mod output;

use std::path::PathBuf;

use clap::Parser;
use strata_core::registry::Registry;
use strata_core::service::Service;
use strata_types::error::RegistryError;

/// Administer a strata storage cluster.
#[derive(Parser, Debug)]
#[command(name = "strata", version, about, long_about = None)]
#[command(disable_help_flag = true)]
pub struct Cli {
    /// Output machine-readable JSON instead of styled text.
    #[arg(long)]
    pub json: bool,

    /// Suppress progress output and all logs except errors.
    #[arg(long)]
    pub quiet: bool,

    /// Detailed output (-v for debug, -vv for trace).
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Same as -v.
    #[arg(long)]
    pub debug_log: bool,

    /// Export tracing spans through OpenTelemetry (stdout exporter).
    #[arg(long)]
    pub otel: bool,

    /// Directory holding strata.toml (default: $STRATA_CONF_DIR, then ~/.strata).
    #[arg(long, value_name = "DIR")]
    pub conf_dir: Option<PathBuf>,

    /// Service, command and command arguments.
    #[arg(trailing_var_arg = true, allow_hyphen_values = true, value_name = "ARGS")]
    pub args: Vec<String>,
}

/// Every service the binary ships, in help-listing order.
pub fn services() -> Vec<Service> {
    vec![journal::service(), conf::service()]
}

pub fn registry() -> Result<Registry, RegistryError> {
    Registry::from_services(services())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_definition_is_valid() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_global_flags_stop_at_service() {
        let cli = Cli::try_parse_from([
            "strata", "--json", "-vv", "journal", "info", "--path", "/j", "-v",
        ])
        .unwrap();
        assert!(cli.json);
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.args, vec!["journal", "info", "--path", "/j", "-v"]);
    }

    #[test]
    fn test_help_token_reaches_dispatcher() {
        let cli = Cli::try_parse_from(["strata", "--help"]).unwrap();
        assert_eq!(cli.args, vec!["--help"]);

        let cli = Cli::try_parse_from(["strata", "help", "journal"]).unwrap();
        assert_eq!(cli.args, vec!["help", "journal"]);
    }

    #[test]
    fn test_every_command_parser_is_valid() {
        for service in services() {
            for command in service.commands() {
                let name = format!("strata {} {}", service.name(), command.name());
                let schema = command.flag_schema();
                strata_core::flags::build_parser(&name, command.description(), &schema)
                    .debug_assert();
            }
        }
    }

    #[test]
    fn test_registry_lists_services_in_order() {
        let registry = registry().unwrap();
        let names: Vec<_> = registry.list_all().map(|s| s.name()).collect();
        assert_eq!(names, vec!["journal", "conf"]);
    }
}
