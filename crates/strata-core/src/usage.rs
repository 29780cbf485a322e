//! Usage text for the global and service levels.
//!
//! Command-level usage is rendered by clap from the command's flag schema
//! (see [`crate::flags`]).

use std::fmt::Write;

use crate::registry::Registry;
use crate::service::Service;

/// Global usage: every service with its description.
pub fn global_usage(program: &str, registry: &Registry) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "Usage: {program} <SERVICE> <COMMAND> [FLAGS] [ARGS]");
    let _ = writeln!(out);
    let _ = writeln!(out, "Services:");
    let rows: Vec<_> = registry
        .list_all()
        .map(|s| (s.name(), s.description()))
        .collect();
    write_rows(&mut out, &rows);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Run '{program} <SERVICE> --help' to list the commands of a service."
    );
    out
}

/// Service usage: the service description and its commands.
pub fn service_usage(program: &str, service: &Service) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "{}", service.description());
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Usage: {program} {} <COMMAND> [FLAGS] [ARGS]",
        service.name()
    );
    let _ = writeln!(out);
    let _ = writeln!(out, "Commands:");
    let rows: Vec<_> = service
        .commands()
        .iter()
        .map(|c| (c.name(), c.description()))
        .collect();
    write_rows(&mut out, &rows);
    let _ = writeln!(out);
    let _ = writeln!(
        out,
        "Run '{program} {} <COMMAND> --help' for the flags of a command.",
        service.name()
    );
    out
}

fn write_rows(out: &mut String, rows: &[(&str, &str)]) {
    let width = rows.iter().map(|(name, _)| name.len()).max().unwrap_or(0);
    for (name, description) in rows {
        let _ = writeln!(out, "  {name:<width$}  {description}");
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::command::{Command, CommandContext};
    use strata_types::command::{CommandOutput, ParsedArgs};
    use strata_types::error::CommandError;

    struct Stub(&'static str, &'static str);

    impl Command for Stub {
        fn name(&self) -> &str {
            self.0
        }

        fn description(&self) -> &str {
            self.1
        }

        async fn run(
            &self,
            _ctx: &CommandContext,
            _args: ParsedArgs,
        ) -> Result<CommandOutput, CommandError> {
            Ok(CommandOutput::silent())
        }
    }

    fn registry() -> Registry {
        Registry::from_services([
            Service::new("journal", "Format, backup, and other journal related operations")
                .command(Stub("format", "Format the journal folder"))
                .command(Stub("backup", "Back up the journal folder")),
            Service::new("conf", "Inspect the effective CLI configuration")
                .command(Stub("get", "Print one key")),
        ])
        .unwrap()
    }

    #[test]
    fn test_global_usage_lists_services_in_order() {
        let text = global_usage("strata", &registry());
        assert!(text.starts_with("Usage: strata <SERVICE> <COMMAND>"));
        let journal = text.find("journal  Format, backup").unwrap();
        let conf = text.find("conf     Inspect").unwrap();
        assert!(journal < conf);
    }

    #[test]
    fn test_service_usage_lists_only_its_commands() {
        let registry = registry();
        let journal = registry.lookup("journal").unwrap();
        let text = service_usage("strata", journal);
        assert!(text.starts_with("Format, backup, and other journal related operations"));
        assert!(text.contains("Usage: strata journal <COMMAND>"));
        assert!(text.contains("  format  Format the journal folder"));
        assert!(text.contains("  backup  Back up the journal folder"));
        assert!(!text.contains("Print one key"));
    }
}
