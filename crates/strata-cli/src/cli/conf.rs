//! `conf` service: inspect the effective CLI configuration.

use console::style;
use serde_json::json;
use strata_core::command::{Command, CommandContext};
use strata_core::service::Service;
use strata_types::command::{CommandOutput, FlagSchema, FlagSpec, ParsedArgs};
use strata_types::error::CommandError;

use crate::cli::output;

pub fn service() -> Service {
    Service::new("conf", "Inspect the effective CLI configuration")
        .command(GetCommand)
        .command(ShowCommand)
}

/// `strata conf get <KEY>`
pub struct GetCommand;

impl Command for GetCommand {
    fn name(&self) -> &str {
        "get"
    }

    fn description(&self) -> &str {
        "Print the value of one configuration key"
    }

    fn flag_schema(&self) -> FlagSchema {
        FlagSchema::new().with(FlagSpec::positional(
            "key",
            "Dotted key, e.g. journal.folder",
        ))
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        args: ParsedArgs,
    ) -> Result<CommandOutput, CommandError> {
        let key = args
            .value("key")
            .ok_or_else(|| CommandError::new("missing configuration key"))?;
        let value = ctx.config.get(key)?;

        if ctx.json {
            return Ok(CommandOutput::message(output::json(&json!({
                "key": key,
                "value": value,
            }))?));
        }
        Ok(CommandOutput::message(value))
    }
}

/// `strata conf show`
pub struct ShowCommand;

impl Command for ShowCommand {
    fn name(&self) -> &str {
        "show"
    }

    fn description(&self) -> &str {
        "Print every effective configuration value"
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        _args: ParsedArgs,
    ) -> Result<CommandOutput, CommandError> {
        let pairs = ctx.config.to_pairs()?;

        if ctx.json {
            let values: serde_json::Map<String, serde_json::Value> = pairs
                .into_iter()
                .map(|(k, v)| (k, serde_json::Value::String(v)))
                .collect();
            return Ok(CommandOutput::message(output::json(&json!({
                "source": ctx.config_path,
                "values": values,
            }))?));
        }

        let source = match &ctx.config_path {
            Some(path) => format!("Loaded from {}", style(path.display()).cyan()),
            None => format!("{}", style("No config file found; showing defaults").dim()),
        };
        let table = output::key_value_table(pairs);
        Ok(CommandOutput::message(format!("{table}\n\n  {source}")))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::path::PathBuf;
    use strata_types::config::CliConfig;

    #[tokio::test]
    async fn test_get_known_and_unknown_keys() {
        let ctx = CommandContext::new(CliConfig::default());

        let mut args = ParsedArgs::new();
        args.push_value("key", "cluster.master_rpc_port");
        let out = GetCommand.run(&ctx, args).await.unwrap();
        assert_eq!(out.message.as_deref(), Some("19998"));

        let mut args = ParsedArgs::new();
        args.push_value("key", "cluster.nope");
        let err = GetCommand.run(&ctx, args).await.unwrap_err();
        assert_eq!(err.message(), "unknown config key 'cluster.nope'");
    }

    #[tokio::test]
    async fn test_show_lists_every_key() {
        let mut ctx = CommandContext::new(CliConfig::default());
        ctx.config_path = Some(PathBuf::from("/etc/strata/strata.toml"));

        let text = ShowCommand
            .run(&ctx, ParsedArgs::new())
            .await
            .unwrap()
            .message
            .unwrap();
        for key in ["cluster.name", "journal.folder", "journal.type", "backup.directory"] {
            assert!(text.contains(key), "missing {key}");
        }
        assert!(text.contains("/etc/strata/strata.toml"));
    }

    #[tokio::test]
    async fn test_show_json() {
        let mut ctx = CommandContext::new(CliConfig::default());
        ctx.json = true;

        let text = ShowCommand
            .run(&ctx, ParsedArgs::new())
            .await
            .unwrap()
            .message
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&text).unwrap();
        assert!(value["source"].is_null());
        assert_eq!(value["values"]["journal.type"], "local");
    }
}
