use console::style;
use dialoguer::Confirm;
use serde_json::json;
use strata_core::command::{Command, CommandContext};
use strata_types::command::{CommandOutput, FlagSchema, FlagSpec, ParsedArgs};
use strata_types::error::{CommandError, JournalError};

use super::{journal_for, path_flag};
use crate::cli::output;

/// `strata journal format [--force] [--path DIR]`
pub struct FormatCommand;

impl Command for FormatCommand {
    fn name(&self) -> &str {
        "format"
    }

    fn description(&self) -> &str {
        "Format the journal folder, erasing any existing entries"
    }

    fn flag_schema(&self) -> FlagSchema {
        FlagSchema::new()
            .with(FlagSpec::switch("force", "Format without asking for confirmation").short('f'))
            .with(path_flag())
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        args: ParsedArgs,
    ) -> Result<CommandOutput, CommandError> {
        let journal = journal_for(ctx, &args);

        if !args.flag("force") && journal.has_entries().await? {
            let folder = journal.folder().to_path_buf();
            // No prompts in machine-readable mode.
            if ctx.json {
                return Err(JournalError::NotEmpty(folder).into());
            }
            if !ctx.interactive {
                return Err(JournalError::ConfirmationRequired(folder).into());
            }

            let confirmed = Confirm::new()
                .with_prompt(format!(
                    "Erase every entry in {} and format it?",
                    style(folder.display()).red().bold()
                ))
                .default(false)
                .interact()
                .map_err(|e| CommandError::with_source("confirmation prompt failed", e))?;
            if !confirmed {
                return Err(JournalError::Aborted(folder).into());
            }
        }

        let marker = journal.format().await?;

        if ctx.json {
            return Ok(CommandOutput::message(output::json(&json!({
                "folder": journal.folder(),
                "marker": marker,
            }))?));
        }
        Ok(CommandOutput::message(output::success(format!(
            "Formatted journal {} (cluster id {})",
            style(journal.folder().display()).cyan(),
            style(marker.cluster_id).bold()
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_types::config::CliConfig;
    use tempfile::tempdir;

    fn args_for(path: &std::path::Path, force: bool) -> ParsedArgs {
        let mut args = ParsedArgs::new();
        args.push_value("path", path.display().to_string());
        args.set_switch("force", force);
        args
    }

    #[tokio::test]
    async fn test_format_empty_folder_without_force() {
        let dir = tempdir().unwrap();
        let folder = dir.path().join("journal");
        let ctx = CommandContext::new(CliConfig::default());

        let out = FormatCommand.run(&ctx, args_for(&folder, false)).await.unwrap();
        assert!(out.message.unwrap().contains("Formatted journal"));
        assert!(folder.join("FORMAT").exists());
    }

    #[tokio::test]
    async fn test_format_refuses_non_empty_folder_without_terminal() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("0001.log"), b"entries").unwrap();
        let ctx = CommandContext::new(CliConfig::default());

        let err = FormatCommand
            .run(&ctx, args_for(dir.path(), false))
            .await
            .unwrap_err();
        assert!(err.message().contains("pass --force"));
        assert!(dir.path().join("0001.log").exists());
    }

    #[tokio::test]
    async fn test_format_force_wipes_entries() {
        let dir = tempdir().unwrap();
        std::fs::write(dir.path().join("0001.log"), b"entries").unwrap();
        let mut ctx = CommandContext::new(CliConfig::default());
        ctx.json = true;

        let out = FormatCommand
            .run(&ctx, args_for(dir.path(), true))
            .await
            .unwrap();
        let value: serde_json::Value = serde_json::from_str(&out.message.unwrap()).unwrap();
        assert_eq!(value["marker"]["version"], "1.0.0");
        assert!(!dir.path().join("0001.log").exists());
    }
}
