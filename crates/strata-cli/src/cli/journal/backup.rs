use std::path::PathBuf;

use console::style;
use indicatif::{ProgressBar, ProgressStyle};
use strata_core::command::{Command, CommandContext};
use strata_types::command::{CommandOutput, FlagSchema, FlagSpec, ParsedArgs};
use strata_types::error::CommandError;

use super::{journal_for, path_flag};
use crate::cli::output;

/// `strata journal backup [--path DIR] [--target DIR]`
pub struct BackupCommand;

impl Command for BackupCommand {
    fn name(&self) -> &str {
        "backup"
    }

    fn description(&self) -> &str {
        "Copy the journal into a timestamped backup directory"
    }

    fn flag_schema(&self) -> FlagSchema {
        FlagSchema::new()
            .with(path_flag())
            .with(FlagSpec::value(
                "target",
                "DIR",
                "Where to create the backup (default: backup.directory from config)",
            ))
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        args: ParsedArgs,
    ) -> Result<CommandOutput, CommandError> {
        let journal = journal_for(ctx, &args);
        let target = args
            .value("target")
            .map(PathBuf::from)
            .unwrap_or_else(|| ctx.config.backup.directory.clone());

        journal.read_marker().await?;
        let total = journal.backup_size().await?;

        let bar = if ctx.json || ctx.quiet {
            ProgressBar::hidden()
        } else {
            let bar = ProgressBar::new(total);
            bar.set_style(
                ProgressStyle::default_bar()
                    .template("{spinner:.cyan} [{bar:30.cyan/blue}] {bytes}/{total_bytes} {msg}")
                    .unwrap_or_else(|_| ProgressStyle::default_bar()),
            );
            bar
        };

        let result = journal
            .backup(&target, |entry| {
                bar.set_message(entry.name.clone());
                bar.inc(entry.size);
            })
            .await;
        bar.finish_and_clear();
        let report = result?;

        if ctx.json {
            return Ok(CommandOutput::message(output::json(&report)?));
        }
        Ok(CommandOutput::message(output::success(format!(
            "Backed up {} files ({}) to {}",
            report.files,
            output::format_bytes(report.total_bytes),
            style(report.directory.display()).cyan()
        ))))
    }
}
