use chrono::SecondsFormat;
use serde_json::json;
use strata_core::command::{Command, CommandContext};
use strata_infra::journal::backup::latest_backup;
use strata_types::command::{CommandOutput, FlagSchema, ParsedArgs};
use strata_types::error::CommandError;
use tracing::warn;

use super::{journal_for, path_flag};
use crate::cli::output;

/// `strata journal info [--path DIR]`
pub struct InfoCommand;

impl Command for InfoCommand {
    fn name(&self) -> &str {
        "info"
    }

    fn description(&self) -> &str {
        "Show the journal marker, segment count and size"
    }

    fn flag_schema(&self) -> FlagSchema {
        FlagSchema::new().with(path_flag())
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        args: ParsedArgs,
    ) -> Result<CommandOutput, CommandError> {
        let journal = journal_for(ctx, &args);
        let summary = journal.summary().await?;
        // The backup root comes from config even when --path overrides the
        // journal; an unreadable root must not hide the journal summary.
        let backup_root = &ctx.config.backup.directory;
        let latest = match latest_backup(backup_root).await {
            Ok(latest) => Some(latest),
            Err(err) => {
                warn!(
                    root = %backup_root.display(),
                    error = %err,
                    "Could not scan backup root"
                );
                None
            }
        };

        if ctx.json {
            return Ok(CommandOutput::message(output::json(&json!({
                "journal": summary,
                "type": ctx.config.journal.journal_type,
                "backup_root": backup_root,
                "latest_backup": latest.clone().flatten(),
                "backup_root_readable": latest.is_some(),
            }))?));
        }

        let table = output::key_value_table([
            ("Folder", summary.folder.display().to_string()),
            ("Type", ctx.config.journal.journal_type.to_string()),
            ("Format version", summary.marker.version.to_string()),
            ("Cluster id", summary.marker.cluster_id.to_string()),
            (
                "Formatted at",
                summary
                    .marker
                    .formatted_at
                    .to_rfc3339_opts(SecondsFormat::Secs, true),
            ),
            ("Segments", summary.segments.to_string()),
            ("Size", output::format_bytes(summary.total_bytes)),
            ("Backup root", backup_root.display().to_string()),
            (
                "Latest backup in root",
                match latest {
                    Some(Some(path)) => path.display().to_string(),
                    Some(None) => "none".to_string(),
                    None => "unknown".to_string(),
                },
            ),
        ]);
        Ok(CommandOutput::message(table.to_string()))
    }
}
