use std::path::PathBuf;

use console::style;
use strata_core::command::{Command, CommandContext};
use strata_infra::journal::backup::verify_backup;
use strata_types::command::{CommandOutput, FlagSchema, FlagSpec, ParsedArgs};
use strata_types::error::CommandError;

use crate::cli::output;

/// `strata journal verify <BACKUP_DIR>`
pub struct VerifyCommand;

impl Command for VerifyCommand {
    fn name(&self) -> &str {
        "verify"
    }

    fn description(&self) -> &str {
        "Check a journal backup against its manifest"
    }

    fn flag_schema(&self) -> FlagSchema {
        FlagSchema::new().with(FlagSpec::positional(
            "backup_dir",
            "Backup directory containing MANIFEST.json",
        ))
    }

    async fn run(
        &self,
        ctx: &CommandContext,
        args: ParsedArgs,
    ) -> Result<CommandOutput, CommandError> {
        let directory = args
            .value("backup_dir")
            .map(PathBuf::from)
            .ok_or_else(|| CommandError::new("missing backup directory"))?;

        let report = verify_backup(&directory).await?;

        if ctx.json {
            return Ok(CommandOutput::message(output::json(&report)?));
        }
        Ok(CommandOutput::message(output::success(format!(
            "{} files in {} match the manifest (cluster id {})",
            report.files_checked,
            style(report.directory.display()).cyan(),
            report.cluster_id
        ))))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use strata_infra::journal::LocalJournal;
    use strata_types::config::CliConfig;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_verify_fresh_backup_then_tampered() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path().join("journal"));
        journal.format().await.unwrap();
        std::fs::write(journal.folder().join("0001.log"), b"segment").unwrap();
        let report = journal
            .backup(&dir.path().join("backups"), |_| {})
            .await
            .unwrap();

        let ctx = CommandContext::new(CliConfig::default());
        let mut args = ParsedArgs::new();
        args.push_value("backup_dir", report.directory.display().to_string());
        let out = VerifyCommand.run(&ctx, args.clone()).await.unwrap();
        assert!(out.message.unwrap().contains("2 files"));

        std::fs::write(report.directory.join("0001.log"), b"SEGMENT").unwrap();
        let err = VerifyCommand.run(&ctx, args).await.unwrap_err();
        assert!(err.message().contains("0001.log: checksum mismatch"));
    }
}
