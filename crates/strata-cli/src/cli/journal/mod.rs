//! `journal` service: format, back up and inspect the local journal folder.

mod backup;
mod format;
mod info;
mod verify;

use std::path::PathBuf;

use strata_core::command::CommandContext;
use strata_core::service::Service;
use strata_infra::journal::LocalJournal;
use strata_types::command::{FlagSpec, ParsedArgs};

pub use backup::BackupCommand;
pub use format::FormatCommand;
pub use info::InfoCommand;
pub use verify::VerifyCommand;

pub fn service() -> Service {
    Service::new(
        "journal",
        "Format, backup, and other journal related operations",
    )
    .command(FormatCommand)
    .command(BackupCommand)
    .command(InfoCommand)
    .command(VerifyCommand)
}

/// The `--path` option shared by every command that reads the journal.
fn path_flag() -> FlagSpec {
    FlagSpec::value(
        "path",
        "DIR",
        "Journal folder (default: journal.folder from config)",
    )
}

/// Journal named by `--path`, or the configured one.
fn journal_for(ctx: &CommandContext, args: &ParsedArgs) -> LocalJournal {
    let folder = args
        .value("path")
        .map(PathBuf::from)
        .unwrap_or_else(|| ctx.config.journal.folder.clone());
    LocalJournal::new(folder)
}
