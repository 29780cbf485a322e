//! Journal folder metadata and backup manifest types.

use std::path::PathBuf;

use chrono::{DateTime, Utc};
use semver::Version;
use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// Version written into freshly formatted journals.
pub const JOURNAL_FORMAT_VERSION: Version = Version::new(1, 0, 0);

/// File name of the marker written by `journal format`.
pub const FORMAT_MARKER_FILE: &str = "FORMAT";

/// File name of the manifest written into every backup.
pub const BACKUP_MANIFEST_FILE: &str = "MANIFEST.json";

/// Extension of journal segment files.
pub const SEGMENT_EXTENSION: &str = "log";

/// Contents of the `FORMAT` marker at the root of a journal folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct JournalMarker {
    pub version: Version,
    pub cluster_id: Uuid,
    pub formatted_at: DateTime<Utc>,
}

impl JournalMarker {
    /// A marker for a journal formatted now, with a new cluster id.
    pub fn fresh() -> Self {
        Self {
            version: JOURNAL_FORMAT_VERSION,
            cluster_id: Uuid::now_v7(),
            formatted_at: Utc::now(),
        }
    }

    /// Journals are readable when the major version matches.
    pub fn is_compatible(&self) -> bool {
        self.version.major == JOURNAL_FORMAT_VERSION.major
    }
}

/// Read-only view of a formatted journal folder.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct JournalSummary {
    pub folder: PathBuf,
    pub marker: JournalMarker,
    pub segments: usize,
    pub total_bytes: u64,
}

/// One file captured in a backup.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupEntry {
    pub name: String,
    pub size: u64,
    /// Lowercase hex SHA-256 of the file contents.
    pub sha256: String,
}

/// `MANIFEST.json` written at the root of a backup directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BackupManifest {
    pub created_at: DateTime<Utc>,
    pub source_folder: PathBuf,
    pub marker: JournalMarker,
    pub files: Vec<BackupEntry>,
}

impl BackupManifest {
    pub fn total_bytes(&self) -> u64 {
        self.files.iter().map(|f| f.size).sum()
    }
}

/// Result of `journal backup`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct BackupReport {
    pub directory: PathBuf,
    pub files: usize,
    pub total_bytes: u64,
}

/// Result of a successful `journal verify`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct VerifyReport {
    pub directory: PathBuf,
    pub files_checked: usize,
    pub cluster_id: Uuid,
}
