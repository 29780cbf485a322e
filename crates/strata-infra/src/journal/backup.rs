//! Journal backups: copy, manifest, verify.

use std::path::{Component, Path, PathBuf};

use chrono::{DateTime, Utc};
use strata_types::error::JournalError;
use strata_types::journal::{
    BACKUP_MANIFEST_FILE, BackupEntry, BackupManifest, BackupReport, FORMAT_MARKER_FILE,
    VerifyReport,
};

use super::LocalJournal;
use crate::hash::sha256_file;

/// Directory name for a backup taken at `at`.
pub fn backup_dir_name(at: DateTime<Utc>) -> String {
    format!("journal-backup-{}", at.format("%Y%m%d-%H%M%S-%3f"))
}

impl LocalJournal {
    /// Total bytes a backup of this journal would copy.
    pub async fn backup_size(&self) -> Result<u64, JournalError> {
        let marker_len = tokio::fs::metadata(self.marker_path())
            .await
            .map_err(|e| JournalError::io(self.marker_path(), e))?
            .len();
        let segments = self.segments().await?;
        Ok(marker_len + segments.iter().map(|s| s.size).sum::<u64>())
    }

    /// Copy the marker and every segment into a new timestamped directory
    /// under `target_root` and write a manifest.
    ///
    /// `on_file` is called after each file lands, in copy order.
    pub async fn backup<F>(
        &self,
        target_root: &Path,
        on_file: F,
    ) -> Result<BackupReport, JournalError>
    where
        F: FnMut(&BackupEntry),
    {
        let created_at = Utc::now();
        let directory = target_root.join(backup_dir_name(created_at));
        self.backup_into(directory, created_at, on_file).await
    }

    /// Back up into exactly `directory`, which must not exist yet.
    async fn backup_into<F>(
        &self,
        directory: PathBuf,
        created_at: DateTime<Utc>,
        mut on_file: F,
    ) -> Result<BackupReport, JournalError>
    where
        F: FnMut(&BackupEntry),
    {
        let marker = self.read_marker().await?;
        let segments = self.segments().await?;

        if let Some(parent) = directory.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .map_err(|e| JournalError::io(parent, e))?;
        }
        match tokio::fs::create_dir(&directory).await {
            Ok(()) => {}
            Err(err) if err.kind() == std::io::ErrorKind::AlreadyExists => {
                return Err(JournalError::BackupExists(directory));
            }
            Err(err) => return Err(JournalError::io(&directory, err)),
        }

        let names = std::iter::once(FORMAT_MARKER_FILE.to_string())
            .chain(segments.into_iter().map(|s| s.name));

        let mut files = Vec::new();
        for name in names {
            let from = self.folder().join(&name);
            let to = directory.join(&name);
            tokio::fs::copy(&from, &to)
                .await
                .map_err(|e| JournalError::io(&from, e))?;
            let (sha256, size) = sha256_file(&to)
                .await
                .map_err(|e| JournalError::io(&to, e))?;

            let entry = BackupEntry { name, size, sha256 };
            tracing::debug!(file = %entry.name, size = entry.size, "Backed up journal file");
            on_file(&entry);
            files.push(entry);
        }

        let manifest = BackupManifest {
            created_at,
            source_folder: self.folder().to_path_buf(),
            marker,
            files,
        };
        let manifest_path = directory.join(BACKUP_MANIFEST_FILE);
        let json = serde_json::to_string_pretty(&manifest).map_err(|e| {
            JournalError::InvalidManifest {
                path: manifest_path.clone(),
                message: e.to_string(),
            }
        })?;
        tokio::fs::write(&manifest_path, json)
            .await
            .map_err(|e| JournalError::io(&manifest_path, e))?;

        tracing::info!(
            files = manifest.files.len(),
            "Wrote journal backup {}",
            directory.display()
        );
        Ok(BackupReport {
            directory,
            files: manifest.files.len(),
            total_bytes: manifest.total_bytes(),
        })
    }
}

/// Read `MANIFEST.json` from a backup directory.
pub async fn read_manifest(directory: &Path) -> Result<BackupManifest, JournalError> {
    let path = directory.join(BACKUP_MANIFEST_FILE);
    let content = match tokio::fs::read_to_string(&path).await {
        Ok(content) => content,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
            return Err(JournalError::InvalidManifest {
                path,
                message: "manifest not found".to_string(),
            });
        }
        Err(err) => return Err(JournalError::io(&path, err)),
    };
    serde_json::from_str(&content).map_err(|e| JournalError::InvalidManifest {
        path,
        message: e.to_string(),
    })
}

/// Re-hash every file listed in a backup manifest.
///
/// All problems are collected before failing so one run reports every
/// damaged file.
pub async fn verify_backup(directory: &Path) -> Result<VerifyReport, JournalError> {
    let manifest = read_manifest(directory).await?;

    let mut problems = Vec::new();
    if !manifest.files.iter().any(|f| f.name == FORMAT_MARKER_FILE) {
        problems.push(format!("{FORMAT_MARKER_FILE}: not listed in manifest"));
    }
    for entry in &manifest.files {
        if !is_plain_file_name(&entry.name) {
            problems.push(format!("{}: not a plain file name", entry.name));
            continue;
        }
        let path = directory.join(&entry.name);
        let (sha256, size) = match sha256_file(&path).await {
            Ok(digest) => digest,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                problems.push(format!("{}: missing", entry.name));
                continue;
            }
            Err(err) => return Err(JournalError::io(&path, err)),
        };
        if size != entry.size {
            problems.push(format!(
                "{}: size mismatch (expected {}, found {size})",
                entry.name, entry.size
            ));
        } else if sha256 != entry.sha256 {
            problems.push(format!("{}: checksum mismatch", entry.name));
        }
    }

    if !problems.is_empty() {
        tracing::warn!(count = problems.len(), "Backup verification failed");
        return Err(JournalError::VerificationFailed {
            path: directory.to_path_buf(),
            problems,
        });
    }

    Ok(VerifyReport {
        directory: directory.to_path_buf(),
        files_checked: manifest.files.len(),
        cluster_id: manifest.marker.cluster_id,
    })
}

fn is_plain_file_name(name: &str) -> bool {
    let mut components = Path::new(name).components();
    matches!(
        (components.next(), components.next()),
        (Some(Component::Normal(_)), None)
    )
}

/// Newest backup directory under `root`, by name.
pub async fn latest_backup(root: &Path) -> Result<Option<PathBuf>, JournalError> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(err) => return Err(JournalError::io(root, err)),
    };

    let mut latest: Option<String> = None;
    while let Some(entry) = entries
        .next_entry()
        .await
        .map_err(|e| JournalError::io(root, e))?
    {
        let name = entry.file_name().to_string_lossy().into_owned();
        if !name.starts_with("journal-backup-") {
            continue;
        }
        if latest.as_deref().is_none_or(|current| name.as_str() > current) {
            latest = Some(name);
        }
    }
    Ok(latest.map(|name| root.join(name)))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::TimeZone;
    use tempfile::tempdir;

    async fn formatted_journal(root: &Path) -> LocalJournal {
        let journal = LocalJournal::new(root.join("journal"));
        journal.format().await.unwrap();
        tokio::fs::write(journal.folder().join("0001.log"), b"first segment")
            .await
            .unwrap();
        tokio::fs::write(journal.folder().join("0002.log"), b"second")
            .await
            .unwrap();
        journal
    }

    #[test]
    fn test_backup_dir_name() {
        let at = Utc.with_ymd_and_hms(2024, 3, 9, 14, 5, 7).unwrap();
        assert_eq!(backup_dir_name(at), "journal-backup-20240309-140507-000");
    }

    #[test]
    fn test_plain_file_names() {
        assert!(is_plain_file_name("0001.log"));
        assert!(is_plain_file_name("FORMAT"));
        assert!(!is_plain_file_name("../FORMAT"));
        assert!(!is_plain_file_name("/etc/passwd"));
        assert!(!is_plain_file_name("a/b.log"));
        assert!(!is_plain_file_name(""));
    }

    #[tokio::test]
    async fn test_backup_copies_and_verifies() {
        let dir = tempdir().unwrap();
        let journal = formatted_journal(dir.path()).await;
        let expected_bytes = journal.backup_size().await.unwrap();

        let mut seen = Vec::new();
        let report = journal
            .backup(&dir.path().join("backups"), |entry| {
                seen.push(entry.name.clone())
            })
            .await
            .unwrap();

        assert_eq!(seen, vec!["FORMAT", "0001.log", "0002.log"]);
        assert_eq!(report.files, 3);
        assert_eq!(report.total_bytes, expected_bytes);
        assert!(report.directory.join(BACKUP_MANIFEST_FILE).exists());

        let verified = verify_backup(&report.directory).await.unwrap();
        assert_eq!(verified.files_checked, 3);
        assert_eq!(
            verified.cluster_id,
            journal.read_marker().await.unwrap().cluster_id
        );

        let latest = latest_backup(&dir.path().join("backups")).await.unwrap();
        assert_eq!(latest, Some(report.directory));
    }

    #[tokio::test]
    async fn test_backup_requires_formatted_journal() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path());
        let err = journal
            .backup(&dir.path().join("backups"), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(err, JournalError::NotFormatted(_)));
    }

    #[tokio::test]
    async fn test_verify_reports_every_problem() {
        let dir = tempdir().unwrap();
        let journal = formatted_journal(dir.path()).await;
        let report = journal
            .backup(&dir.path().join("backups"), |_| {})
            .await
            .unwrap();

        tokio::fs::remove_file(report.directory.join("0001.log"))
            .await
            .unwrap();
        // same length, different bytes
        tokio::fs::write(report.directory.join("0002.log"), b"SECOND")
            .await
            .unwrap();

        let err = verify_backup(&report.directory).await.unwrap_err();
        match err {
            JournalError::VerificationFailed { problems, .. } => {
                assert_eq!(
                    problems,
                    vec!["0001.log: missing", "0002.log: checksum mismatch"]
                );
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_verify_size_mismatch() {
        let dir = tempdir().unwrap();
        let journal = formatted_journal(dir.path()).await;
        let report = journal
            .backup(&dir.path().join("backups"), |_| {})
            .await
            .unwrap();
        tokio::fs::write(report.directory.join("0002.log"), b"grown segment")
            .await
            .unwrap();

        let err = verify_backup(&report.directory).await.unwrap_err();
        assert!(err.to_string().contains("0002.log: size mismatch"));
    }

    #[tokio::test]
    async fn test_verify_without_manifest() {
        let dir = tempdir().unwrap();
        let err = verify_backup(dir.path()).await.unwrap_err();
        assert!(matches!(err, JournalError::InvalidManifest { .. }));

        tokio::fs::write(dir.path().join(BACKUP_MANIFEST_FILE), "{ not json")
            .await
            .unwrap();
        let err = verify_backup(dir.path()).await.unwrap_err();
        assert!(matches!(err, JournalError::InvalidManifest { .. }));
    }

    #[tokio::test]
    async fn test_verify_requires_format_marker_in_manifest() {
        let dir = tempdir().unwrap();
        let journal = formatted_journal(dir.path()).await;
        let report = journal
            .backup(&dir.path().join("backups"), |_| {})
            .await
            .unwrap();

        let mut manifest = read_manifest(&report.directory).await.unwrap();
        manifest.files.clear();
        tokio::fs::write(
            report.directory.join(BACKUP_MANIFEST_FILE),
            serde_json::to_string(&manifest).unwrap(),
        )
        .await
        .unwrap();

        let err = verify_backup(&report.directory).await.unwrap_err();
        match err {
            JournalError::VerificationFailed { problems, .. } => {
                assert_eq!(problems, vec!["FORMAT: not listed in manifest"]);
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_backup_never_replaces_existing_directory() {
        let dir = tempdir().unwrap();
        let journal = formatted_journal(dir.path()).await;
        let taken = dir.path().join("backups").join("journal-backup-taken");
        tokio::fs::create_dir_all(&taken).await.unwrap();
        tokio::fs::write(taken.join("keep.txt"), b"keep").await.unwrap();

        let err = journal
            .backup_into(taken.clone(), Utc::now(), |_| {})
            .await
            .unwrap_err();
        assert!(matches!(&err, JournalError::BackupExists(path) if *path == taken));
        assert!(taken.join("keep.txt").exists());
        assert!(!taken.join(BACKUP_MANIFEST_FILE).exists());
    }

    #[tokio::test]
    async fn test_latest_backup_missing_root() {
        let dir = tempdir().unwrap();
        let latest = latest_backup(&dir.path().join("nope")).await.unwrap();
        assert!(latest.is_none());
    }
}
