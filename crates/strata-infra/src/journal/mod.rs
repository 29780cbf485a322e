//! Local journal folder adapter.
//!
//! A journal folder holds a `FORMAT` marker (TOML) and segment files named
//! `*.log`. Formatting wipes the folder and writes a fresh marker; every other
//! operation requires a compatible marker to be present.

pub mod backup;

use std::path::{Path, PathBuf};

use strata_types::error::JournalError;
use strata_types::journal::{
    FORMAT_MARKER_FILE, JOURNAL_FORMAT_VERSION, JournalMarker, JournalSummary, SEGMENT_EXTENSION,
};

/// A segment file inside the journal folder.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Segment {
    pub name: String,
    pub size: u64,
}

/// Handle on one journal folder. Holds no open files.
#[derive(Debug, Clone)]
pub struct LocalJournal {
    folder: PathBuf,
}

impl LocalJournal {
    pub fn new(folder: impl Into<PathBuf>) -> Self {
        Self {
            folder: folder.into(),
        }
    }

    pub fn folder(&self) -> &Path {
        &self.folder
    }

    pub fn marker_path(&self) -> PathBuf {
        self.folder.join(FORMAT_MARKER_FILE)
    }

    /// Whether the folder exists and contains anything at all.
    pub async fn has_entries(&self) -> Result<bool, JournalError> {
        let mut entries = match tokio::fs::read_dir(&self.folder).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(false),
            Err(err) => return Err(JournalError::io(&self.folder, err)),
        };
        let first = entries
            .next_entry()
            .await
            .map_err(|e| JournalError::io(&self.folder, e))?;
        Ok(first.is_some())
    }

    /// Wipe the folder and write a fresh marker.
    ///
    /// Callers decide whether wiping existing entries is acceptable; this
    /// method does not ask.
    pub async fn format(&self) -> Result<JournalMarker, JournalError> {
        match tokio::fs::remove_dir_all(&self.folder).await {
            Ok(()) => {
                tracing::info!("Removed existing journal folder {}", self.folder.display());
            }
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {}
            Err(err) => return Err(JournalError::io(&self.folder, err)),
        }
        tokio::fs::create_dir_all(&self.folder)
            .await
            .map_err(|e| JournalError::io(&self.folder, e))?;

        let marker = JournalMarker::fresh();
        let content = toml::to_string(&marker).map_err(|e| JournalError::InvalidMarker {
            path: self.marker_path(),
            message: e.to_string(),
        })?;
        tokio::fs::write(self.marker_path(), content)
            .await
            .map_err(|e| JournalError::io(self.marker_path(), e))?;

        tracing::info!(
            cluster_id = %marker.cluster_id,
            "Formatted journal folder {}",
            self.folder.display()
        );
        Ok(marker)
    }

    /// Read and validate the `FORMAT` marker.
    pub async fn read_marker(&self) -> Result<JournalMarker, JournalError> {
        let path = self.marker_path();
        let content = match tokio::fs::read_to_string(&path).await {
            Ok(content) => content,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => {
                return Err(JournalError::NotFormatted(self.folder.clone()));
            }
            Err(err) => return Err(JournalError::io(&path, err)),
        };

        let marker: JournalMarker =
            toml::from_str(&content).map_err(|e| JournalError::InvalidMarker {
                path: path.clone(),
                message: e.message().to_string(),
            })?;

        if !marker.is_compatible() {
            return Err(JournalError::UnsupportedVersion {
                found: marker.version.to_string(),
                expected: JOURNAL_FORMAT_VERSION.to_string(),
            });
        }
        Ok(marker)
    }

    /// Segment files sorted by name.
    pub async fn segments(&self) -> Result<Vec<Segment>, JournalError> {
        let mut entries = tokio::fs::read_dir(&self.folder)
            .await
            .map_err(|e| JournalError::io(&self.folder, e))?;

        let mut segments = Vec::new();
        while let Some(entry) = entries
            .next_entry()
            .await
            .map_err(|e| JournalError::io(&self.folder, e))?
        {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some(SEGMENT_EXTENSION) {
                continue;
            }
            let metadata = entry
                .metadata()
                .await
                .map_err(|e| JournalError::io(&path, e))?;
            if !metadata.is_file() {
                continue;
            }
            segments.push(Segment {
                name: entry.file_name().to_string_lossy().into_owned(),
                size: metadata.len(),
            });
        }

        segments.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(segments)
    }

    /// Marker plus segment statistics.
    pub async fn summary(&self) -> Result<JournalSummary, JournalError> {
        let marker = self.read_marker().await?;
        let segments = self.segments().await?;
        Ok(JournalSummary {
            folder: self.folder.clone(),
            marker,
            segments: segments.len(),
            total_bytes: segments.iter().map(|s| s.size).sum(),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[tokio::test]
    async fn test_has_entries() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path().join("journal"));
        assert!(!journal.has_entries().await.unwrap());

        tokio::fs::create_dir_all(journal.folder()).await.unwrap();
        assert!(!journal.has_entries().await.unwrap());

        tokio::fs::write(journal.folder().join("0001.log"), b"x")
            .await
            .unwrap();
        assert!(journal.has_entries().await.unwrap());
    }

    #[tokio::test]
    async fn test_format_creates_marker() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path().join("nested").join("journal"));

        let marker = journal.format().await.unwrap();
        assert_eq!(marker.version, JOURNAL_FORMAT_VERSION);
        assert_eq!(journal.read_marker().await.unwrap(), marker);
    }

    #[tokio::test]
    async fn test_format_wipes_existing_entries() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path());
        let first = journal.format().await.unwrap();
        tokio::fs::write(dir.path().join("0001.log"), b"entries")
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("stray.tmp"), b"junk")
            .await
            .unwrap();

        let second = journal.format().await.unwrap();
        assert_ne!(first.cluster_id, second.cluster_id);
        assert!(journal.segments().await.unwrap().is_empty());
        assert!(!dir.path().join("stray.tmp").exists());
    }

    #[tokio::test]
    async fn test_read_marker_not_formatted() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path());
        let err = journal.read_marker().await.unwrap_err();
        assert!(matches!(err, JournalError::NotFormatted(p) if p == dir.path()));
    }

    #[tokio::test]
    async fn test_read_marker_invalid() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path());
        tokio::fs::write(journal.marker_path(), "version = 12")
            .await
            .unwrap();
        let err = journal.read_marker().await.unwrap_err();
        assert!(matches!(err, JournalError::InvalidMarker { .. }));
    }

    #[tokio::test]
    async fn test_read_marker_incompatible_version() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path());
        let mut marker = JournalMarker::fresh();
        marker.version = semver::Version::new(9, 0, 0);
        tokio::fs::write(journal.marker_path(), toml::to_string(&marker).unwrap())
            .await
            .unwrap();

        let err = journal.read_marker().await.unwrap_err();
        assert!(matches!(
            err,
            JournalError::UnsupportedVersion { found, .. } if found == "9.0.0"
        ));
    }

    #[tokio::test]
    async fn test_summary_counts_only_segments() {
        let dir = tempdir().unwrap();
        let journal = LocalJournal::new(dir.path());
        journal.format().await.unwrap();
        tokio::fs::write(dir.path().join("0002.log"), vec![0u8; 30])
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("0001.log"), vec![0u8; 12])
            .await
            .unwrap();
        tokio::fs::write(dir.path().join("notes.txt"), b"ignored")
            .await
            .unwrap();
        tokio::fs::create_dir(dir.path().join("dir.log")).await.unwrap();

        let segments = journal.segments().await.unwrap();
        let names: Vec<_> = segments.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["0001.log", "0002.log"]);

        let summary = journal.summary().await.unwrap();
        assert_eq!(summary.segments, 2);
        assert_eq!(summary.total_bytes, 42);
    }
}
