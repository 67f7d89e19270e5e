//! Local filesystem snapshot storage.

use std::path::{Path, PathBuf};

use tokio::io::AsyncWriteExt;

use crate::error::{AppError, Result};
use crate::models::Leaderboard;

/// Keeps the last adopted snapshot in a single JSON file.
#[derive(Debug, Clone)]
pub struct SnapshotStore {
    path: PathBuf,
}

impl SnapshotStore {
    /// Create a store backed by the file at `path`.
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Ensure parent directory exists.
    async fn ensure_dir(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() {
                tokio::fs::create_dir_all(parent).await?;
            }
        }
        Ok(())
    }

    /// Write bytes atomically (write to temp, then rename).
    async fn write_bytes(&self, bytes: &[u8]) -> Result<()> {
        self.ensure_dir().await?;

        let tmp = self.path.with_extension("tmp");
        let mut file = tokio::fs::File::create(&tmp).await?;
        file.write_all(bytes).await?;
        file.flush().await?;
        drop(file);

        tokio::fs::rename(&tmp, &self.path).await?;
        Ok(())
    }

    /// Read bytes, returning None if the file doesn't exist.
    async fn read_bytes(&self) -> Result<Option<Vec<u8>>> {
        match tokio::fs::read(&self.path).await {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(AppError::Io(e)),
        }
    }

    /// Load the stored snapshot, if any.
    pub async fn load(&self) -> Result<Option<Leaderboard>> {
        match self.read_bytes().await? {
            Some(bytes) => Ok(Some(Leaderboard::from_slice(&bytes)?)),
            None => Ok(None),
        }
    }

    /// Replace the stored snapshot.
    pub async fn save(&self, board: &Leaderboard) -> Result<()> {
        let bytes = serde_json::to_vec_pretty(board)?;
        self.write_bytes(&bytes).await?;
        log::debug!(
            "Snapshot with {} members saved to {}",
            board.len(),
            self.path.display()
        );
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use tempfile::TempDir;

    use super::*;
    use crate::models::{Member, Task};

    fn sample_board() -> Leaderboard {
        let ts = |s| DateTime::from_timestamp(s, 0).unwrap();
        Leaderboard::from_members([
            Member::new("1", 12, ts(200))
                .with_name("Александр")
                .with_star(1, Task::Silver, ts(100))
                .with_star(1, Task::Gold, ts(200)),
            Member::new("2", 3, ts(50)),
        ])
    }

    #[tokio::test]
    async fn test_load_missing_is_none() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("state.json"));
        assert!(store.load().await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_save_and_load() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("nested/dir/state.json"));

        let board = sample_board();
        store.save(&board).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(board));
        assert!(!tmp.path().join("nested/dir/state.tmp").exists());
    }

    #[tokio::test]
    async fn test_save_overwrites_previous() {
        let tmp = TempDir::new().unwrap();
        let store = SnapshotStore::new(tmp.path().join("state.json"));

        store.save(&sample_board()).await.unwrap();
        store.save(&Leaderboard::default()).await.unwrap();

        assert_eq!(store.load().await.unwrap(), Some(Leaderboard::default()));
    }

    #[tokio::test]
    async fn test_corrupt_file_is_validation_error() {
        let tmp = TempDir::new().unwrap();
        let path = tmp.path().join("state.json");
        std::fs::write(&path, b"{ not json").unwrap();

        let err = SnapshotStore::new(&path).load().await.unwrap_err();
        assert!(err.is_validation_failure());
    }
}
