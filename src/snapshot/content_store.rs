//! Per-screen content snapshot store
//!
//! Durable key-value persistence of the last-known content per screen.
//! Used only as a cold-start cache on the display side; the publisher's
//! registry stays authoritative.

use std::collections::HashMap;
use std::path::PathBuf;
use std::time::SystemTime;

use serde::{Deserialize, Serialize};
use tokio::sync::RwLock;

use crate::error::Result;
use crate::model::{Content, ScreenId};

/// One persisted snapshot per screen, overwritten on every publish
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotRecord {
    /// Screen the snapshot belongs to
    pub screen_id: ScreenId,

    /// Last published content
    pub content: Content,

    /// When the record was written
    pub written_at: SystemTime,
}

/// Store of last-known content per screen
///
/// Writes are serialized behind a single write lock; the store is
/// last-write-wins with no versioning, since it is a fallback cache and
/// not the source of truth.
pub struct ContentSnapshotStore {
    records: RwLock<HashMap<ScreenId, SnapshotRecord>>,
    dir: Option<PathBuf>,
}

impl ContentSnapshotStore {
    /// Create a store with no backing files
    ///
    /// Contents are lost on drop; useful for tests and single-process use.
    pub fn in_memory() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
            dir: None,
        }
    }

    /// Open a file-backed store, loading any existing records
    ///
    /// Each screen is stored as `screen-{id}.json` under `dir`. Records
    /// that fail to parse are skipped with a warning (the live recovery
    /// handshake repairs the display regardless).
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let mut records = HashMap::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_snapshot = path
                .file_name()
                .and_then(|n| n.to_str())
                .map(|n| n.starts_with("screen-") && n.ends_with(".json"))
                .unwrap_or(false);
            if !is_snapshot {
                continue;
            }

            let data = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<SnapshotRecord>(&data) {
                Ok(record) => {
                    records.insert(record.screen_id.clone(), record);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable snapshot record"
                    );
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            records = records.len(),
            "Snapshot store opened"
        );

        Ok(Self {
            records: RwLock::new(records),
            dir: Some(dir),
        })
    }

    /// Overwrite the record for a screen
    ///
    /// Returns once the record is durable (file written, for a file-backed
    /// store). The write lock is held across the file write so writes to
    /// the same key cannot interleave.
    pub async fn put(&self, screen_id: &ScreenId, content: Content) -> Result<()> {
        let record = SnapshotRecord {
            screen_id: screen_id.clone(),
            content,
            written_at: SystemTime::now(),
        };

        let mut records = self.records.write().await;

        if let Some(ref dir) = self.dir {
            let path = dir.join(Self::file_name(screen_id));
            let tmp = dir.join(format!(".{}.tmp", Self::file_name(screen_id)));
            let data = serde_json::to_vec_pretty(&record)?;

            tokio::fs::write(&tmp, data).await?;
            tokio::fs::rename(&tmp, &path).await?;
        }

        records.insert(screen_id.clone(), record);

        tracing::debug!(screen = %screen_id, "Snapshot written");
        Ok(())
    }

    /// Get the last written content for a screen, if any
    pub async fn get(&self, screen_id: &ScreenId) -> Option<Content> {
        self.records
            .read()
            .await
            .get(screen_id)
            .map(|r| r.content.clone())
    }

    /// Get the full record for a screen, if any
    pub async fn get_record(&self, screen_id: &ScreenId) -> Option<SnapshotRecord> {
        self.records.read().await.get(screen_id).cloned()
    }

    /// Bulk load for cold start
    pub async fn get_all(&self) -> HashMap<ScreenId, Content> {
        self.records
            .read()
            .await
            .iter()
            .map(|(id, record)| (id.clone(), record.content.clone()))
            .collect()
    }

    /// Remove the record for a screen
    ///
    /// Called when a screen is removed or a re-index invalidates its id.
    pub async fn remove(&self, screen_id: &ScreenId) -> Result<()> {
        let mut records = self.records.write().await;

        if records.remove(screen_id).is_some() {
            if let Some(ref dir) = self.dir {
                let path = dir.join(Self::file_name(screen_id));
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        Ok(())
    }

    /// Drop all records
    ///
    /// Part of the session lifecycle: the store is cleared when a new
    /// session starts.
    pub async fn clear(&self) -> Result<()> {
        let mut records = self.records.write().await;

        if let Some(ref dir) = self.dir {
            for screen_id in records.keys() {
                let path = dir.join(Self::file_name(screen_id));
                match tokio::fs::remove_file(&path).await {
                    Ok(()) => {}
                    Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                    Err(e) => return Err(e.into()),
                }
            }
        }

        records.clear();
        Ok(())
    }

    /// Number of stored records
    pub async fn len(&self) -> usize {
        self.records.read().await.len()
    }

    /// Whether the store has no records
    pub async fn is_empty(&self) -> bool {
        self.records.read().await.is_empty()
    }

    fn file_name(screen_id: &ScreenId) -> String {
        format!("screen-{}.json", screen_id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::ContentPatch;

    fn content(url: &str) -> Content {
        ContentPatch::url(url).apply_to(None)
    }

    #[tokio::test]
    async fn test_put_get_overwrite() {
        let store = ContentSnapshotStore::in_memory();
        let id = ScreenId::new("1");

        assert!(store.get(&id).await.is_none());

        store.put(&id, content("a.png")).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().url, "a.png");

        // Last write wins
        store.put(&id, content("b.png")).await.unwrap();
        assert_eq!(store.get(&id).await.unwrap().url, "b.png");
        assert_eq!(store.len().await, 1);
    }

    #[tokio::test]
    async fn test_get_all() {
        let store = ContentSnapshotStore::in_memory();

        store.put(&ScreenId::new("1"), content("a.png")).await.unwrap();
        store.put(&ScreenId::new("2"), content("b.png")).await.unwrap();

        let all = store.get_all().await;
        assert_eq!(all.len(), 2);
        assert_eq!(all[&ScreenId::new("2")].url, "b.png");
    }

    #[tokio::test]
    async fn test_remove_and_clear() {
        let store = ContentSnapshotStore::in_memory();
        let id = ScreenId::new("1");

        store.put(&id, content("a.png")).await.unwrap();
        store.remove(&id).await.unwrap();
        assert!(store.get(&id).await.is_none());

        // Remove of a missing key is fine
        store.remove(&id).await.unwrap();

        store.put(&id, content("a.png")).await.unwrap();
        store.put(&ScreenId::new("2"), content("b.png")).await.unwrap();
        store.clear().await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_survives_reopen() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = ContentSnapshotStore::open(dir.path()).await.unwrap();
            store.put(&ScreenId::new("1"), content("a.png")).await.unwrap();
            store.put(&ScreenId::new("2"), content("b.png")).await.unwrap();
        }

        let reopened = ContentSnapshotStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.len().await, 2);
        assert_eq!(reopened.get(&ScreenId::new("1")).await.unwrap().url, "a.png");

        let record = reopened.get_record(&ScreenId::new("2")).await.unwrap();
        assert_eq!(record.screen_id, ScreenId::new("2"));
    }

    #[tokio::test]
    async fn test_reopen_skips_corrupt_record() {
        let dir = tempfile::tempdir().unwrap();

        {
            let store = ContentSnapshotStore::open(dir.path()).await.unwrap();
            store.put(&ScreenId::new("1"), content("a.png")).await.unwrap();
        }

        tokio::fs::write(dir.path().join("screen-2.json"), b"not json")
            .await
            .unwrap();

        let reopened = ContentSnapshotStore::open(dir.path()).await.unwrap();
        assert_eq!(reopened.len().await, 1);
        assert!(reopened.get(&ScreenId::new("2")).await.is_none());
    }

    #[tokio::test]
    async fn test_file_removed_on_remove() {
        let dir = tempfile::tempdir().unwrap();
        let store = ContentSnapshotStore::open(dir.path()).await.unwrap();
        let id = ScreenId::new("1");

        store.put(&id, content("a.png")).await.unwrap();
        assert!(dir.path().join("screen-1.json").exists());

        store.remove(&id).await.unwrap();
        assert!(!dir.path().join("screen-1.json").exists());
    }
}
