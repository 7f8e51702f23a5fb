//! Named session persistence
//!
//! Saves and loads whole sessions (screen list plus slideshow settings) by
//! name, distinct from the lighter per-screen content cache.

use std::collections::HashMap;
use std::path::PathBuf;

use tokio::sync::RwLock;

use crate::error::{Error, Result};
use crate::model::Session;

/// Store of named sessions
///
/// Session names double as file names for the file-backed flavor, stored
/// as `{name}.json` under the store directory.
pub struct SessionStore {
    sessions: RwLock<HashMap<String, Session>>,
    dir: Option<PathBuf>,
}

impl SessionStore {
    /// Create a store with no backing files
    pub fn in_memory() -> Self {
        Self {
            sessions: RwLock::new(HashMap::new()),
            dir: None,
        }
    }

    /// Open a file-backed store, loading any existing sessions
    pub async fn open(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;

        let mut sessions = HashMap::new();
        let mut entries = tokio::fs::read_dir(&dir).await?;

        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            if path.extension().and_then(|e| e.to_str()) != Some("json") {
                continue;
            }
            let Some(name) = path.file_stem().and_then(|s| s.to_str()) else {
                continue;
            };

            let data = tokio::fs::read(&path).await?;
            match serde_json::from_slice::<Session>(&data) {
                Ok(session) => {
                    sessions.insert(name.to_string(), session);
                }
                Err(e) => {
                    tracing::warn!(
                        path = %path.display(),
                        error = %e,
                        "Skipping unreadable session"
                    );
                }
            }
        }

        tracing::info!(
            dir = %dir.display(),
            sessions = sessions.len(),
            "Session store opened"
        );

        Ok(Self {
            sessions: RwLock::new(sessions),
            dir: Some(dir),
        })
    }

    /// Save a session under a name, overwriting any previous one
    pub async fn save(&self, name: &str, session: &Session) -> Result<()> {
        let mut sessions = self.sessions.write().await;

        if let Some(ref dir) = self.dir {
            let data = serde_json::to_vec_pretty(session)?;
            tokio::fs::write(dir.join(format!("{name}.json")), data).await?;
        }

        sessions.insert(name.to_string(), session.clone());

        tracing::info!(session = name, "Session saved");
        Ok(())
    }

    /// Load a session by name
    pub async fn load(&self, name: &str) -> Result<Session> {
        self.sessions
            .read()
            .await
            .get(name)
            .cloned()
            .ok_or_else(|| Error::SessionNotFound(name.to_string()))
    }

    /// Names of all stored sessions, sorted
    pub async fn list(&self) -> Vec<String> {
        let mut names: Vec<String> = self.sessions.read().await.keys().cloned().collect();
        names.sort();
        names
    }

    /// Delete a session by name
    pub async fn delete(&self, name: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;

        if sessions.remove(name).is_none() {
            return Err(Error::SessionNotFound(name.to_string()));
        }

        if let Some(ref dir) = self.dir {
            let path = dir.join(format!("{name}.json"));
            match tokio::fs::remove_file(&path).await {
                Ok(()) => {}
                Err(e) if e.kind() == std::io::ErrorKind::NotFound => {}
                Err(e) => return Err(e.into()),
            }
        }

        Ok(())
    }
}
