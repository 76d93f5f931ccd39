//! File-backed session store
//!
//! Each session lives in its own JSON file, `sess_<id>.json`, inside the
//! configured directory. Records are written to a uniquely named temp file
//! and renamed into place, so a reader in any process sees either the old
//! record or the new one, never a partial write.

use crate::error::Result;
use crate::session::SessionId;
use crate::traits::session::{SessionRecord, SessionStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::{Arc, Mutex};
use tokio::sync::OwnedMutexGuard;

type LockMap = Mutex<HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>>;

/// File-backed session store
///
/// Durable across restarts and shareable between processes on one host.
/// Read-modify-write cycles on the same identifier are serialized inside
/// this process; across processes the last writer wins.
#[derive(Clone)]
pub struct FileSessionStore {
    dir: PathBuf,
    locks: Arc<LockMap>,
}

/// Per-identifier lock
///
/// Map entries held by nobody but the map are swept whenever a lock is
/// taken or released, including entries left behind by a cancelled wait.
struct IdLock<'a> {
    locks: &'a LockMap,
    guard: Option<OwnedMutexGuard<()>>,
}

impl Drop for IdLock<'_> {
    fn drop(&mut self) {
        self.guard.take();
        let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
        sweep_idle(&mut locks);
    }
}

fn sweep_idle(locks: &mut HashMap<SessionId, Arc<tokio::sync::Mutex<()>>>) {
    locks.retain(|_, lock| Arc::strong_count(lock) > 1);
}

impl FileSessionStore {
    /// Open a store rooted at `dir`, creating the directory if needed
    pub async fn new(dir: impl Into<PathBuf>) -> Result<Self> {
        let dir = dir.into();
        tokio::fs::create_dir_all(&dir).await?;
        tracing::debug!(dir = %dir.display(), "File session store ready");

        Ok(Self {
            dir,
            locks: Arc::new(Mutex::new(HashMap::new())),
        })
    }

    /// Directory holding the session files
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Path of the file holding `id`
    ///
    /// Identifiers are restricted to `[a-z0-9]`, so they are always safe
    /// to use as a file name component.
    pub fn path_for(&self, id: &SessionId) -> PathBuf {
        self.dir.join(format!("sess_{}.json", id))
    }

    async fn lock(&self, id: &SessionId) -> IdLock<'_> {
        let lock = {
            let mut locks = self.locks.lock().unwrap_or_else(|e| e.into_inner());
            sweep_idle(&mut locks);
            locks.entry(id.clone()).or_default().clone()
        };

        let mut held = IdLock {
            locks: &*self.locks,
            guard: None,
        };
        held.guard = Some(lock.lock_owned().await);
        held
    }

    async fn read_record(&self, id: &SessionId) -> Result<SessionRecord> {
        let path = self.path_for(id);
        match tokio::fs::read(&path).await {
            Ok(bytes) => {
                let record = serde_json::from_slice(&bytes).inspect_err(|e| {
                    tracing::error!(path = %path.display(), error = %e, "Corrupt session file");
                })?;
                Ok(record)
            }
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(SessionRecord::default()),
            Err(e) => {
                tracing::error!(path = %path.display(), error = %e, "Failed to read session file");
                Err(e.into())
            }
        }
    }

    async fn write_record(&self, id: &SessionId, record: &SessionRecord) -> Result<()> {
        if record.is_empty() {
            return self.remove_file(id).await;
        }

        let path = self.path_for(id);
        let temp_path = self
            .dir
            .join(format!(".sess_{}.{}.tmp", id, uuid::Uuid::new_v4().simple()));
        let bytes = serde_json::to_vec(record)?;

        if let Err(e) = tokio::fs::write(&temp_path, &bytes).await {
            tracing::error!(path = %temp_path.display(), error = %e, "Failed to write session file");
            return Err(e.into());
        }

        // Atomic rename
        if let Err(e) = tokio::fs::rename(&temp_path, &path).await {
            tracing::error!(path = %path.display(), error = %e, "Failed to move session file into place");
            let _ = tokio::fs::remove_file(&temp_path).await;
            return Err(e.into());
        }

        Ok(())
    }

    async fn remove_file(&self, id: &SessionId) -> Result<()> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }
}

#[async_trait]
impl SessionStore for FileSessionStore {
    async fn get_all(&self, id: &SessionId) -> Result<SessionRecord> {
        self.read_record(id).await
    }

    async fn set(&self, id: &SessionId, key: &str, value: &str) -> Result<()> {
        let _lock = self.lock(id).await;
        let mut record = self.read_record(id).await?;
        record.set(key, value);
        self.write_record(id, &record).await
    }

    async fn set_many(&self, id: &SessionId, pairs: Vec<(String, String)>) -> Result<()> {
        let _lock = self.lock(id).await;
        let mut record = self.read_record(id).await?;
        for (key, value) in pairs {
            record.set(key, value);
        }
        self.write_record(id, &record).await
    }

    async fn delete(&self, id: &SessionId, key: &str) -> Result<()> {
        let _lock = self.lock(id).await;
        let mut record = self.read_record(id).await?;
        if record.remove(key).is_some() {
            self.write_record(id, &record).await?;
        }
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        let _lock = self.lock(id).await;
        self.remove_file(id).await
    }

    async fn rename(&self, from: &SessionId, to: &SessionId) -> Result<()> {
        if from == to {
            return Ok(());
        }

        // Lock in a fixed order so two opposite renames cannot deadlock
        let (first, second) = if from < to { (from, to) } else { (to, from) };
        let _first = self.lock(first).await;
        let _second = self.lock(second).await;

        match tokio::fs::rename(self.path_for(from), self.path_for(to)).await {
            Ok(()) => Ok(()),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "sessions:file"
    }

    fn is_healthy(&self) -> bool {
        self.dir.is_dir()
    }
}
