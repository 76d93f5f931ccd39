use crate::error::Result;
use crate::session::SessionId;
use crate::traits::session::{SessionRecord, SessionStore};
use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

/// In-memory session store implementation
///
/// Stores sessions in a HashMap. Suitable for development and testing,
/// but not for production (sessions are lost on restart and not shared
/// across processes).
#[derive(Clone, Default)]
pub struct InMemorySessionStore {
    sessions: Arc<RwLock<HashMap<SessionId, SessionRecord>>>,
}

impl InMemorySessionStore {
    /// Create a new in-memory session store
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of sessions currently holding data
    pub async fn len(&self) -> usize {
        self.sessions.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.sessions.read().await.is_empty()
    }
}

#[async_trait]
impl SessionStore for InMemorySessionStore {
    async fn get_all(&self, id: &SessionId) -> Result<SessionRecord> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).cloned().unwrap_or_default())
    }

    async fn get(&self, id: &SessionId, key: &str) -> Result<Option<String>> {
        let sessions = self.sessions.read().await;
        Ok(sessions.get(id).and_then(|record| record.get(key).cloned()))
    }

    async fn set(&self, id: &SessionId, key: &str, value: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.entry(id.clone()).or_default().set(key, value);
        Ok(())
    }

    async fn set_many(&self, id: &SessionId, pairs: Vec<(String, String)>) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        let record = sessions.entry(id.clone()).or_default();
        for (key, value) in pairs {
            record.set(key, value);
        }
        Ok(())
    }

    async fn delete(&self, id: &SessionId, key: &str) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(record) = sessions.get_mut(id) {
            record.remove(key);
            if record.is_empty() {
                sessions.remove(id);
            }
        }
        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        sessions.remove(id);
        Ok(())
    }

    async fn rename(&self, from: &SessionId, to: &SessionId) -> Result<()> {
        let mut sessions = self.sessions.write().await;
        if let Some(record) = sessions.remove(from) {
            sessions.insert(to.clone(), record);
        }
        Ok(())
    }

    fn name(&self) -> &str {
        "sessions:memory"
    }

    fn is_healthy(&self) -> bool {
        true // In-memory store is always healthy
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(s: &str) -> SessionId {
        SessionId::parse(s).unwrap()
    }

    #[tokio::test]
    async fn test_get_all_unknown_is_empty() {
        let store = InMemorySessionStore::new();
        let record = store.get_all(&id("neverseen")).await.unwrap();
        assert!(record.is_empty());
    }

    #[tokio::test]
    async fn test_set_then_get_all() {
        let store = InMemorySessionStore::new();
        let session = id("abc123");

        store.set(&session, "ok", "yep").await.unwrap();

        let record = store.get_all(&session).await.unwrap();
        let expected: SessionRecord = [("ok", "yep")].into_iter().collect();
        assert_eq!(record, expected);
        assert_eq!(store.get(&session, "ok").await.unwrap(), Some("yep".to_string()));
    }

    #[tokio::test]
    async fn test_destroy() {
        let store = InMemorySessionStore::new();
        let session = id("abc123");

        store.set(&session, "ok", "yep").await.unwrap();
        store.destroy(&session).await.unwrap();

        assert!(store.get_all(&session).await.unwrap().is_empty());
        assert!(store.is_empty().await);

        // Idempotent
        store.destroy(&session).await.unwrap();
    }

    #[tokio::test]
    async fn test_destroy_is_isolated() {
        let store = InMemorySessionStore::new();
        let one = id("one");
        let two = id("two");

        store.set(&one, "ok", "web1").await.unwrap();
        store.set(&two, "ok", "web2").await.unwrap();
        store.destroy(&one).await.unwrap();

        assert!(store.get_all(&one).await.unwrap().is_empty());
        assert_eq!(store.get(&two, "ok").await.unwrap(), Some("web2".to_string()));
    }

    #[tokio::test]
    async fn test_delete_last_key_drops_session() {
        let store = InMemorySessionStore::new();
        let session = id("abc123");

        store
            .set_many(&session, vec![("a".into(), "1".into()), ("b".into(), "2".into())])
            .await
            .unwrap();
        store.delete(&session, "a").await.unwrap();
        assert_eq!(store.len().await, 1);

        store.delete(&session, "b").await.unwrap();
        store.delete(&session, "missing").await.unwrap();
        assert!(store.is_empty().await);
    }

    #[tokio::test]
    async fn test_rename_moves_record() {
        let store = InMemorySessionStore::new();
        let old = id("old");
        let new = id("new");

        store.set(&old, "user", "42").await.unwrap();
        store.rename(&old, &new).await.unwrap();

        assert!(store.get_all(&old).await.unwrap().is_empty());
        assert_eq!(store.get(&new, "user").await.unwrap(), Some("42".to_string()));

        // Renaming an unknown session does nothing
        store.rename(&id("ghost"), &id("other")).await.unwrap();
        assert!(store.get_all(&id("other")).await.unwrap().is_empty());
    }
}
