//! Session storage trait
//!
//! This trait abstracts the persistence layer behind sessions, so the
//! in-memory, file and Redis backends (or a custom one) can be swapped
//! without touching request handling.

use crate::error::Result;
use crate::session::SessionId;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

/// Key/value pairs owned by one session identifier
///
/// Serializes as a plain JSON object, e.g. `{"ok":"yep"}`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SessionRecord {
    data: BTreeMap<String, String>,
}

impl SessionRecord {
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a value from the record
    pub fn get(&self, key: &str) -> Option<&String> {
        self.data.get(key)
    }

    /// Set a value, returning the previous one
    pub fn set(&mut self, key: impl Into<String>, value: impl Into<String>) -> Option<String> {
        self.data.insert(key.into(), value.into())
    }

    /// Remove a value from the record
    pub fn remove(&mut self, key: &str) -> Option<String> {
        self.data.remove(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.data.contains_key(key)
    }

    pub fn is_empty(&self) -> bool {
        self.data.is_empty()
    }

    pub fn len(&self) -> usize {
        self.data.len()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &String)> {
        self.data.iter()
    }

    pub fn into_inner(self) -> BTreeMap<String, String> {
        self.data
    }
}

impl<K, V> FromIterator<(K, V)> for SessionRecord
where
    K: Into<String>,
    V: Into<String>,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self {
            data: iter
                .into_iter()
                .map(|(k, v)| (k.into(), v.into()))
                .collect(),
        }
    }
}

impl From<BTreeMap<String, String>> for SessionRecord {
    fn from(data: BTreeMap<String, String>) -> Self {
        Self { data }
    }
}

/// Session storage trait
///
/// Unknown identifiers are empty sessions: `get_all`, `delete` and
/// `destroy` succeed on them, `set` provisions storage. Errors are
/// reserved for faults in the backing store.
#[async_trait]
pub trait SessionStore: Send + Sync {
    /// Load every key/value pair stored under `id`
    ///
    /// Returns an empty record if the session doesn't exist or was destroyed.
    async fn get_all(&self, id: &SessionId) -> Result<SessionRecord>;

    /// Load a single value
    async fn get(&self, id: &SessionId, key: &str) -> Result<Option<String>> {
        Ok(self.get_all(id).await?.remove(key))
    }

    /// Insert or overwrite one pair, creating the session if needed
    async fn set(&self, id: &SessionId, key: &str, value: &str) -> Result<()>;

    /// Insert or overwrite several pairs
    ///
    /// The default applies them one at a time; backends override this
    /// when they can write the batch in one step.
    async fn set_many(&self, id: &SessionId, pairs: Vec<(String, String)>) -> Result<()> {
        for (key, value) in &pairs {
            self.set(id, key, value).await?;
        }
        Ok(())
    }

    /// Remove one key. Removing an absent key is not an error.
    async fn delete(&self, id: &SessionId, key: &str) -> Result<()>;

    /// Remove the whole session. Idempotent.
    async fn destroy(&self, id: &SessionId) -> Result<()>;

    /// Move the record stored under `from` to `to`, replacing anything at `to`
    ///
    /// Moving an unknown session is a no-op.
    async fn rename(&self, from: &SessionId, to: &SessionId) -> Result<()>;

    /// Short backend name used in health reports
    fn name(&self) -> &str {
        "sessions"
    }

    /// Check if the session store is healthy
    fn is_healthy(&self) -> bool;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_record_serializes_as_object() {
        let mut record = SessionRecord::new();
        assert_eq!(serde_json::to_string(&record).unwrap(), "{}");

        record.set("ok", "yep");
        assert_eq!(serde_json::to_string(&record).unwrap(), r#"{"ok":"yep"}"#);
    }

    #[test]
    fn test_record_from_iter_and_equality() {
        let a: SessionRecord = [("b", "2"), ("a", "1")].into_iter().collect();
        let b: SessionRecord = [("a", "1"), ("b", "2")].into_iter().collect();
        assert_eq!(a, b);
        assert_eq!(a.len(), 2);
    }

    #[test]
    fn test_record_set_overwrites() {
        let mut record = SessionRecord::new();
        assert_eq!(record.set("k", "v1"), None);
        assert_eq!(record.set("k", "v2"), Some("v1".to_string()));
        assert_eq!(record.get("k"), Some(&"v2".to_string()));
        assert_eq!(record.remove("k"), Some("v2".to_string()));
        assert!(record.is_empty());
    }
}
