use crate::error::{Result, SessionError};
use crate::session::SessionId;
use crate::traits::session::{SessionRecord, SessionStore};
use async_trait::async_trait;
use std::collections::BTreeMap;

/// Redis-backed session store
///
/// Each session is a Redis hash stored at `<prefix><id>`, so a single
/// field update is one `HSET` and sessions never share a key.
#[derive(Clone)]
pub struct RedisSessionStore {
    client: redis::Client,
    prefix: String,
}

impl RedisSessionStore {
    /// Create a new Redis session store from a connection URL
    pub fn new(url: &str, prefix: impl Into<String>) -> Result<Self> {
        let client = redis::Client::open(url)
            .map_err(|e| SessionError::internal(format!("Failed to create Redis client: {}", e)))?;

        Ok(Self {
            client,
            prefix: prefix.into(),
        })
    }

    fn key(&self, id: &SessionId) -> String {
        format!("{}{}", self.prefix, id)
    }

    /// Get a connection from the Redis client
    async fn get_connection(&self) -> Result<redis::aio::MultiplexedConnection> {
        self.client
            .get_multiplexed_async_connection()
            .await
            .map_err(|e| SessionError::service_unavailable(format!("Failed to get Redis connection: {}", e)))
    }
}

#[async_trait]
impl SessionStore for RedisSessionStore {
    async fn get_all(&self, id: &SessionId) -> Result<SessionRecord> {
        let mut conn = self.get_connection().await?;

        let fields = redis::cmd("HGETALL")
            .arg(self.key(id))
            .query_async::<BTreeMap<String, String>>(&mut conn)
            .await?;

        Ok(SessionRecord::from(fields))
    }

    async fn get(&self, id: &SessionId, key: &str) -> Result<Option<String>> {
        let mut conn = self.get_connection().await?;

        let value = redis::cmd("HGET")
            .arg(self.key(id))
            .arg(key)
            .query_async::<Option<String>>(&mut conn)
            .await?;

        Ok(value)
    }

    async fn set(&self, id: &SessionId, key: &str, value: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;

        redis::cmd("HSET")
            .arg(self.key(id))
            .arg(key)
            .arg(value)
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn set_many(&self, id: &SessionId, pairs: Vec<(String, String)>) -> Result<()> {
        if pairs.is_empty() {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;
        let mut cmd = redis::cmd("HSET");
        cmd.arg(self.key(id));
        for (key, value) in &pairs {
            cmd.arg(key).arg(value);
        }
        cmd.query_async::<()>(&mut conn).await?;

        Ok(())
    }

    async fn delete(&self, id: &SessionId, key: &str) -> Result<()> {
        let mut conn = self.get_connection().await?;

        // Redis drops the hash on its own once the last field is gone
        redis::cmd("HDEL")
            .arg(self.key(id))
            .arg(key)
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn destroy(&self, id: &SessionId) -> Result<()> {
        let mut conn = self.get_connection().await?;

        redis::cmd("DEL")
            .arg(self.key(id))
            .query_async::<()>(&mut conn)
            .await?;

        Ok(())
    }

    async fn rename(&self, from: &SessionId, to: &SessionId) -> Result<()> {
        if from == to {
            return Ok(());
        }

        let mut conn = self.get_connection().await?;

        let renamed = redis::cmd("RENAME")
            .arg(self.key(from))
            .arg(self.key(to))
            .query_async::<()>(&mut conn)
            .await;

        match renamed {
            Ok(()) => Ok(()),
            // nothing stored under `from` yet
            Err(e) if is_missing_key(&e) => Ok(()),
            Err(e) => Err(e.into()),
        }
    }

    fn name(&self) -> &str {
        "sessions:redis"
    }

    fn is_healthy(&self) -> bool {
        // Best effort: a blocking connection attempt
        self.client.get_connection().is_ok()
    }
}

fn is_missing_key(err: &redis::RedisError) -> bool {
    err.kind() == redis::ErrorKind::ResponseError
        && err
            .detail()
            .is_some_and(|detail| detail.eq_ignore_ascii_case("no such key"))
}

#[cfg(test)]
mod tests {
    use super::*;

    // These tests need a running Redis instance

    fn id(s: &str) -> SessionId {
        SessionId::parse(s).unwrap()
    }

    #[test]
    fn test_key_uses_prefix() {
        let store = RedisSessionStore::new("redis://127.0.0.1/", "app:").unwrap();
        assert_eq!(store.key(&id("abc123")), "app:abc123");
    }

    #[test]
    fn test_invalid_url_rejected() {
        assert!(RedisSessionStore::new("not a url", "app:").is_err());
    }

    #[tokio::test]
    #[ignore] // Requires Redis
    async fn test_redis_session_lifecycle() {
        let store = RedisSessionStore::new("redis://127.0.0.1/", "sessionkit-test:").unwrap();
        let session = SessionId::generate();

        assert!(store.get_all(&session).await.unwrap().is_empty());

        store.set(&session, "ok", "yep").await.unwrap();
        let expected: SessionRecord = [("ok", "yep")].into_iter().collect();
        assert_eq!(store.get_all(&session).await.unwrap(), expected);

        let renamed = SessionId::generate();
        store.rename(&session, &renamed).await.unwrap();
        assert!(store.get_all(&session).await.unwrap().is_empty());
        assert_eq!(store.get(&renamed, "ok").await.unwrap(), Some("yep".to_string()));

        store.destroy(&renamed).await.unwrap();
        assert!(store.get_all(&renamed).await.unwrap().is_empty());

        // renaming a session with nothing stored is a no-op
        let empty = SessionId::generate();
        store.rename(&empty, &SessionId::generate()).await.unwrap();
    }

    #[test]
    fn test_missing_key_reply_recognised() {
        let missing = redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            "An error was signalled by the server",
            "no such key".to_string(),
        ));
        assert!(is_missing_key(&missing));

        let other = redis::RedisError::from((
            redis::ErrorKind::ResponseError,
            "An error was signalled by the server",
            "WRONGTYPE Operation against a key".to_string(),
        ));
        assert!(!is_missing_key(&other));

        let io = redis::RedisError::from(std::io::Error::other("reset"));
        assert!(!is_missing_key(&io));
    }
}
