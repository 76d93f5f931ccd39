//! Session management and storage.
//!
//! Identifiers, scopes and the cookie protocol that carries them, the
//! per-request [`Session`] extractor, and the in-memory, file and Redis
//! storage backends.

mod config;
pub mod cookie;
mod extractor;
mod file;
pub mod id;
mod in_memory;
mod scope;

#[cfg(feature = "redis")]
mod redis;

pub use config::{CookieSameSite, SessionBackend, SessionConfig};
pub use cookie::CookieTransport;
pub use extractor::Session;
pub use file::FileSessionStore;
pub use id::{ResolvedId, SessionId, resolve_or_create};
pub use in_memory::InMemorySessionStore;
pub use scope::{DEFAULT_SCOPE, SessionScope};

#[cfg(feature = "redis")]
pub use redis::RedisSessionStore;

use crate::error::{Result, SessionError};
use crate::traits::session::SessionStore;
use std::sync::Arc;

/// Build the store selected by `config.backend`
pub async fn build_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>> {
    match config.backend {
        SessionBackend::Memory => {
            tracing::warn!("Using in-memory session store; sessions are lost on restart");
            Ok(Arc::new(InMemorySessionStore::new()))
        }
        SessionBackend::File => {
            let store = FileSessionStore::new(config.file_dir.clone()).await?;
            tracing::info!(dir = %store.dir().display(), "Using file session store");
            Ok(Arc::new(store))
        }
        SessionBackend::Redis => build_redis_store(config),
    }
}

#[cfg(feature = "redis")]
fn build_redis_store(config: &SessionConfig) -> Result<Arc<dyn SessionStore>> {
    let url = config
        .redis_url
        .as_deref()
        .ok_or_else(|| SessionError::bad_request("Redis session backend requires SESSION_REDIS_URL"))?;
    let store = RedisSessionStore::new(url, config.key_prefix.clone())?;
    tracing::info!(prefix = %config.key_prefix, "Using Redis session store");
    Ok(Arc::new(store))
}

#[cfg(not(feature = "redis"))]
fn build_redis_store(_config: &SessionConfig) -> Result<Arc<dyn SessionStore>> {
    Err(SessionError::bad_request(
        "Redis session backend requested but the redis feature is not enabled",
    ))
}
