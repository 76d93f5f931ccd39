use crate::error::{Result, SessionError};
use crate::session::{CookieTransport, SessionConfig};
use crate::traits::session::SessionStore;
use std::sync::Arc;

/// Application context for dependency injection and shared state
///
/// Holds the session store and the session settings every request needs.
/// Handlers get at it through `State<AppContext>` or, more usually, through
/// the [`Session`](crate::session::Session) extractor.
#[derive(Clone)]
pub struct AppContext {
    pub sessions: Option<Arc<dyn SessionStore>>,
    session_config: Arc<SessionConfig>,
    cookie_transport: Arc<CookieTransport>,
}

impl AppContext {
    pub fn new() -> Self {
        Self::builder().build()
    }

    /// Builder pattern for constructing AppContext
    pub fn builder() -> AppContextBuilder {
        AppContextBuilder::new()
    }

    /// Get the session store, returning an error if not configured
    pub fn sessions(&self) -> Result<&Arc<dyn SessionStore>> {
        self.sessions
            .as_ref()
            .ok_or_else(|| SessionError::internal("Session store not configured"))
    }

    /// Get the session store as an Option
    pub fn sessions_opt(&self) -> Option<&Arc<dyn SessionStore>> {
        self.sessions.as_ref()
    }

    pub fn session_config(&self) -> &SessionConfig {
        &self.session_config
    }

    pub fn cookie_transport(&self) -> Arc<CookieTransport> {
        self.cookie_transport.clone()
    }
}

impl Default for AppContext {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for AppContext with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppContextBuilder {
    sessions: Option<Arc<dyn SessionStore>>,
    session_config: SessionConfig,
}

impl AppContextBuilder {
    pub fn new() -> Self {
        Self {
            sessions: None,
            session_config: SessionConfig::default(),
        }
    }

    /// Set the session store
    pub fn with_sessions(mut self, sessions: Arc<dyn SessionStore>) -> Self {
        self.sessions = Some(sessions);
        self
    }

    /// Set the session configuration (scope, cookie attributes, id length)
    pub fn with_session_config(mut self, config: SessionConfig) -> Self {
        self.session_config = config;
        self
    }

    pub fn build(self) -> AppContext {
        let cookie_transport = CookieTransport::from_config(&self.session_config);
        AppContext {
            sessions: self.sessions,
            session_config: Arc::new(self.session_config),
            cookie_transport: Arc::new(cookie_transport),
        }
    }
}

impl Default for AppContextBuilder {
    fn default() -> Self {
        Self::new()
    }
}
