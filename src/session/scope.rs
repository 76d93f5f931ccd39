use crate::error::{Result, SessionError};
use serde::{Deserialize, Serialize};
use std::fmt;

/// Name of the scope used when a request does not ask for another one
pub const DEFAULT_SCOPE: &str = "web";

const MAX_SCOPE_LENGTH: usize = 64;

/// Session scope
///
/// The scope is the cookie name that carries a session identifier. One
/// client can hold several scopes at once, each with its own identifier
/// and its own record.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct SessionScope(String);

impl SessionScope {
    /// Validate and wrap a scope name
    ///
    /// Scope names end up as cookie names, so they are restricted to
    /// `[A-Za-z0-9_-]` and 1-64 characters.
    pub fn new(name: impl Into<String>) -> Result<Self> {
        let name = name.into();
        if name.is_empty() || name.len() > MAX_SCOPE_LENGTH {
            return Err(SessionError::bad_request(format!(
                "Session name must be 1-{} characters",
                MAX_SCOPE_LENGTH
            )));
        }
        if !name
            .bytes()
            .all(|b| b.is_ascii_alphanumeric() || b == b'_' || b == b'-')
        {
            return Err(SessionError::bad_request(format!(
                "Invalid session name: {:?}",
                name
            )));
        }
        Ok(Self(name))
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for SessionScope {
    fn default() -> Self {
        Self(DEFAULT_SCOPE.to_string())
    }
}

impl fmt::Display for SessionScope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

impl TryFrom<String> for SessionScope {
    type Error = SessionError;

    fn try_from(value: String) -> Result<Self> {
        Self::new(value)
    }
}

impl From<SessionScope> for String {
    fn from(scope: SessionScope) -> Self {
        scope.0
    }
}
