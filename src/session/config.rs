use crate::error::{Result, SessionError};
use crate::session::cookie::is_valid_attribute_value;
use crate::session::id::{DEFAULT_ID_LENGTH, MAX_ID_LENGTH, MIN_ID_LENGTH};
use crate::session::scope::{DEFAULT_SCOPE, SessionScope};
use crate::utils::{get_env_with_prefix, parse_bool};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Session backend type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum SessionBackend {
    /// In-memory session store (for dev/testing, not shared between processes)
    Memory,
    /// One JSON file per session in `file_dir` (default)
    #[default]
    File,
    /// Redis hashes (requires the `redis` feature)
    Redis,
}

impl SessionBackend {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Some(Self::Memory),
            "file" | "files" => Some(Self::File),
            "redis" => Some(Self::Redis),
            _ => None,
        }
    }
}

/// SameSite attribute for the identifier cookie
#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum CookieSameSite {
    Strict,
    Lax,
    None,
}

impl CookieSameSite {
    fn from_name(name: &str) -> Option<Self> {
        match name.trim().to_lowercase().as_str() {
            "strict" => Some(Self::Strict),
            "lax" => Some(Self::Lax),
            "none" => Some(Self::None),
            _ => None,
        }
    }
}

/// Session configuration
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct SessionConfig {
    /// Session backend type
    #[serde(default)]
    pub backend: SessionBackend,

    /// Directory for the file backend
    #[serde(default = "default_file_dir")]
    pub file_dir: PathBuf,

    /// Redis connection URL (only used for the Redis backend)
    #[serde(default)]
    pub redis_url: Option<String>,

    /// Prefix for Redis keys
    #[serde(default = "default_key_prefix")]
    pub key_prefix: String,

    /// Scope (cookie name) used when the request does not select one
    #[serde(default = "default_scope")]
    pub default_scope: String,

    /// Query parameter that selects an alternate scope
    #[serde(default = "default_scope_param")]
    pub scope_param: String,

    /// Length of minted identifiers
    #[serde(default = "default_id_length")]
    pub id_length: usize,

    /// Cookie path
    #[serde(default = "default_cookie_path")]
    pub cookie_path: String,

    /// Cookie domain (optional)
    #[serde(default)]
    pub cookie_domain: Option<String>,

    /// Cookie secure flag (HTTPS only)
    #[serde(default)]
    pub cookie_secure: bool,

    /// Cookie http_only flag
    #[serde(default)]
    pub cookie_http_only: bool,

    /// Cookie SameSite attribute (omitted when `None`)
    #[serde(default)]
    pub cookie_same_site: Option<CookieSameSite>,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            backend: SessionBackend::default(),
            file_dir: default_file_dir(),
            redis_url: None,
            key_prefix: default_key_prefix(),
            default_scope: default_scope(),
            scope_param: default_scope_param(),
            id_length: default_id_length(),
            cookie_path: default_cookie_path(),
            cookie_domain: None,
            cookie_secure: false,
            cookie_http_only: false,
            cookie_same_site: None,
        }
    }
}

impl SessionConfig {
    /// Load session configuration from environment variables
    pub fn from_env() -> Self {
        let mut config = Self::default();

        if let Some(backend) = get_env_with_prefix("SESSION_BACKEND") {
            match SessionBackend::from_name(&backend) {
                Some(b) => config.backend = b,
                None => tracing::warn!(backend = %backend, "Unknown session backend, using file"),
            }
        }

        if let Some(dir) = get_env_with_prefix("SESSION_DIR") {
            config.file_dir = PathBuf::from(dir);
        }

        if let Some(url) = get_env_with_prefix("SESSION_REDIS_URL") {
            config.redis_url = Some(url);
        }

        if let Some(prefix) = get_env_with_prefix("SESSION_KEY_PREFIX") {
            config.key_prefix = prefix;
        }

        if let Some(scope) = get_env_with_prefix("SESSION_DEFAULT_SCOPE") {
            config.default_scope = scope;
        }

        if let Some(param) = get_env_with_prefix("SESSION_SCOPE_PARAM") {
            config.scope_param = param;
        }

        if let Some(length) = get_env_with_prefix("SESSION_ID_LENGTH") {
            if let Ok(length) = length.parse() {
                config.id_length = length;
            }
        }

        if let Some(path) = get_env_with_prefix("SESSION_COOKIE_PATH") {
            config.cookie_path = path;
        }

        if let Some(domain) = get_env_with_prefix("SESSION_COOKIE_DOMAIN") {
            config.cookie_domain = Some(domain);
        }

        if let Some(secure) = get_env_with_prefix("SESSION_COOKIE_SECURE") {
            config.cookie_secure = parse_bool(&secure).unwrap_or(false);
        }

        if let Some(http_only) = get_env_with_prefix("SESSION_COOKIE_HTTP_ONLY") {
            config.cookie_http_only = parse_bool(&http_only).unwrap_or(false);
        }

        if let Some(same_site) = get_env_with_prefix("SESSION_COOKIE_SAME_SITE") {
            match CookieSameSite::from_name(&same_site) {
                Some(s) => config.cookie_same_site = Some(s),
                None => tracing::warn!(
                    same_site = %same_site,
                    "Unknown cookie SameSite value, omitting the attribute"
                ),
            }
        }

        config
    }

    /// The default scope as a validated [`SessionScope`]
    pub fn scope(&self) -> Result<SessionScope> {
        SessionScope::new(self.default_scope.clone())
    }

    /// Check the settings that can be wrong independently of the server config
    pub fn validate(&self) -> Result<()> {
        self.scope()?;

        if self.scope_param.is_empty() {
            return Err(SessionError::bad_request("Session scope parameter must not be empty"));
        }

        if !(MIN_ID_LENGTH..=MAX_ID_LENGTH).contains(&self.id_length) {
            return Err(SessionError::bad_request(format!(
                "Session id length must be between {} and {}, got {}",
                MIN_ID_LENGTH, MAX_ID_LENGTH, self.id_length
            )));
        }

        if !self.cookie_path.starts_with('/') {
            return Err(SessionError::bad_request(format!(
                "Session cookie path must start with '/', got: {}",
                self.cookie_path
            )));
        }

        if !is_valid_attribute_value(&self.cookie_path) {
            return Err(SessionError::bad_request(format!(
                "Session cookie path must be visible ASCII without ';' or ',', got: {:?}",
                self.cookie_path
            )));
        }

        if let Some(ref domain) = self.cookie_domain {
            if !is_valid_attribute_value(domain) {
                return Err(SessionError::bad_request(format!(
                    "Session cookie domain must be visible ASCII without ';' or ',', got: {:?}",
                    domain
                )));
            }
        }

        if self.backend == SessionBackend::Redis && self.redis_url.is_none() {
            return Err(SessionError::bad_request(
                "Redis session backend requires SESSION_REDIS_URL",
            ));
        }

        Ok(())
    }
}

fn default_file_dir() -> PathBuf {
    std::env::temp_dir().join("sessionkit")
}

fn default_key_prefix() -> String {
    "sessionkit:".to_string()
}

fn default_scope() -> String {
    DEFAULT_SCOPE.to_string()
}

fn default_scope_param() -> String {
    "session_name".to_string()
}

fn default_id_length() -> usize {
    DEFAULT_ID_LENGTH
}

fn default_cookie_path() -> String {
    "/".to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = SessionConfig::default();
        assert_eq!(config.backend, SessionBackend::File);
        assert_eq!(config.default_scope, "web");
        assert_eq!(config.scope_param, "session_name");
        assert_eq!(config.cookie_path, "/");
        assert_eq!(config.id_length, DEFAULT_ID_LENGTH);
        assert!(!config.cookie_secure);
        assert!(!config.cookie_http_only);
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_backend_names() {
        assert_eq!(SessionBackend::from_name("memory"), Some(SessionBackend::Memory));
        assert_eq!(SessionBackend::from_name("FILE"), Some(SessionBackend::File));
        assert_eq!(SessionBackend::from_name("redis"), Some(SessionBackend::Redis));
        assert_eq!(SessionBackend::from_name("mongo"), None);
    }

    #[test]
    fn test_deserialize_with_defaults() {
        let config: SessionConfig =
            serde_json::from_str(r#"{"backend":"memory","default_scope":"app"}"#).unwrap();
        assert_eq!(config.backend, SessionBackend::Memory);
        assert_eq!(config.default_scope, "app");
        assert_eq!(config.cookie_path, "/");
    }

    #[test]
    fn test_validate_rejects_bad_scope() {
        let config = SessionConfig {
            default_scope: "bad scope".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_id_length() {
        let config = SessionConfig {
            id_length: 8,
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_rejects_relative_cookie_path() {
        let config = SessionConfig {
            cookie_path: "app".to_string(),
            ..Default::default()
        };
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_validate_redis_requires_url() {
        let config = SessionConfig {
            backend: SessionBackend::Redis,
            ..Default::default()
        };
        assert!(config.validate().is_err());

        let config = SessionConfig {
            backend: SessionBackend::Redis,
            redis_url: Some("redis://127.0.0.1/".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_validate_rejects_unencodable_cookie_attributes() {
        for path in ["/caf\u{e9}", "/a b", "/a;b", "/a,b"] {
            let config = SessionConfig {
                cookie_path: path.to_string(),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "path {:?}", path);
        }

        for domain in ["", "exa mple.com", "example.com;secure", "\u{fc}ber.de"] {
            let config = SessionConfig {
                cookie_domain: Some(domain.to_string()),
                ..Default::default()
            };
            assert!(config.validate().is_err(), "domain {:?}", domain);
        }

        let config = SessionConfig {
            cookie_path: "/app".to_string(),
            cookie_domain: Some("example.com".to_string()),
            ..Default::default()
        };
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_same_site_names_match_serde() {
        assert_eq!(CookieSameSite::from_name(" LAX "), Some(CookieSameSite::Lax));
        assert_eq!(CookieSameSite::from_name("sideways"), None);

        let config: SessionConfig =
            serde_json::from_str(r#"{"cookie_same_site":"strict"}"#).unwrap();
        assert_eq!(config.cookie_same_site, Some(CookieSameSite::Strict));
        assert_eq!(
            serde_json::to_string(&CookieSameSite::None).unwrap(),
            "\"none\""
        );
    }
}
