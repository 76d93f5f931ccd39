//! Cookie transport for session identifiers
//!
//! The identifier for a scope travels in a cookie named after the scope.
//! Incoming `Cookie` headers are parsed with the `cookie` crate; outgoing
//! `Set-Cookie` values are rendered here so the default header is exactly
//! `<scope>=<token>; path=/` with optional attributes appended only when
//! they are enabled in [`SessionConfig`].

use crate::error::{Result, SessionError};
use crate::session::config::{CookieSameSite, SessionConfig};
use crate::session::{SessionId, SessionScope};
use axum::http::{HeaderMap, HeaderValue, header};
use cookie::Cookie;

/// Binds session identifiers to HTTP cookies
#[derive(Debug, Clone)]
pub struct CookieTransport {
    path: String,
    domain: Option<String>,
    secure: bool,
    http_only: bool,
    same_site: Option<CookieSameSite>,
}

impl Default for CookieTransport {
    fn default() -> Self {
        Self::from_config(&SessionConfig::default())
    }
}

impl CookieTransport {
    pub fn from_config(config: &SessionConfig) -> Self {
        Self {
            path: config.cookie_path.clone(),
            domain: config.cookie_domain.clone(),
            secure: config.cookie_secure,
            http_only: config.cookie_http_only,
            same_site: config.cookie_same_site,
        }
    }

    /// Find the identifier the client presented for `scope`
    ///
    /// Every `Cookie` header is searched. Values that are not valid
    /// identifiers are skipped, so a malformed cookie reads as "no cookie".
    pub fn read(&self, headers: &HeaderMap, scope: &SessionScope) -> Option<SessionId> {
        headers
            .get_all(header::COOKIE)
            .iter()
            .filter_map(|value| value.to_str().ok())
            .flat_map(|value| Cookie::split_parse(value))
            .filter_map(|cookie| cookie.ok())
            .filter(|cookie| cookie.name() == scope.as_str())
            .find_map(|cookie| SessionId::parse(cookie.value()))
    }

    /// `Set-Cookie` value that hands `id` to the client under `scope`
    pub fn issue(&self, scope: &SessionScope, id: &SessionId) -> String {
        let mut value = format!("{}={}; path={}", scope, id, self.path);
        self.push_attributes(&mut value);
        value
    }

    /// `Set-Cookie` value that tells the client to drop the cookie for `scope`
    pub fn expire(&self, scope: &SessionScope) -> String {
        let mut value = format!(
            "{}=; path={}; Max-Age=0; Expires=Thu, 01 Jan 1970 00:00:00 GMT",
            scope, self.path
        );
        self.push_attributes(&mut value);
        value
    }

    /// Same as [`issue`](Self::issue), as a header value
    pub fn issue_header(&self, scope: &SessionScope, id: &SessionId) -> Result<HeaderValue> {
        to_header_value(self.issue(scope, id))
    }

    /// Same as [`expire`](Self::expire), as a header value
    pub fn expire_header(&self, scope: &SessionScope) -> Result<HeaderValue> {
        to_header_value(self.expire(scope))
    }

    fn push_attributes(&self, value: &mut String) {
        if let Some(ref domain) = self.domain {
            value.push_str("; Domain=");
            value.push_str(domain);
        }
        if self.secure {
            value.push_str("; Secure");
        }
        if self.http_only {
            value.push_str("; HttpOnly");
        }
        if let Some(same_site) = self.same_site {
            value.push_str(match same_site {
                CookieSameSite::Strict => "; SameSite=Strict",
                CookieSameSite::Lax => "; SameSite=Lax",
                CookieSameSite::None => "; SameSite=None",
            });
        }
    }
}

fn to_header_value(value: String) -> Result<HeaderValue> {
    HeaderValue::from_str(&value).map_err(|e| {
        tracing::error!(error = %e, "Session cookie is not a valid header value");
        SessionError::internal(format!("Invalid Set-Cookie value: {}", e))
    })
}

/// Whether `value` can be used as a cookie attribute value
///
/// Visible ASCII only, without the `;` and `,` that delimit attributes.
pub(crate) fn is_valid_attribute_value(value: &str) -> bool {
    !value.is_empty()
        && value
            .bytes()
            .all(|b| b.is_ascii_graphic() && b != b';' && b != b',')
}

#[cfg(test)]
mod tests {
    use super::*;

    fn scope(name: &str) -> SessionScope {
        SessionScope::new(name).unwrap()
    }

    fn cookie_headers(cookies: &[&str]) -> HeaderMap {
        let mut headers = HeaderMap::new();
        for cookie in cookies {
            headers.append(header::COOKIE, HeaderValue::from_str(cookie).unwrap());
        }
        headers
    }

    #[test]
    fn test_issue_default_format() {
        let transport = CookieTransport::default();
        let id = SessionId::parse("abc123").unwrap();
        assert_eq!(transport.issue(&scope("web"), &id), "web=abc123; path=/");
    }

    #[test]
    fn test_issue_with_attributes() {
        let config = SessionConfig {
            cookie_domain: Some("example.com".to_string()),
            cookie_secure: true,
            cookie_http_only: true,
            cookie_same_site: Some(CookieSameSite::Lax),
            ..Default::default()
        };
        let transport = CookieTransport::from_config(&config);
        let id = SessionId::parse("abc123").unwrap();

        assert_eq!(
            transport.issue(&scope("web"), &id),
            "web=abc123; path=/; Domain=example.com; Secure; HttpOnly; SameSite=Lax"
        );
    }

    #[test]
    fn test_expire() {
        let transport = CookieTransport::default();
        let value = transport.expire(&scope("web1"));
        assert!(value.starts_with("web1=; path=/; Max-Age=0"));

        let parsed = Cookie::parse(value).unwrap();
        assert_eq!(parsed.value(), "");
        assert_eq!(parsed.max_age(), Some(cookie::time::Duration::ZERO));
    }

    #[test]
    fn test_read_finds_scope_cookie() {
        let transport = CookieTransport::default();
        let headers = cookie_headers(&["other=zzz; web=abc123; web2=def456"]);

        assert_eq!(transport.read(&headers, &scope("web")).unwrap().as_str(), "abc123");
        assert_eq!(transport.read(&headers, &scope("web2")).unwrap().as_str(), "def456");
        assert!(transport.read(&headers, &scope("web1")).is_none());
    }

    #[test]
    fn test_read_searches_every_cookie_header() {
        let transport = CookieTransport::default();
        let headers = cookie_headers(&["a=1", "web=abc123"]);
        assert_eq!(transport.read(&headers, &scope("web")).unwrap().as_str(), "abc123");
    }

    #[test]
    fn test_read_skips_malformed_values() {
        let transport = CookieTransport::default();

        let headers = cookie_headers(&["web=NOT-VALID"]);
        assert!(transport.read(&headers, &scope("web")).is_none());

        let headers = cookie_headers(&["web="]);
        assert!(transport.read(&headers, &scope("web")).is_none());
    }

    #[test]
    fn test_read_without_cookie_header() {
        let transport = CookieTransport::default();
        assert!(transport.read(&HeaderMap::new(), &scope("web")).is_none());
    }

    #[test]
    fn test_header_rejects_non_ascii_path() {
        let config = SessionConfig {
            cookie_path: "/caf\u{e9}".to_string(),
            ..Default::default()
        };
        let transport = CookieTransport::from_config(&config);
        let id = SessionId::parse("abc123").unwrap();

        assert!(transport.issue_header(&scope("web"), &id).is_err());
        assert!(transport.expire_header(&scope("web")).is_err());
        assert!(CookieTransport::default().issue_header(&scope("web"), &id).is_ok());
    }

    #[test]
    fn test_attribute_value_rules() {
        assert!(is_valid_attribute_value("/app"));
        assert!(is_valid_attribute_value("example.com"));
        assert!(!is_valid_attribute_value(""));
        assert!(!is_valid_attribute_value("/a b"));
        assert!(!is_valid_attribute_value("/a;b"));
        assert!(!is_valid_attribute_value("a,b"));
        assert!(!is_valid_attribute_value("/caf\u{e9}"));
    }
}
