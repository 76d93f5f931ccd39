//! A cookie-keeping client for multi-request session tests

use super::scenario::{Scenario, ScenarioAssert};
use axum::Router;
use axum::http::header;
use cookie::{Cookie, CookieJar};
use tower::ServiceExt;

/// Sends requests to a [`Router`] the way a browser would: cookies from
/// `Set-Cookie` are remembered and replayed on later requests, and a
/// cookie sent back with `Max-Age=0` is forgotten.
///
/// ```rust,ignore
/// let mut client = TestClient::new(router);
/// client.get("/set?key=a&value=b").await.assert_ok();
/// let body: serde_json::Value = client.get("/getall").await.json().await;
/// ```
pub struct TestClient {
    app: Router,
    jar: CookieJar,
}

impl TestClient {
    pub fn new(app: Router) -> Self {
        Self {
            app,
            jar: CookieJar::new(),
        }
    }

    /// Value of the remembered cookie `name`
    pub fn cookie(&self, name: &str) -> Option<String> {
        self.jar.get(name).map(|c| c.value().to_string())
    }

    /// Remember `name=value` as if the server had set it
    pub fn set_cookie(&mut self, name: &str, value: &str) {
        self.jar.add(Cookie::new(name.to_string(), value.to_string()));
    }

    /// Forget every cookie, like a fresh browser
    pub fn clear_cookies(&mut self) {
        self.jar = CookieJar::new();
    }

    /// Issue a GET for `uri` with the remembered cookies
    pub async fn get(&mut self, uri: &str) -> ScenarioAssert {
        let scenario = super::scenario::get(self.app.clone(), uri);
        self.send(scenario).await
    }

    /// Execute a prepared scenario with the remembered cookies attached
    pub async fn send(&mut self, scenario: Scenario) -> ScenarioAssert {
        let scenario = match self.cookie_header() {
            Some(value) => scenario.header(header::COOKIE.as_str(), &value),
            None => scenario,
        };

        let response = scenario.execute().await.response();
        for value in response.headers().get_all(header::SET_COOKIE) {
            if let Ok(raw) = value.to_str() {
                self.remember(raw);
            }
        }

        ScenarioAssert::from_response(response)
    }

    /// Build a request against this client's router without sending it
    pub fn scenario(&self, uri: &str) -> Scenario {
        super::scenario::get(self.app.clone(), uri)
    }

    /// Send a request without cookies, bypassing the jar entirely
    pub async fn get_anonymous(&self, uri: &str) -> ScenarioAssert {
        let request = axum::http::Request::get(uri)
            .body(axum::body::Body::empty())
            .unwrap();
        let response = self.app.clone().oneshot(request).await.unwrap();
        ScenarioAssert::from_response(response)
    }

    fn cookie_header(&self) -> Option<String> {
        let pairs: Vec<String> = self
            .jar
            .iter()
            .map(|c| format!("{}={}", c.name(), c.value()))
            .collect();
        (!pairs.is_empty()).then(|| pairs.join("; "))
    }

    fn remember(&mut self, raw: &str) {
        let Ok(cookie) = Cookie::parse(raw.to_string()) else {
            return;
        };

        let expired = cookie.max_age().is_some_and(|age| age.is_zero());
        if expired || cookie.value().is_empty() {
            self.jar.remove(Cookie::from(cookie.name().to_string()));
        } else {
            self.jar.add(cookie);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::HeaderMap;
    use axum::routing::get;

    async fn issue() -> [(header::HeaderName, &'static str); 1] {
        [(header::SET_COOKIE, "web=abc123; path=/")]
    }

    async fn expire() -> [(header::HeaderName, &'static str); 1] {
        [(header::SET_COOKIE, "web=; path=/; Max-Age=0")]
    }

    async fn echo(headers: HeaderMap) -> String {
        headers
            .get(header::COOKIE)
            .and_then(|v| v.to_str().ok())
            .unwrap_or_default()
            .to_string()
    }

    fn router() -> Router {
        Router::new()
            .route("/issue", get(issue))
            .route("/expire", get(expire))
            .route("/echo", get(echo))
    }

    #[tokio::test]
    async fn test_remembers_and_replays_cookie() {
        let mut client = TestClient::new(router());
        client.get("/issue").await.assert_ok();
        assert_eq!(client.cookie("web").as_deref(), Some("abc123"));

        let sent = client.get("/echo").await.body_string().await;
        assert_eq!(sent, "web=abc123");
    }

    #[tokio::test]
    async fn test_max_age_zero_forgets_cookie() {
        let mut client = TestClient::new(router());
        client.get("/issue").await;
        client.get("/expire").await;
        assert_eq!(client.cookie("web"), None);

        let sent = client.get("/echo").await.body_string().await;
        assert_eq!(sent, "");
    }

    #[tokio::test]
    async fn test_manual_cookie_and_clear() {
        let mut client = TestClient::new(router());
        client.set_cookie("web1", "zzz");
        let sent = client.get("/echo").await.body_string().await;
        assert_eq!(sent, "web1=zzz");

        client.clear_cookies();
        assert_eq!(client.cookie("web1"), None);
    }
}
