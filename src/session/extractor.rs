use crate::app::AppContext;
use crate::error::{Result, SessionError};
use crate::session::cookie::CookieTransport;
use crate::session::id::resolve_or_create_with_length;
use crate::session::{SessionId, SessionScope};
use crate::traits::session::{SessionRecord, SessionStore};
use axum::extract::{FromRef, FromRequestParts, Query};
use axum::http::{header, request::Parts};
use axum::response::{IntoResponseParts, ResponseParts};
use std::collections::HashMap;
use std::future::Future;
use std::sync::Arc;

/// What the response has to tell the client about its identifier
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum CookieAction {
    None,
    Issue,
    Expire,
}

/// Axum extractor giving a handler the session for the active scope
///
/// The scope comes from the configured query parameter (`session_name` by
/// default) or falls back to the default scope. The identifier comes from
/// the cookie named after the scope; if there is none, or it is malformed,
/// a new one is minted.
///
/// Return the `Session` as part of the response so the identity cookie is
/// emitted:
///
/// ```rust,ignore
/// async fn getall(session: Session) -> sessionkit::Result<(Session, Json<SessionRecord>)> {
///     let record = session.get_all().await?;
///     Ok((session, Json(record)))
/// }
/// ```
pub struct Session {
    store: Arc<dyn SessionStore>,
    transport: Arc<CookieTransport>,
    scope: SessionScope,
    id: SessionId,
    id_length: usize,
    cookie: CookieAction,
}

impl Session {
    /// Build a session handle from an already resolved scope and cookie value
    ///
    /// This is what the extractor does once it has found the scope; it is
    /// public so the protocol can be driven without an HTTP request.
    pub fn resolve(
        context: &AppContext,
        scope: SessionScope,
        cookie_value: Option<SessionId>,
    ) -> Result<Self> {
        let store = context.sessions()?.clone();
        let id_length = context.session_config().id_length;
        let resolved =
            resolve_or_create_with_length(cookie_value.as_ref().map(SessionId::as_str), id_length);

        if resolved.minted {
            tracing::debug!(scope = %scope, "Minted new session identifier");
        }

        Ok(Self {
            store,
            transport: context.cookie_transport(),
            scope,
            id: resolved.id,
            id_length,
            cookie: if resolved.minted {
                CookieAction::Issue
            } else {
                CookieAction::None
            },
        })
    }

    pub fn id(&self) -> &SessionId {
        &self.id
    }

    pub fn scope(&self) -> &SessionScope {
        &self.scope
    }

    /// Whether the identifier was minted during this request
    pub fn is_new(&self) -> bool {
        self.cookie == CookieAction::Issue
    }

    pub async fn get_all(&self) -> Result<SessionRecord> {
        self.store.get_all(&self.id).await
    }

    pub async fn get(&self, key: &str) -> Result<Option<String>> {
        self.store.get(&self.id, key).await
    }

    pub async fn set(&mut self, key: &str, value: &str) -> Result<()> {
        self.store.set(&self.id, key, value).await?;
        self.reissue_after_destroy();
        Ok(())
    }

    pub async fn set_many(&mut self, pairs: Vec<(String, String)>) -> Result<()> {
        self.store.set_many(&self.id, pairs).await?;
        self.reissue_after_destroy();
        Ok(())
    }

    pub async fn delete(&mut self, key: &str) -> Result<()> {
        self.store.delete(&self.id, key).await
    }

    /// Remove the whole record and invalidate the identifier
    ///
    /// The response expires the cookie the client presented. Writes made
    /// after this in the same request go to a fresh identifier, which is then
    /// issued instead. A session minted in this very request has no cookie to
    /// expire, so its replacement identifier is issued straight away.
    pub async fn destroy(&mut self) -> Result<()> {
        self.store.destroy(&self.id).await?;
        tracing::debug!(scope = %self.scope, "Session destroyed");

        self.id = SessionId::generate_with_length(self.id_length);
        if self.cookie != CookieAction::Issue {
            self.cookie = CookieAction::Expire;
        }
        Ok(())
    }

    /// Move the record to a freshly minted identifier and issue it
    pub async fn regenerate(&mut self) -> Result<()> {
        let new_id = SessionId::generate_with_length(self.id_length);
        self.store.rename(&self.id, &new_id).await?;
        tracing::debug!(scope = %self.scope, "Session identifier regenerated");

        self.id = new_id;
        self.cookie = CookieAction::Issue;
        Ok(())
    }

    fn reissue_after_destroy(&mut self) {
        if self.cookie == CookieAction::Expire {
            self.cookie = CookieAction::Issue;
        }
    }

    /// The `Set-Cookie` value this session will add to the response, if any
    pub fn set_cookie(&self) -> Option<String> {
        match self.cookie {
            CookieAction::None => None,
            CookieAction::Issue => Some(self.transport.issue(&self.scope, &self.id)),
            CookieAction::Expire => Some(self.transport.expire(&self.scope)),
        }
    }
}

impl<S> FromRequestParts<S> for Session
where
    AppContext: FromRef<S>,
    S: Send + Sync,
{
    type Rejection = SessionError;

    fn from_request_parts(
        parts: &mut Parts,
        state: &S,
    ) -> impl Future<Output = std::result::Result<Self, Self::Rejection>> + Send {
        let context = AppContext::from_ref(state);

        Box::pin(async move {
            let config = context.session_config();

            let Query(params) = Query::<HashMap<String, String>>::try_from_uri(&parts.uri)
                .map_err(|e| SessionError::bad_request(format!("Invalid query string: {}", e)))?;

            let scope = match params.get(&config.scope_param) {
                Some(name) => SessionScope::new(name.as_str())?,
                None => config.scope()?,
            };

            let presented = context.cookie_transport().read(&parts.headers, &scope);
            Session::resolve(&context, scope, presented)
        })
    }
}

impl IntoResponseParts for Session {
    type Error = SessionError;

    /// Errors when the cookie cannot be encoded as a header value
    fn into_response_parts(
        self,
        mut res: ResponseParts,
    ) -> std::result::Result<ResponseParts, Self::Error> {
        let value = match self.cookie {
            CookieAction::None => return Ok(res),
            CookieAction::Issue => self.transport.issue_header(&self.scope, &self.id)?,
            CookieAction::Expire => self.transport.expire_header(&self.scope)?,
        };

        res.headers_mut().append(header::SET_COOKIE, value);
        Ok(res)
    }
}
