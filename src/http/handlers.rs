//! Session endpoints
//!
//! Thin handlers translating query parameters into session operations.
//! Every handler returns the [`Session`] alongside its body so identity
//! cookies reach the client.

use crate::app::AppContext;
use crate::error::{Result, SessionError};
use crate::http::response::{StatusResponse, ValueResponse};
use crate::http::routes::RouteModule;
use crate::session::Session;
use crate::traits::session::SessionRecord;
use axum::extract::Query;
use axum::extract::rejection::QueryRejection;
use axum::{Json, Router, routing::get};
use serde::Deserialize;

#[derive(Debug, Deserialize)]
pub struct SetParams {
    pub key: String,
    pub value: String,
}

#[derive(Debug, Deserialize)]
pub struct KeyParams {
    pub key: String,
}

fn query_params<T>(query: std::result::Result<Query<T>, QueryRejection>) -> Result<T> {
    query
        .map(|Query(params)| params)
        .map_err(|e| SessionError::bad_request(e.body_text()))
}

/// `GET /set?key=<k>&value=<v>`
pub async fn set(
    mut session: Session,
    query: std::result::Result<Query<SetParams>, QueryRejection>,
) -> Result<(Session, Json<StatusResponse>)> {
    let params = query_params(query)?;
    session.set(&params.key, &params.value).await?;
    tracing::debug!(scope = %session.scope(), key = %params.key, "Session value set");
    Ok((session, Json(StatusResponse::ok())))
}

/// `GET /getall`
pub async fn get_all(session: Session) -> Result<(Session, Json<SessionRecord>)> {
    let record = session.get_all().await?;
    Ok((session, Json(record)))
}

/// `GET /get?key=<k>`
pub async fn get_value(
    session: Session,
    query: std::result::Result<Query<KeyParams>, QueryRejection>,
) -> Result<(Session, Json<ValueResponse>)> {
    let params = query_params(query)?;
    let value = session.get(&params.key).await?;
    Ok((
        session,
        Json(ValueResponse {
            key: params.key,
            value,
        }),
    ))
}

/// `GET /delete?key=<k>`
pub async fn delete(
    mut session: Session,
    query: std::result::Result<Query<KeyParams>, QueryRejection>,
) -> Result<(Session, Json<StatusResponse>)> {
    let params = query_params(query)?;
    session.delete(&params.key).await?;
    Ok((session, Json(StatusResponse::ok())))
}

/// `GET /destroy`
pub async fn destroy(mut session: Session) -> Result<(Session, Json<StatusResponse>)> {
    session.destroy().await?;
    Ok((session, Json(StatusResponse::ok())))
}

/// `GET /regenerate`
pub async fn regenerate(mut session: Session) -> Result<(Session, Json<StatusResponse>)> {
    session.regenerate().await?;
    Ok((session, Json(StatusResponse::ok())))
}

/// Route module exposing the session endpoints
#[derive(Debug, Clone, Default)]
pub struct SessionRoutes {
    prefix: Option<String>,
}

impl SessionRoutes {
    pub fn new() -> Self {
        Self::default()
    }

    /// Mount the endpoints under `prefix` instead of the root
    pub fn with_prefix(prefix: impl Into<String>) -> Self {
        Self {
            prefix: Some(prefix.into()),
        }
    }
}

impl RouteModule for SessionRoutes {
    fn routes(&self) -> Router<AppContext> {
        Router::new()
            .route("/set", get(set))
            .route("/getall", get(get_all))
            .route("/get", get(get_value))
            .route("/delete", get(delete))
            .route("/destroy", get(destroy))
            .route("/regenerate", get(regenerate))
    }

    fn prefix(&self) -> Option<&str> {
        self.prefix.as_deref()
    }
}
