use crate::app::AppContext;
use axum::{
    Json,
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::{Deserialize, Serialize};

/// Health check status
#[non_exhaustive]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum HealthStatus {
    Healthy,
    Unhealthy,
}

/// Health check result for a single component
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ComponentHealth {
    pub name: String,
    pub status: HealthStatus,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

/// Overall health check response
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthResponse {
    pub status: HealthStatus,
    pub checks: Vec<ComponentHealth>,
}

impl IntoResponse for HealthResponse {
    fn into_response(self) -> Response {
        let status_code = match self.status {
            HealthStatus::Healthy => StatusCode::OK,
            HealthStatus::Unhealthy => StatusCode::SERVICE_UNAVAILABLE,
        };

        (status_code, Json(self)).into_response()
    }
}

/// Report on the session store held by `context`
pub fn check_sessions(context: &AppContext) -> ComponentHealth {
    match context.sessions_opt() {
        Some(store) if store.is_healthy() => ComponentHealth {
            name: store.name().to_string(),
            status: HealthStatus::Healthy,
            message: None,
        },
        Some(store) => ComponentHealth {
            name: store.name().to_string(),
            status: HealthStatus::Unhealthy,
            message: Some("Session store is not reachable".to_string()),
        },
        None => ComponentHealth {
            name: "sessions".to_string(),
            status: HealthStatus::Unhealthy,
            message: Some("Session store not configured".to_string()),
        },
    }
}

/// `GET /health`
pub async fn health_handler(State(context): State<AppContext>) -> HealthResponse {
    let checks = vec![check_sessions(&context)];
    let status = if checks.iter().all(|c| c.status == HealthStatus::Healthy) {
        HealthStatus::Healthy
    } else {
        tracing::warn!("Health check failed");
        HealthStatus::Unhealthy
    };

    HealthResponse { status, checks }
}
