//! sessionkit - cookie-identified session storage over HTTP
//!
//! sessionkit is built on top of Axum and Tokio. Each client carries an
//! opaque identifier in a cookie named after the session scope (`web` by
//! default); the server keeps a flat string-to-string record per
//! identifier in a pluggable [`SessionStore`].
//!
//! # Features
//!
//! - **Sessions**: [`Session`] extractor that resolves or mints identifiers
//!   and emits `Set-Cookie: <scope>=<id>; path=/`
//! - **Stores**: in-memory, file-backed (shared across processes) and
//!   Redis (`redis` feature)
//! - **Scopes**: several independent sessions per client, picked with
//!   the `session_name` query parameter
//! - **Health Checks**: `/health` reports on the session store
//! - **Testing**: Alba-style HTTP testing utilities with a cookie jar
//!
//! # Quick Start
//!
//! ```rust,no_run
//! use sessionkit::{App, ConfigBuilder, SessionRoutes};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let config = ConfigBuilder::new().from_env().build()?;
//!     sessionkit::init_tracing_with_config(&config);
//!
//!     App::from_config(config)
//!         .await?
//!         .register_module(SessionRoutes::new())
//!         .serve()
//!         .await?;
//!     Ok(())
//! }
//! ```

mod app;
mod config;
mod core;
mod error;
pub mod health;
mod http;
mod middleware;
pub mod session;
pub mod testing;
pub mod traits;
mod utils;

// Re-exports for public API
pub use app::{AppContext, AppContextBuilder};
pub use config::{Config, ConfigBuilder, LoggingConfig, ServerConfig};
pub use core::{App, AppBuilder};
pub use error::{ErrorResponse, Result, SessionError};
pub use health::{ComponentHealth, HealthResponse, HealthStatus};
pub use http::{RouteModule, SessionRoutes, StatusResponse, ValueResponse};
pub use session::{
    CookieTransport, Session, SessionBackend, SessionConfig, SessionId, SessionScope, build_store,
};
pub use traits::session::{SessionRecord, SessionStore};

use tracing_subscriber::{EnvFilter, layer::SubscriberExt, util::SubscriberInitExt};

/// Initialize tracing/logging with sensible defaults
///
/// This should be called early in your application, typically in main()
/// before creating the App.
///
/// # Environment Variables
///
/// - `RUST_LOG`: Set log level (e.g., "info", "debug", "sessionkit=debug")
/// - `SESSIONKIT_LOG_JSON`: Set to "true" for JSON formatted logs
pub fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));

    let json_logs = utils::get_env_with_prefix("LOG_JSON")
        .and_then(|v| utils::parse_bool(&v))
        .unwrap_or(false);

    install_subscriber(env_filter, json_logs);
}

/// Initialize tracing from a loaded [`Config`]
///
/// `RUST_LOG` still wins over `config.logging.level` when it is set.
pub fn init_tracing_with_config(config: &Config) {
    let env_filter = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new(&config.logging.level));

    install_subscriber(env_filter, config.logging.json);
}

fn install_subscriber(env_filter: EnvFilter, json: bool) {
    // try_init so a second call (tests, embedding) is a no-op instead of a panic
    let result = if json {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer().json())
            .try_init()
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(tracing_subscriber::fmt::layer())
            .try_init()
    };

    if let Err(e) = result {
        tracing::debug!(error = %e, "Tracing subscriber already installed");
    }
}
