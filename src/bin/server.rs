//! HTTP front end for the session store
//!
//! Exposes `/set`, `/getall`, `/get`, `/delete`, `/destroy`, `/regenerate`
//! and `/health`. Configuration comes from `SESSIONKIT_*` environment
//! variables; see [`sessionkit::ConfigBuilder::from_env`].

use anyhow::Context;
use sessionkit::{App, AppContext, ConfigBuilder, SessionRoutes, build_store};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let config = ConfigBuilder::new()
        .from_env()
        .build()
        .context("invalid configuration")?;

    sessionkit::init_tracing_with_config(&config);

    tracing::info!(
        backend = ?config.session.backend,
        default_scope = %config.session.default_scope,
        "Starting sessionkit server"
    );

    let store = build_store(&config.session)
        .await
        .context("failed to open session store")?;

    let context = AppContext::builder()
        .with_sessions(store)
        .with_session_config(config.session.clone())
        .build();

    App::with_config(config)
        .with_context(context)
        .register_module(SessionRoutes::new())
        .serve()
        .await
        .context("server error")?;

    Ok(())
}
