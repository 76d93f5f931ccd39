use crate::{
    app::AppContext,
    config::Config,
    error::{Result, SessionError},
    health,
    http::RouteModule,
    middleware::MakeRequestUuid,
    session::build_store,
};
use axum::{Router, routing::get};
use std::time::Duration;
use tokio::signal;
use tower_http::request_id::{PropagateRequestIdLayer, SetRequestIdLayer};
use tower_http::trace::TraceLayer;

/// Main application structure for a sessionkit server
pub struct App {
    router: Router<AppContext>,
    config: Config,
    context: AppContext,
}

impl App {
    /// Creates a new App with default configuration
    pub fn new() -> Self {
        Self::with_config(Config::default())
    }

    /// Creates a new App with the provided configuration
    ///
    /// The context starts without a session store; attach one with
    /// [`App::with_context`] or use [`App::from_config`].
    pub fn with_config(config: Config) -> Self {
        let context = AppContext::builder()
            .with_session_config(config.session.clone())
            .build();

        Self {
            router: Router::<AppContext>::new(),
            config,
            context,
        }
    }

    /// Creates an App whose session store is built from `config.session`
    pub async fn from_config(config: Config) -> Result<Self> {
        let store = build_store(&config.session).await?;
        let context = AppContext::builder()
            .with_sessions(store)
            .with_session_config(config.session.clone())
            .build();

        Ok(Self::with_config(config).with_context(context))
    }

    /// Builder pattern for constructing an App
    pub fn builder() -> AppBuilder {
        AppBuilder::new()
    }

    /// Register a route module with the application
    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.router = module.register(self.router);
        self
    }

    /// Set the application context and mount `/health`
    pub fn with_context(mut self, context: AppContext) -> Self {
        self.context = context;
        self.router = self
            .router
            .route("/health", get(health::health_handler));
        self
    }

    /// Get the router for testing purposes
    ///
    /// The returned router has the context applied and can be driven with
    /// the helpers in [`crate::testing`].
    pub fn into_test_router(self) -> Router {
        self.router.with_state(self.context)
    }

    fn with_middleware(mut self) -> Self {
        // Request ID outermost so the trace span can record it
        self.router = self
            .router
            .layer(TraceLayer::new_for_http())
            .layer(PropagateRequestIdLayer::x_request_id())
            .layer(SetRequestIdLayer::x_request_id(MakeRequestUuid));
        self
    }

    /// Start the application server
    pub async fn serve(self) -> Result<()> {
        let addr = self.config.server.addr().map_err(|e| {
            SessionError::bad_request(format!("Invalid server address in config: {}", e))
        })?;

        let app = self.with_middleware();
        let listener = tokio::net::TcpListener::bind(addr)
            .await
            .map_err(|e| SessionError::internal(format!("Failed to bind {}: {}", addr, e)))?;

        tracing::info!("Server starting on http://{}", addr);
        tracing::info!("Health check available at http://{}/health", addr);
        if let Some(store) = app.context.sessions_opt() {
            tracing::info!(store = store.name(), "Session store ready");
        }

        let router = app.router.with_state(app.context);

        axum::serve(listener, router)
            .with_graceful_shutdown(shutdown_signal())
            .await
            .map_err(|e| SessionError::internal(format!("Server error: {}", e)))?;

        Ok(())
    }
}

impl Default for App {
    fn default() -> Self {
        Self::new()
    }
}

/// Builder for App with fluent API
#[must_use = "builder does nothing until you call build()"]
pub struct AppBuilder {
    config: Config,
    context: Option<AppContext>,
    modules: Vec<Router<AppContext>>,
}

impl AppBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
            context: None,
            modules: Vec::new(),
        }
    }

    pub fn with_config(mut self, config: Config) -> Self {
        self.config = config;
        self
    }

    pub fn with_context(mut self, context: AppContext) -> Self {
        self.context = Some(context);
        self
    }

    pub fn register_module<M: RouteModule>(mut self, module: M) -> Self {
        self.modules.push(module.register(Router::new()));
        self
    }

    pub fn build(self) -> App {
        let mut app = App::with_config(self.config);
        if let Some(context) = self.context {
            app = app.with_context(context);
        }

        for module_router in self.modules {
            app.router = app.router.merge(module_router);
        }

        app
    }
}

impl Default for AppBuilder {
    fn default() -> Self {
        Self::new()
    }
}

/// Graceful shutdown signal handler
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!(error = %e, "Failed to install Ctrl+C handler");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                tracing::error!(error = %e, "Failed to install terminate handler");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            tracing::info!("Received Ctrl+C signal, starting graceful shutdown");
        },
        _ = terminate => {
            tracing::info!("Received terminate signal, starting graceful shutdown");
        },
    }

    // Give in-flight session writes a moment to finish
    tokio::time::sleep(Duration::from_secs(1)).await;
    tracing::info!("Shutdown complete");
}
