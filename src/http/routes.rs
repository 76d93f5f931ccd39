use crate::app::AppContext;
use axum::Router;

/// Trait for composable route modules
///
/// Implement this trait to group routes and mount them into an [`App`](crate::App).
///
/// # Example
///
/// ```ignore
/// struct CartModule;
///
/// impl RouteModule for CartModule {
///     fn routes(&self) -> Router<AppContext> {
///         Router::new().route("/cart", get(show_cart))
///     }
/// }
/// ```
pub trait RouteModule {
    /// Returns a router with all routes for this module
    ///
    /// The router should NOT have state applied; the App applies
    /// `AppContext` when it serves.
    fn routes(&self) -> Router<AppContext>;

    /// Optional: specify a path prefix for all routes in this module
    fn prefix(&self) -> Option<&str> {
        None
    }

    /// Registers this module's routes into the application router
    fn register(self, router: Router<AppContext>) -> Router<AppContext>
    where
        Self: Sized,
    {
        let routes = self.routes();

        if let Some(prefix) = self.prefix() {
            router.nest(prefix, routes)
        } else {
            router.merge(routes)
        }
    }
}
