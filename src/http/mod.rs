//! HTTP endpoints and response types.
//!
//! Provides the session route module and the RouteModule trait for
//! organizing routes.

pub mod handlers;
pub mod response;
pub mod routes;

pub use handlers::SessionRoutes;
pub use response::{StatusResponse, ValueResponse};
pub use routes::RouteModule;
