//! Testing utilities for sessionkit applications
//!
//! This module provides:
//! - Alba-style HTTP endpoint testing without running a server
//! - A cookie-keeping [`TestClient`] for multi-request session flows
//!
//! # Example
//!
//! ```rust,ignore
//! use sessionkit::testing::TestClient;
//!
//! #[tokio::test]
//! async fn test_round_trip() {
//!     let mut client = TestClient::new(build_router());
//!
//!     client.get("/set?key=a&value=b").await.assert_ok();
//!     let body: serde_json::Value = client.get("/getall").await.json().await;
//!     assert_eq!(body["a"], "b");
//! }
//! ```

mod client;
mod scenario;

pub use client::TestClient;
pub use scenario::{Scenario, ScenarioAssert, get};
