//! Trait definitions for extensible components
//!
//! Implement [`session::SessionStore`] to plug a custom persistence layer
//! into the session handling.

pub mod session;
