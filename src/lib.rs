//! Security utilities for the nutritionist practice dashboard.
//!
//! Input sanitization, field and patient-payload validation, CSRF tokens,
//! sliding-window login rate limiting and idle-session timeouts, plus a
//! small HTTP service exposing them.

pub mod admin;
pub mod config;
pub mod http;
pub mod lifecycle;
pub mod observability;
pub mod security;
pub mod session;

pub use config::GuardConfig;
pub use http::GuardServer;
pub use lifecycle::Shutdown;
