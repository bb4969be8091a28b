//! HTTP surface of the guard.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, layers: trace, request id, timeout, body limit)
//!     → middleware/csrf.rs (mutating cliente routes only)
//!     → handlers.rs (sanitize / validate / rate-limit via security/)
//!     → JSON response
//! ```

pub mod handlers;
pub mod middleware;
pub mod request;
pub mod server;

pub use request::X_REQUEST_ID;
pub use server::{AppState, GuardServer};
