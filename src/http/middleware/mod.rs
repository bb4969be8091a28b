//! Request middleware.

pub mod csrf;

pub use csrf::{csrf_middleware, CSRF_COOKIE, CSRF_HEADER};
