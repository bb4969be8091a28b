//! Security subsystem.
//!
//! # Data Flow
//! ```text
//! Form input event:
//!     → sanitize.rs (strip markup, script schemes, event handlers)
//!     → integrity.rs (flag suspicious values, reject script-bearing payloads)
//!     → validate.rs + rut.rs (field formats, aggregate cliente validation)
//!
//! Login submission:
//!     → login.rs (pre-flight)
//!     → rate_limit.rs (sliding window per identifier)
//!
//! Mutating request:
//!     → csrf.rs (token issued per session, echoed back and verified)
//! ```
//!
//! # Design Decisions
//! - Pure functions everywhere except the limiter, which owns its map
//! - Validators report, they do not throw
//! - Fail closed: a denied login never reaches credential lookup

pub mod csrf;
pub mod integrity;
pub mod login;
pub mod rate_limit;
pub mod rut;
pub mod sanitize;
pub mod validate;

pub use csrf::{generate_csrf_token, verify_csrf_token};
pub use integrity::{check_data_integrity, detect_suspicious_input};
pub use login::{login_identifier, GuardError, LoginAttempt, LoginGuard, LoginMethod};
pub use rate_limit::{Clock, ManualClock, SlidingWindowLimiter, SystemClock};
pub use rut::{format_rut, validate_rut};
pub use sanitize::{escape_html, sanitize_input, sanitize_str};
pub use validate::{validate_cliente_data, validate_email, validate_phone, ValidationResult};
