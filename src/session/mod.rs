//! Idle-session handling.
//!
//! # Data Flow
//! ```text
//! UI activity events ──▶ monitor.rs ──▶ timeout.rs (pure state machine)
//!                             │
//!                             ├──▶ SessionEvent::WarningDue ──▶ UI prompt
//!                             │         ◀── WarningDecision ───┘
//!                             └──▶ SessionEvent::Expired ──▶ logout
//! ```

pub mod monitor;
pub mod timeout;

pub use monitor::{ActivityKind, SessionHandle, SessionMonitor};
pub use timeout::{
    ExpiryReason, SessionEvent, SessionState, SessionTimeout, TimeoutPolicy, WarningDecision,
    MAX_TIMEOUT_MINUTES,
};
