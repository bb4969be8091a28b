//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! security/ and session/ produce:
//!     → logging.rs (structured tracing events)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (fmt subscriber)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Identifiers are logged, field values never are
//! - Metric calls are no-ops until a recorder is installed

pub mod logging;
pub mod metrics;
