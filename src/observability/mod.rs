//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! forwarders and error writer produce:
//!     → logging.rs (structured log events via `tracing`)
//!     → metrics.rs (counters)
//!
//! Consumers:
//!     → stdout (tracing-subscriber fmt layer)
//!     → Metrics endpoint (Prometheus scrape)
//! ```
//!
//! # Design Decisions
//! - Request ID is carried on every log event emitted by the forwarders
//! - Metrics are cheap (atomic increments); recording without an installed
//!   recorder is a no-op, so library users and tests pay nothing

pub mod logging;
pub mod metrics;

pub use self::logging::init_logging;
pub use self::metrics::init_metrics;
