//! Observability subsystem.
//!
//! # Data Flow
//! ```text
//! All subsystems produce:
//!     → logging.rs (diagnostic events on stderr)
//!     → metrics.rs (counters, histograms)
//!
//! Consumers:
//!     → Container log collection (stderr)
//!     → Metrics endpoint (Prometheus scrape, opt-in)
//! ```
//!
//! # Design Decisions
//! - Diagnostic logs are separate from the request records in the log file set
//! - Metrics are cheap (atomic increments)

pub mod logging;
pub mod metrics;
