//! Resilience testing subsystem.
//!
//! # Data Flow
//! ```text
//! Request → fault.rs (roll against configured rate)
//!     → hit:  sleep(delay) → failure status, no record
//!     → miss: continue to the record sink
//! ```
//!
//! # Design Decisions
//! - Fault injection is off unless explicitly enabled
//! - Injected failures are decided per request, independently

pub mod fault;

pub use fault::FaultInjector;
