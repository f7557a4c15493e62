//! Structured record sink subsystem.
//!
//! # Data Flow
//! ```text
//! proxy handler
//!     → record.rs (LogRecord, fixed field set)
//!     → LogSink::append (blocking)
//!     → rotating.rs (lock → check size → rotate? → write → flush → sync)
//!     → app.log, app.log.1 .. app.log.N
//! ```
//!
//! # Design Decisions
//! - Sink is an explicit instance injected into the handler, never a global
//! - One record is one line; a line is never split across files
//! - `append` returns only after the record reached the file

pub mod record;
pub mod rotating;

use std::path::PathBuf;

pub use record::{Level, LogRecord};
pub use rotating::{RotatingFileSink, RotationPolicy};

/// Errors produced while persisting a record.
#[derive(Debug, thiserror::Error)]
pub enum SinkError {
    #[error("I/O error on {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to serialize record: {0}")]
    Serialize(#[from] serde_json::Error),

    #[error("sink lock poisoned")]
    Poisoned,
}

impl SinkError {
    pub(crate) fn io(path: impl Into<PathBuf>, source: std::io::Error) -> Self {
        SinkError::Io {
            path: path.into(),
            source,
        }
    }
}

/// Destination for request records.
///
/// Implementations must serialize concurrent calls so that records never
/// interleave, and must not return `Ok` before the record is flushed.
pub trait LogSink: Send + Sync {
    fn append(&self, record: &LogRecord) -> Result<(), SinkError>;
}
