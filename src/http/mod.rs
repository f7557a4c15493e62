//! HTTP protocol handling subsystem.
//!
//! # Data Flow
//! ```text
//! TCP connection
//!     → server.rs (Axum setup, middleware, /proxy handler)
//!     → request.rs (path, method, client address)
//!     → sink (one record, flushed)
//!     → 200 "OK" / 500 on sink failure
//! ```

pub mod request;
pub mod server;

pub use server::{AppState, SidecarServer, OK_BODY, PROXY_PATH};
