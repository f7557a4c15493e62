//! Request metadata extraction.
//!
//! # Responsibilities
//! - Resolve the client address recorded for a request
//!
//! # Design Decisions
//! - The peer socket address is authoritative by default
//! - `X-Forwarded-For` is honoured only when explicitly trusted

use std::net::SocketAddr;

use axum::http::HeaderMap;

pub const X_FORWARDED_FOR: &str = "x-forwarded-for";

/// Address to record as `client_ip`.
///
/// Falls back to the peer IP when forwarding headers are untrusted, absent
/// or empty.
pub fn client_ip(headers: &HeaderMap, peer: SocketAddr, trust_forwarded_for: bool) -> String {
    if trust_forwarded_for {
        let forwarded = headers
            .get(X_FORWARDED_FOR)
            .and_then(|v| v.to_str().ok())
            .and_then(|v| v.split(',').next())
            .map(str::trim)
            .filter(|v| !v.is_empty());

        if let Some(ip) = forwarded {
            return ip.to_string();
        }
    }

    peer.ip().to_string()
}
