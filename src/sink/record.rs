//! Request record schema.
//!
//! Key names are fixed for downstream log parsers:
//! `asctime, levelname, name, message, path, method, client_ip`.

use chrono::{DateTime, Local};
use serde::{Serialize, Serializer};

/// Message attached to every proxy call record.
pub const PROXY_CALL_MESSAGE: &str = "Proxy endpoint called";

/// Timestamp layout of the `asctime` field, e.g. `2025-03-01 14:02:07,351`.
const ASCTIME_FORMAT: &str = "%Y-%m-%d %H:%M:%S,%3f";

/// Record severity, rendered with the conventional upper-case names.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Level {
    Info,
}

/// A single structured entry in the log file set.
#[derive(Debug, Clone, Serialize)]
pub struct LogRecord {
    #[serde(rename = "asctime", serialize_with = "serialize_asctime")]
    timestamp: DateTime<Local>,
    #[serde(rename = "levelname")]
    level: Level,
    #[serde(rename = "name")]
    logger_name: String,
    message: String,
    path: String,
    method: String,
    client_ip: String,
}

impl LogRecord {
    /// Build the record emitted for one call of the proxy endpoint.
    pub fn proxy_call(
        logger_name: impl Into<String>,
        path: impl Into<String>,
        method: impl Into<String>,
        client_ip: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: Local::now(),
            level: Level::Info,
            logger_name: logger_name.into(),
            message: PROXY_CALL_MESSAGE.to_string(),
            path: path.into(),
            method: method.into(),
            client_ip: client_ip.into(),
        }
    }

    #[cfg(test)]
    fn with_timestamp(mut self, timestamp: DateTime<Local>) -> Self {
        self.timestamp = timestamp;
        self
    }

    /// Serialize as one JSON object terminated by `\n`.
    pub fn to_line(&self) -> Result<Vec<u8>, serde_json::Error> {
        let mut line = serde_json::to_vec(self)?;
        line.push(b'\n');
        Ok(line)
    }

    pub fn logger_name(&self) -> &str {
        &self.logger_name
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    pub fn method(&self) -> &str {
        &self.method
    }

    pub fn client_ip(&self) -> &str {
        &self.client_ip
    }
}

fn serialize_asctime<S>(timestamp: &DateTime<Local>, serializer: S) -> Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.collect_str(&timestamp.format(ASCTIME_FORMAT))
}
