//! # Call Events
//!
//! Defines the telemetry event that flows through the bus, one per
//! intercepted call.

use serde::{Deserialize, Serialize};
use std::time::{SystemTime, UNIX_EPOCH};

/// A single intercepted call, as observed by the admin plane.
///
/// Produced once per authorized call, before the business handler runs.
/// Denied calls never produce an event, so admin consumers only ever see
/// traffic that passed authorization.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CallEvent {
    /// Seconds since the Unix epoch at interception time.
    pub timestamp: u64,

    /// Caller identity, taken from the `consumer` request metadata.
    pub consumer: String,

    /// Fully-qualified method name, e.g. `/callgate.Biz/Check`.
    pub method: String,

    /// The address the service is bound to (events carry their origin).
    pub host: String,
}

impl CallEvent {
    /// Build an event stamped with the current wall-clock time.
    #[must_use]
    pub fn now(
        consumer: impl Into<String>,
        method: impl Into<String>,
        host: impl Into<String>,
    ) -> Self {
        Self {
            timestamp: current_timestamp(),
            consumer: consumer.into(),
            method: method.into(),
            host: host.into(),
        }
    }
}

/// Get current timestamp in seconds since Unix epoch.
#[must_use]
pub fn current_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
