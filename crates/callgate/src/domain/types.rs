//! Request and response payloads shared by the RPC surface.

use crate::domain::error::GateError;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// The empty message. Serializes to `{}` on the wire.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Empty {}

/// Parameters for a statistics subscription.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StatRequest {
    /// Aggregation window length in whole seconds.
    pub interval_seconds: u64,
}

impl StatRequest {
    /// Validated aggregation window.
    ///
    /// # Errors
    ///
    /// A zero interval is rejected up front; the aggregator timer
    /// cannot run with a zero period.
    pub fn window(&self) -> Result<Duration, GateError> {
        if self.interval_seconds == 0 {
            return Err(GateError::InvalidArgument(
                "interval_seconds must be at least 1".to_string(),
            ));
        }
        Ok(Duration::from_secs(self.interval_seconds))
    }
}
