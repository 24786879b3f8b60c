//! # Statistics Aggregation
//!
//! One aggregator task per statistics subscriber. The task drains its
//! own bus subscription into an accumulating window and flushes a
//! snapshot to the subscriber's sink every interval.
//!
//! ```text
//! bus ──> subscription ──> [accumulate] ──tick──> sink ──> SSE stream
//! ```
//!
//! ## Rules
//!
//! - The first snapshot covers the first full window; nothing is sent
//!   at subscription time.
//! - A window with no calls still produces a snapshot: empty maps and
//!   a zero timestamp.
//! - The task ends cleanly when the bus shuts down, and with an error
//!   when the subscriber stopped reading.

use crate::domain::error::GateError;
use callgate_bus::{current_timestamp, CallEvent, Subscription};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::time::Duration;
use tokio::sync::mpsc;
use tokio::time::{interval_at, Instant};

/// Snapshot sink depth. Small on purpose: a stalled subscriber should
/// exert backpressure on its own aggregator, not hoard snapshots.
pub const STAT_SINK_CAPACITY: usize = 8;

/// Call counts accumulated over one window.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct WindowStats {
    /// Calls per full method name.
    pub by_method: HashMap<String, u64>,
    /// Calls per consumer identity.
    pub by_consumer: HashMap<String, u64>,
    /// Receipt time of the last event counted, zero for an empty window.
    pub timestamp: u64,
}

impl WindowStats {
    /// Count one call, stamping the window with the receipt time.
    pub fn record(&mut self, event: &CallEvent) {
        *self.by_method.entry(event.method.clone()).or_insert(0) += 1;
        *self.by_consumer.entry(event.consumer.clone()).or_insert(0) += 1;
        self.timestamp = current_timestamp();
    }

    /// True when no call was counted.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.by_method.is_empty()
    }
}

/// Drive one statistics subscription until its bus or sink goes away.
///
/// # Errors
///
/// Returns an error when the sink is closed, meaning the subscriber
/// stopped reading its snapshot stream.
pub async fn run(
    mut subscription: Subscription,
    window: Duration,
    sink: mpsc::Sender<WindowStats>,
) -> Result<(), GateError> {
    // Start the cadence one full window out; an immediate first tick
    // would flush an empty snapshot at subscription time.
    let mut ticker = interval_at(Instant::now() + window, window);
    let mut stats = WindowStats::default();

    loop {
        tokio::select! {
            event = subscription.recv() => match event {
                Some(event) => stats.record(&event),
                // Bus shut down; the stream is complete.
                None => return Ok(()),
            },
            _ = ticker.tick() => {
                let snapshot = std::mem::take(&mut stats);
                if sink.send(snapshot).await.is_err() {
                    return Err(GateError::Transport(
                        "statistics subscriber stopped reading".to_string(),
                    ));
                }
            }
        }
    }
}
