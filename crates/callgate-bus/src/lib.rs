//! # Callgate Bus - Call-Telemetry Event Bus
//!
//! Fan-out broadcaster for per-call telemetry. The interceptor chain
//! publishes one [`CallEvent`] per authorized call; admin streams and the
//! statistics aggregator subscribe independently.
//!
//! ## Broker Ownership
//!
//! A single broker task owns the subscriber set. Registration and
//! publication are command sends on the broker's channel, so:
//!
//! - **No lock spans a delivery** - the set is never shared
//! - **`publish` never blocks** - it enqueues a command and returns
//! - **Order is publish order** - commands arrive FIFO at the broker
//!
//! ## Delivery
//!
//! ```text
//! ┌──────────────┐  publish()  ┌──────────────┐ try_send  ┌────────────┐
//! │ Interceptor  │ ──────────► │    Broker    │ ────────► │ [queue S1] │
//! │    chain     │  (command)  │  (owns set)  │ ────────► │ [queue S2] │
//! └──────────────┘             └──────────────┘ ────────► │ [queue SN] │
//!                                                         └────────────┘
//! ```
//!
//! Each subscriber has a private bounded queue. On overflow the event is
//! dropped for that subscriber only (a counter records it); a subscriber
//! whose receiving half was dropped is removed at the next delivery
//! attempt. A slow admin stream therefore never stalls the serving path.
//!
//! There is no backfill: a subscriber only observes events published
//! after its registration completed.

// Nursery lints that are too strict
#![allow(clippy::missing_const_for_fn)]
// Allow in tests
#![cfg_attr(test, allow(clippy::unwrap_used))]
#![cfg_attr(test, allow(clippy::expect_used))]
#![cfg_attr(test, allow(clippy::panic))]

pub mod broker;
pub mod events;
pub mod subscriber;

// Re-export main types
pub use broker::{BusError, EventBus};
pub use events::{current_timestamp, CallEvent};
pub use subscriber::Subscription;

/// Events each subscriber may buffer before deliveries are dropped for it.
pub const DEFAULT_SUBSCRIBER_CAPACITY: usize = 256;
