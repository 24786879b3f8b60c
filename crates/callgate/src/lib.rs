//! # Callgate
//!
//! The cross-cutting control plane of an RPC microservice: request
//! authorization, per-call telemetry, live admin streams, and graceful
//! lifecycle, wrapped around interchangeable business logic.
//!
//! ```text
//! POST /callgate.Biz/<Method>
//!   └─> auth ──> telemetry ──> biz ──> {} ack
//!                    │ publish
//!                    ▼
//!               event bus ──> call log SSE      GET /callgate.Admin/Logging
//!                (broker) ──> aggregator ──> stats SSE
//!                                               GET /callgate.Admin/Statistics
//! ```
//!
//! Consumers identify themselves with the `consumer` header; the ACL
//! decides per method. Denied calls never reach telemetry, so the admin
//! streams only ever see calls that were allowed.

#![warn(clippy::all)]
#![deny(unsafe_code)]

pub mod domain;
pub mod interceptor;
pub mod rpc;
pub mod service;
pub mod stats;

pub use domain::{AccessPolicy, ConfigError, GateConfig, GateError, WireError};
pub use rpc::{BizService, NoopBiz};
pub use service::{AppState, GateHandle, GateService};
pub use stats::WindowStats;

/// Crate version, reported by the health probe.
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
