//! # Domain Layer
//!
//! Pure types and policy with no I/O: the method registry, the access
//! policy, configuration, payloads, and the service error. Everything
//! here is constructed once at startup and shared read-only.

pub mod acl;
pub mod config;
pub mod error;
pub mod methods;
pub mod types;

pub use acl::AccessPolicy;
pub use config::{ConfigError, GateConfig};
pub use error::{GateError, WireError};
pub use methods::{find_method, split_full_method, CallKind, MethodSpec};
pub use types::{Empty, StatRequest};
