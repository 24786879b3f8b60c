//! # Callgate Test Suite
//!
//! End-to-end tests that start a real server on an ephemeral port and
//! drive it over HTTP, server-sent event streams included.
//!
//! ## Structure
//!
//! ```text
//! tests/src/
//! ├── helpers.rs        # Server spawning and SSE stream reading
//! │
//! └── integration/      # One module per surface
//!     ├── authorization.rs
//!     ├── logging_stream.rs
//!     ├── statistics_stream.rs
//!     └── lifecycle.rs
//! ```
//!
//! ## Running Tests
//!
//! ```bash
//! # All tests
//! cargo test -p callgate-tests
//!
//! # By surface
//! cargo test -p callgate-tests integration::authorization::
//! cargo test -p callgate-tests integration::lifecycle::
//! ```

pub mod integration;
