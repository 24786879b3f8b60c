//! Cross-surface flows against a live server.

pub mod authorization;
pub mod logging_stream;
pub mod statistics_stream;
