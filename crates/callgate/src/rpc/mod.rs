//! # RPC Surface
//!
//! HTTP handlers for the two exposed services. Unary business methods
//! answer `POST /<service>/<method>`; admin methods answer `GET` and
//! stream server-sent events. Every handler builds a call context from
//! the request headers and hands off to its interceptor chain.

pub mod admin;
pub mod biz;

pub use biz::{BizService, NoopBiz};
