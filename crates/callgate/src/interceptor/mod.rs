//! # Interceptor Chain
//!
//! Cross-cutting stages composed around each call handler. A stage
//! receives the call context, the request, and the rest of the chain;
//! it decides whether and how to continue.
//!
//! ```text
//! compose([auth, telemetry], handler)
//!
//!   request ──> auth ──> telemetry ──> handler
//!                 │
//!                 └── deny: error returned, inner stages never run
//! ```
//!
//! ## Rules
//!
//! - Stages are generic over the request/response pair, so one chain
//!   definition serves unary and streaming methods alike.
//! - Composition folds right to left: the first stage in the list is
//!   the outermost wrapper.
//! - A stage short-circuits by returning an error instead of calling
//!   `next`.

pub mod auth;
pub mod telemetry;

pub use auth::AuthStage;
pub use telemetry::TelemetryStage;

use crate::domain::error::GateError;
use crate::domain::methods::MethodSpec;
use axum::http::HeaderMap;
use futures::future::BoxFuture;
use std::sync::Arc;
use tracing::debug;

/// Header carrying the caller identity.
pub const CONSUMER_HEADER: &str = "consumer";

/// Future returned by handlers and stages.
pub type HandlerFuture<Resp> = BoxFuture<'static, Result<Resp, GateError>>;

/// A callable chain tail: the terminal handler, or the rest of the
/// chain wrapped around it.
pub type BoxHandler<Req, Resp> =
    Arc<dyn Fn(CallContext, Req) -> HandlerFuture<Resp> + Send + Sync>;

/// Per-call context threaded through every stage.
#[derive(Debug, Clone)]
pub struct CallContext {
    /// Caller identity, if exactly one valid header was present.
    pub consumer: Option<String>,
    /// The method being invoked.
    pub method: &'static MethodSpec,
}

impl CallContext {
    #[must_use]
    pub fn new(consumer: Option<String>, method: &'static MethodSpec) -> Self {
        Self { consumer, method }
    }

    /// Build the context for an incoming request.
    ///
    /// The identity is taken from the `consumer` header. Zero values,
    /// more than one value, or a non-UTF-8 value all count as no
    /// identity; the access policy then denies the call.
    #[must_use]
    pub fn from_headers(method: &'static MethodSpec, headers: &HeaderMap) -> Self {
        Self::new(consumer_from_headers(headers), method)
    }
}

fn consumer_from_headers(headers: &HeaderMap) -> Option<String> {
    let mut values = headers.get_all(CONSUMER_HEADER).iter();
    let first = values.next()?;
    if values.next().is_some() {
        debug!("multiple consumer headers on one call");
        return None;
    }
    first.to_str().ok().map(str::to_string)
}

/// One stage of the chain.
pub trait Interceptor<Req, Resp>: Send + Sync {
    /// Handle the call, invoking `next` to continue down the chain.
    fn intercept(&self, cx: CallContext, req: Req, next: BoxHandler<Req, Resp>)
        -> HandlerFuture<Resp>;
}

/// Wrap `terminal` in `stages`, first stage outermost.
#[must_use]
pub fn compose<Req, Resp>(
    stages: Vec<Arc<dyn Interceptor<Req, Resp>>>,
    terminal: BoxHandler<Req, Resp>,
) -> BoxHandler<Req, Resp>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    stages
        .into_iter()
        .rev()
        .fold(terminal, |next, stage| -> BoxHandler<Req, Resp> {
            Arc::new(move |cx, req| stage.intercept(cx, req, Arc::clone(&next)))
        })
}
