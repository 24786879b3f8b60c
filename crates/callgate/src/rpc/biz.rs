//! Business service: three unary methods behind the full chain.
//!
//! The shipped implementation is a stub that acknowledges every call;
//! the [`BizService`] trait is the seam where real logic plugs in
//! without touching authorization or telemetry.

use crate::domain::error::GateError;
use crate::domain::methods;
use crate::domain::types::Empty;
use crate::interceptor::CallContext;
use crate::service::AppState;
use async_trait::async_trait;
use axum::extract::State;
use axum::http::HeaderMap;
use axum::Json;

/// Business logic behind the unary methods.
#[async_trait]
pub trait BizService: Send + Sync {
    async fn check(&self, cx: CallContext) -> Result<Empty, GateError>;
    async fn add(&self, cx: CallContext) -> Result<Empty, GateError>;
    async fn test(&self, cx: CallContext) -> Result<Empty, GateError>;
}

/// Stub business logic: acknowledges and does nothing.
pub struct NoopBiz;

#[async_trait]
impl BizService for NoopBiz {
    async fn check(&self, _cx: CallContext) -> Result<Empty, GateError> {
        Ok(Empty {})
    }

    async fn add(&self, _cx: CallContext) -> Result<Empty, GateError> {
        Ok(Empty {})
    }

    async fn test(&self, _cx: CallContext) -> Result<Empty, GateError> {
        Ok(Empty {})
    }
}

// Request bodies are deliberately not parsed: the methods carry no
// payload, and an empty body must be accepted.

pub async fn check(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Empty>, GateError> {
    let cx = CallContext::from_headers(&methods::BIZ_CHECK, &headers);
    let resp = (state.chains.check)(cx, Empty {}).await?;
    Ok(Json(resp))
}

pub async fn add(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Empty>, GateError> {
    let cx = CallContext::from_headers(&methods::BIZ_ADD, &headers);
    let resp = (state.chains.add)(cx, Empty {}).await?;
    Ok(Json(resp))
}

pub async fn test(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<Empty>, GateError> {
    let cx = CallContext::from_headers(&methods::BIZ_TEST, &headers);
    let resp = (state.chains.test)(cx, Empty {}).await?;
    Ok(Json(resp))
}
