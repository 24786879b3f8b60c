//! Admin service: server-streamed observability over SSE.
//!
//! `Logging` relays the live call log; `Statistics` streams one
//! aggregated snapshot per interval. Both go through the same chain as
//! business calls, so admin access is governed by the same policy and
//! admin calls show up in the call log themselves.

use crate::domain::error::GateError;
use crate::domain::methods;
use crate::domain::types::{Empty, StatRequest};
use crate::interceptor::CallContext;
use crate::service::AppState;
use axum::extract::{Query, State};
use axum::http::HeaderMap;
use axum::response::sse::{Event, KeepAlive, Sse};
use futures::{Stream, StreamExt};
use serde::Deserialize;
use std::time::Duration;
use tokio_stream::wrappers::ReceiverStream;

#[derive(Debug, Deserialize)]
pub struct StatQuery {
    interval_seconds: u64,
}

pub async fn logging(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, GateError> {
    let cx = CallContext::from_headers(&methods::ADMIN_LOGGING, &headers);
    let subscription = (state.chains.logging)(cx, Empty {}).await?;

    let stream = subscription
        .into_stream()
        .map(|call| Event::default().event("call").json_data(&call));
    Ok(sse_response(stream, state.keep_alive))
}

pub async fn statistics(
    State(state): State<AppState>,
    query: Option<Query<StatQuery>>,
    headers: HeaderMap,
) -> Result<Sse<impl Stream<Item = Result<Event, axum::Error>>>, GateError> {
    // A missing or unparseable query never reaches the chain; there is
    // no subscription to clean up.
    let Some(Query(query)) = query else {
        return Err(GateError::InvalidArgument(
            "interval_seconds query parameter is required".to_string(),
        ));
    };

    let cx = CallContext::from_headers(&methods::ADMIN_STATISTICS, &headers);
    let request = StatRequest {
        interval_seconds: query.interval_seconds,
    };
    let snapshots = (state.chains.statistics)(cx, request).await?;

    let stream =
        ReceiverStream::new(snapshots).map(|stat| Event::default().event("stat").json_data(&stat));
    Ok(sse_response(stream, state.keep_alive))
}

fn sse_response<S>(stream: S, keep_alive: Duration) -> Sse<S>
where
    S: Stream<Item = Result<Event, axum::Error>> + Send + 'static,
{
    Sse::new(stream).keep_alive(KeepAlive::new().interval(keep_alive).text("keep-alive"))
}
