//! Telemetry stage: publishes one event per identified call to the
//! admin bus, then continues the chain. Runs inside authorization, so
//! denied calls are never published.

use crate::interceptor::{BoxHandler, CallContext, HandlerFuture, Interceptor};
use callgate_bus::{CallEvent, EventBus};
use std::sync::Arc;
use tracing::debug;

pub struct TelemetryStage {
    bus: Arc<EventBus>,
    /// Address the server answers on, stamped into every event.
    host: String,
}

impl TelemetryStage {
    #[must_use]
    pub fn new(bus: Arc<EventBus>, host: impl Into<String>) -> Self {
        Self {
            bus,
            host: host.into(),
        }
    }
}

impl<Req, Resp> Interceptor<Req, Resp> for TelemetryStage
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    fn intercept(
        &self,
        cx: CallContext,
        req: Req,
        next: BoxHandler<Req, Resp>,
    ) -> HandlerFuture<Resp> {
        // Fire-and-forget: the call proceeds whether or not anyone is
        // listening, and even if the bus has already shut down.
        if let Some(consumer) = cx.consumer.as_deref() {
            let event = CallEvent::now(consumer, cx.method.full, self.host.as_str());
            if self.bus.publish(event).is_err() {
                debug!(method = cx.method.full, "event bus closed; call not published");
            }
        }
        next(cx, req)
    }
}
