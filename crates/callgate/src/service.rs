//! # Service Assembly
//!
//! Wires the pieces into a running server: one interceptor chain per
//! method, the router, the event bus, and the lifecycle handle.
//!
//! ```text
//! GateService::start
//!   ├── bind listener (port 0 supported)
//!   ├── spawn event bus broker
//!   ├── build chains: [auth, telemetry] around each terminal
//!   └── serve until GateHandle::shutdown, then drain and close the bus
//! ```
//!
//! ## Rules
//!
//! - The policy is parsed in the constructor; a malformed ACL never
//!   reaches `start`.
//! - Shutting down closes the bus, which ends every open admin stream;
//!   graceful drain therefore terminates even with live subscribers.
//! - `/healthz` bypasses the chains and is never counted.

use crate::domain::acl::AccessPolicy;
use crate::domain::config::GateConfig;
use crate::domain::error::GateError;
use crate::domain::methods;
use crate::domain::types::{Empty, StatRequest};
use crate::interceptor::{compose, AuthStage, BoxHandler, Interceptor, TelemetryStage};
use crate::rpc::{self, BizService, NoopBiz};
use crate::stats::{self, WindowStats, STAT_SINK_CAPACITY};
use axum::response::{IntoResponse, Response};
use axum::routing::{get, post};
use axum::{Json, Router};
use callgate_bus::{EventBus, Subscription};
use std::any::Any;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;
use tokio::net::TcpListener;
use tokio::sync::{mpsc, watch};
use tokio::task::JoinHandle;
use tower::ServiceBuilder;
use tower_http::catch_panic::CatchPanicLayer;
use tracing::{debug, error, info};

/// One composed chain per method, fixed at startup.
pub struct Chains {
    pub check: BoxHandler<Empty, Empty>,
    pub add: BoxHandler<Empty, Empty>,
    pub test: BoxHandler<Empty, Empty>,
    pub logging: BoxHandler<Empty, Subscription>,
    pub statistics: BoxHandler<StatRequest, mpsc::Receiver<WindowStats>>,
}

/// Shared router state.
#[derive(Clone)]
pub struct AppState {
    pub chains: Arc<Chains>,
    pub keep_alive: Duration,
}

/// A configured, not-yet-started server.
pub struct GateService {
    config: GateConfig,
    policy: Arc<AccessPolicy>,
    biz: Arc<dyn BizService>,
}

impl GateService {
    /// Build a server with the stub business logic.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or a malformed ACL document.
    pub fn new(config: GateConfig) -> Result<Self, GateError> {
        Self::with_biz(config, Arc::new(NoopBiz))
    }

    /// Build a server around the given business logic.
    ///
    /// # Errors
    ///
    /// Fails on invalid configuration or a malformed ACL document.
    pub fn with_biz(config: GateConfig, biz: Arc<dyn BizService>) -> Result<Self, GateError> {
        config.validate()?;
        let policy = Arc::new(AccessPolicy::from_json(&config.acl)?);
        Ok(Self {
            config,
            policy,
            biz,
        })
    }

    /// Bind and start serving.
    ///
    /// Returns once the listener is accepting, with a handle for the
    /// actual bound address and for stopping the server.
    ///
    /// # Errors
    ///
    /// Fails when the listen address cannot be bound.
    pub async fn start(self) -> Result<GateHandle, GateError> {
        let listener = TcpListener::bind(self.config.listen_addr.as_str())
            .await
            .map_err(|e| GateError::Transport(format!("bind {}: {e}", self.config.listen_addr)))?;
        let local_addr = listener
            .local_addr()
            .map_err(|e| GateError::Transport(e.to_string()))?;

        let bus = Arc::new(EventBus::with_capacity(self.config.subscriber_capacity));
        let chains = Arc::new(build_chains(
            Arc::clone(&self.policy),
            Arc::clone(&bus),
            local_addr.to_string(),
            Arc::clone(&self.biz),
        ));
        let state = AppState {
            chains,
            keep_alive: self.config.sse_keep_alive(),
        };
        let router = build_router(state);

        let (shutdown_tx, mut shutdown_rx) = watch::channel(false);
        let signal = async move {
            // Resolves on an explicit stop, or when the handle is
            // dropped and the sender goes with it.
            let _ = shutdown_rx.wait_for(|stop| *stop).await;
            // Closing the bus ends every open admin stream, so the
            // graceful drain below cannot hang on a live subscriber.
            bus.shutdown();
        };

        info!(
            addr = %local_addr,
            consumers = self.policy.consumer_count(),
            "callgate listening"
        );
        let task = tokio::spawn(async move {
            axum::serve(listener, router)
                .with_graceful_shutdown(signal)
                .await
                .map_err(|e| GateError::Transport(e.to_string()))
        });

        Ok(GateHandle {
            local_addr,
            shutdown: shutdown_tx,
            task,
        })
    }
}

/// Handle to a running server.
pub struct GateHandle {
    local_addr: SocketAddr,
    shutdown: watch::Sender<bool>,
    task: JoinHandle<Result<(), GateError>>,
}

impl GateHandle {
    /// The address actually bound, with the real port when the
    /// configuration asked for port 0.
    #[must_use]
    pub fn local_addr(&self) -> SocketAddr {
        self.local_addr
    }

    /// Begin a graceful shutdown. Idempotent.
    pub fn shutdown(&self) {
        let _ = self.shutdown.send(true);
    }

    /// Wait for the server to finish draining.
    ///
    /// # Errors
    ///
    /// Propagates a transport failure from the serve loop, or an
    /// internal error if the server task panicked.
    pub async fn stopped(self) -> Result<(), GateError> {
        self.task
            .await
            .map_err(|e| GateError::Internal(format!("server task failed: {e}")))?
    }

    /// Shut down and wait for the drain to complete.
    ///
    /// # Errors
    ///
    /// Same conditions as [`GateHandle::stopped`].
    pub async fn stop(self) -> Result<(), GateError> {
        self.shutdown();
        self.stopped().await
    }
}

/// The stage list shared by every method: authorization first, then
/// telemetry, so denied calls are never published.
fn stages<Req, Resp>(
    policy: &Arc<AccessPolicy>,
    bus: &Arc<EventBus>,
    host: &str,
) -> Vec<Arc<dyn Interceptor<Req, Resp>>>
where
    Req: Send + 'static,
    Resp: Send + 'static,
{
    vec![
        Arc::new(AuthStage::new(Arc::clone(policy))),
        Arc::new(TelemetryStage::new(Arc::clone(bus), host)),
    ]
}

fn build_chains(
    policy: Arc<AccessPolicy>,
    bus: Arc<EventBus>,
    host: String,
    biz: Arc<dyn BizService>,
) -> Chains {
    let check: BoxHandler<Empty, Empty> = {
        let biz = Arc::clone(&biz);
        compose(
            stages(&policy, &bus, &host),
            Arc::new(move |cx, _req| {
                let biz = Arc::clone(&biz);
                Box::pin(async move { biz.check(cx).await })
            }),
        )
    };

    let add: BoxHandler<Empty, Empty> = {
        let biz = Arc::clone(&biz);
        compose(
            stages(&policy, &bus, &host),
            Arc::new(move |cx, _req| {
                let biz = Arc::clone(&biz);
                Box::pin(async move { biz.add(cx).await })
            }),
        )
    };

    let test: BoxHandler<Empty, Empty> = {
        let biz = Arc::clone(&biz);
        compose(
            stages(&policy, &bus, &host),
            Arc::new(move |cx, _req| {
                let biz = Arc::clone(&biz);
                Box::pin(async move { biz.test(cx).await })
            }),
        )
    };

    let logging: BoxHandler<Empty, Subscription> = {
        let bus_for_terminal = Arc::clone(&bus);
        compose(
            stages(&policy, &bus, &host),
            Arc::new(move |cx, _req| {
                let bus = Arc::clone(&bus_for_terminal);
                Box::pin(async move {
                    let subscription =
                        bus.subscribe().await.map_err(|_| GateError::ShuttingDown)?;
                    debug!(
                        consumer = ?cx.consumer,
                        subscriber = subscription.id(),
                        "call log subscriber attached"
                    );
                    Ok(subscription)
                })
            }),
        )
    };

    let statistics: BoxHandler<StatRequest, mpsc::Receiver<WindowStats>> = {
        let bus_for_terminal = Arc::clone(&bus);
        compose(
            stages(&policy, &bus, &host),
            Arc::new(move |cx, req: StatRequest| {
                let bus = Arc::clone(&bus_for_terminal);
                Box::pin(async move {
                    let window = req.window()?;
                    let subscription =
                        bus.subscribe().await.map_err(|_| GateError::ShuttingDown)?;
                    debug!(
                        consumer = ?cx.consumer,
                        subscriber = subscription.id(),
                        window_secs = req.interval_seconds,
                        "statistics subscriber attached"
                    );
                    let (tx, rx) = mpsc::channel(STAT_SINK_CAPACITY);
                    tokio::spawn(async move {
                        if let Err(err) = stats::run(subscription, window, tx).await {
                            debug!(error = %err, "statistics aggregator ended");
                        }
                    });
                    Ok(rx)
                })
            }),
        )
    };

    Chains {
        check,
        add,
        test,
        logging,
        statistics,
    }
}

fn build_router(state: AppState) -> Router {
    Router::new()
        .route(methods::BIZ_CHECK.full, post(rpc::biz::check))
        .route(methods::BIZ_ADD.full, post(rpc::biz::add))
        .route(methods::BIZ_TEST.full, post(rpc::biz::test))
        .route(methods::ADMIN_LOGGING.full, get(rpc::admin::logging))
        .route(methods::ADMIN_STATISTICS.full, get(rpc::admin::statistics))
        .route("/healthz", get(health))
        .layer(ServiceBuilder::new().layer(CatchPanicLayer::custom(recover_panic)))
        .with_state(state)
}

/// Liveness probe outside the chains: unauthenticated and uncounted.
async fn health() -> Json<serde_json::Value> {
    Json(serde_json::json!({ "status": "ok", "version": crate::VERSION }))
}

/// Turn a handler panic into an opaque 500. The panic payload goes to
/// the log, never onto the wire.
fn recover_panic(panic: Box<dyn Any + Send + 'static>) -> Response {
    let detail = if let Some(s) = panic.downcast_ref::<String>() {
        s.clone()
    } else if let Some(s) = panic.downcast_ref::<&str>() {
        (*s).to_string()
    } else {
        "panic of unknown type".to_string()
    };
    error!(detail = %detail, "handler panicked");
    GateError::Internal(detail).into_response()
}
