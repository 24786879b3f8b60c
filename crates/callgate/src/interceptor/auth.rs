//! Authorization stage: consults the access policy before anything
//! else runs. Sits outermost so denied calls touch no other stage.

use crate::domain::acl::AccessPolicy;
use crate::interceptor::{BoxHandler, CallContext, HandlerFuture, Interceptor};
use std::sync::Arc;

pub struct AuthStage {
    policy: Arc<AccessPolicy>,
}

impl AuthStage {
    #[must_use]
    pub fn new(policy: Arc<AccessPolicy>) -> Self {
        Self { policy }
    }
}

impl<Req, Resp> Interceptor<Req, Resp> for AuthStage
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
        match self
            .policy
            .authorize(cx.consumer.as_deref(), cx.method.full)
        {
            Ok(()) => next(cx, req),
            Err(err) => Box::pin(std::future::ready(Err(err))),
        }
    }
}
