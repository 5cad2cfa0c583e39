use std::{fmt, sync::Arc};

use bytes::Bytes;
use futures::future::BoxFuture;
use http::Response;

use crate::{
    manager::Shared, BindCx, BindingPlan, Handler, Outputs, Request, RequestError, ResponseSink,
    Role,
};

type DispatchFn = dyn Fn(Request, ResponseSink) -> BoxFuture<'static, ()> + Send + Sync;

/// A registered handler, ready to serve requests.
///
/// An [`Endpoint`] is built by [`Manager::handler`](crate::Manager::handler) and is cheap to clone.
/// Every request is dispatched independently, the only state shared between them is the
/// read-only [`BindingPlan`] and the [`Manager`](crate::Manager)'s collaborators.
#[derive(Clone)]
pub struct Endpoint {
    plan: Arc<BindingPlan>,
    dispatch: Arc<DispatchFn>,
}

impl fmt::Debug for Endpoint {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Endpoint")
            .field("plan", &self.plan)
            .field("dispatch", &"...")
            .finish()
    }
}

impl Endpoint {
    pub(crate) fn new<M, H>(handler: H, plan: BindingPlan, shared: Arc<Shared>) -> Self
    where
        M: 'static,
        H: Handler<M>,
    {
        let plan = Arc::new(plan);

        Self {
            plan: plan.clone(),
            dispatch: Arc::new(
                move |request: Request, sink: ResponseSink| -> BoxFuture<'static, ()> {
                    let plan = plan.clone();
                    let shared = shared.clone();
                    let handler = handler.clone();
                    Box::pin(async move {
                        dispatch::<M, H>(&plan, &shared, &handler, request, sink).await
                    })
                },
            ),
        }
    }

    pub fn plan(&self) -> &BindingPlan {
        &self.plan
    }

    /// Dispatch a single request.
    ///
    /// Everything the request produces is written to `sink`, either by the handler itself or
    /// by one of the encoders.
    pub fn call(&self, request: Request, sink: ResponseSink) -> BoxFuture<'static, ()> {
        (self.dispatch)(request, sink)
    }

    /// Dispatch a single request and collect what it wrote into a response.
    pub async fn serve(&self, request: impl Into<Request>) -> Response<Bytes> {
        let sink = ResponseSink::new();
        self.call(request.into(), sink.clone()).await;
        sink.take_response()
    }
}

async fn dispatch<M, H: Handler<M>>(
    plan: &BindingPlan,
    shared: &Shared,
    handler: &H,
    request: Request,
    sink: ResponseSink,
) {
    if let Some(method) = &shared.method {
        if request.method() != method {
            let err = RequestError::MethodNotAllowed(request.method().clone());
            (shared.error_encoder)(&sink, &request, &err);
            return;
        }
    }

    let bound = handler.call(&mut BindCx {
        request: &request,
        sink: &sink,
        decoder: &*shared.decoder,
        validate: plan.validates(),
    });
    let fut = match bound {
        Ok(fut) => fut,
        Err(err) => {
            (shared.error_encoder)(&sink, &request, &err);
            return;
        }
    };

    let returned = fut.await.split();

    if plan.out_slot_of(Role::ErrorOut).is_some() {
        if let Some(err) = returned.error {
            #[cfg(feature = "tracing")]
            tracing::debug!(uri = %request.uri(), error = %err, "handler returned an error");

            (shared.error_encoder)(&sink, &request, &RequestError::Handler(err));
            return;
        }
    }

    // Without a result the handler is expected to have written the response itself.
    if plan.out_slot_of(Role::PayloadOut).is_some() {
        if let Some(payload) = returned.payload {
            (shared.encoder)(&sink, &request, &payload);
        }
    }
}
