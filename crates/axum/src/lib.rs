//! Expose [hrpc](https://docs.rs/hrpc) endpoints on an [Axum](https://docs.rs/axum/latest/axum/) HTTP server.
//!
//! ```rust
//! use hrpc::{Context, Payload, Reply};
//!
//! async fn echo(_: Context, Payload(value): Payload<serde_json::Value>) -> Reply<serde_json::Value> {
//!     Reply(value)
//! }
//!
//! let manager = hrpc::Manager::new(hrpc::json::config());
//! let app: axum::Router = axum::Router::new()
//!     .route("/echo", hrpc_axum::Endpoint::new(manager.handler(echo).unwrap()));
//! ```
#![warn(
    clippy::all,
    clippy::cargo,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::panic_in_result_fn,
    // missing_docs
)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::{any, MethodRouter},
};
use hrpc::{Context, Request, ResponseSink};

/// The body limit used when [`Endpoint::with_body_limit`] is not set, matching Axum's default.
pub const DEFAULT_BODY_LIMIT: usize = 2 * 1024 * 1024;

/// Construct a [`MethodRouter`] serving a single [`hrpc::Endpoint`].
///
/// The endpoint is mounted for every HTTP method, use
/// [`Config::with_method`](hrpc::Config::with_method) to restrict it.
#[derive(Debug, Clone)]
pub struct Endpoint {
    endpoint: hrpc::Endpoint,
    body_limit: usize,
    timeout: Option<Duration>,
}

impl Endpoint {
    /// Construct a [`MethodRouter`] with the default options.
    pub fn new<S>(endpoint: hrpc::Endpoint) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        Self::builder(endpoint).build()
    }

    /// Construct a new [`Endpoint`] to configure before calling [`Endpoint::build`].
    ///
    /// ```rust
    /// # async fn ping() -> hrpc::Reply<&'static str> { hrpc::Reply("pong") }
    /// # let endpoint = hrpc::Manager::new(hrpc::json::config()).handler(ping).unwrap();
    /// let route: axum::routing::MethodRouter = hrpc_axum::Endpoint::builder(endpoint)
    ///     .with_body_limit(64 * 1024)
    ///     .with_timeout(std::time::Duration::from_secs(5))
    ///     .build();
    /// ```
    pub fn builder(endpoint: hrpc::Endpoint) -> Self {
        Self {
            endpoint,
            body_limit: DEFAULT_BODY_LIMIT,
            timeout: None,
        }
    }

    /// Reject request bodies larger than `limit` bytes with `413 Payload Too Large`.
    pub fn with_body_limit(self, limit: usize) -> Self {
        Self {
            body_limit: limit,
            ..self
        }
    }

    /// Attach a deadline of `timeout` from the start of the request to its [`Context`].
    ///
    /// The deadline is advisory, handlers observe it through [`Context::cancelled`].
    pub fn with_timeout(self, timeout: Duration) -> Self {
        Self {
            timeout: Some(timeout),
            ..self
        }
    }

    pub fn build<S>(self) -> MethodRouter<S>
    where
        S: Clone + Send + Sync + 'static,
    {
        any(move |req: axum::extract::Request| {
            let this = self.clone();
            async move { this.serve(req).await }
        })
    }

    /// Buffer the request body and dispatch it to the endpoint.
    ///
    /// A body that can't be read within the limit is answered with `413 Payload Too Large`
    /// without reaching the endpoint. The request's [`Context`] is cancelled once the endpoint
    /// has finished with it.
    pub async fn serve(&self, req: axum::extract::Request) -> Response {
        let (parts, body) = req.into_parts();
        let body = match to_bytes(body, self.body_limit).await {
            Ok(body) => body,
            Err(_err) => {
                #[cfg(feature = "tracing")]
                tracing::debug!(uri = %parts.uri, error = %_err, "error reading request body");

                return StatusCode::PAYLOAD_TOO_LARGE.into_response();
            }
        };

        let mut ctx = Context::new();
        if let Some(timeout) = self.timeout {
            ctx = ctx.with_timeout(timeout);
        }

        #[cfg(feature = "tracing")]
        tracing::trace!(method = %parts.method, uri = %parts.uri, "serving request");

        let sink = ResponseSink::new();
        self.endpoint
            .call(Request::from_parts(parts, body, ctx.clone()), sink.clone())
            .await;
        ctx.cancel();

        sink.take_response().map(Body::from)
    }
}
