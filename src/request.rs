use std::{fmt, sync::Arc};

use bytes::{Bytes, BytesMut};
use http::{
    header::{HeaderName, HeaderValue},
    request::Parts,
    Extensions, HeaderMap, Method, Response, StatusCode, Uri,
};
use parking_lot::Mutex;

use crate::Context;

struct RequestInner {
    parts: Parts,
    body: Bytes,
    ctx: Context,
}

/// A buffered HTTP request.
///
/// This is a cheap handle, cloning it does not copy the body.
#[derive(Clone)]
pub struct Request(Arc<RequestInner>);

impl fmt::Debug for Request {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Request")
            .field("method", &self.0.parts.method)
            .field("uri", &self.0.parts.uri)
            .field("body", &self.0.body.len())
            .finish()
    }
}

impl From<http::Request<Bytes>> for Request {
    fn from(req: http::Request<Bytes>) -> Self {
        let (parts, body) = req.into_parts();
        Self::from_parts(parts, body, Context::default())
    }
}

impl Request {
    pub fn from_parts(parts: Parts, body: Bytes, ctx: Context) -> Self {
        Self(Arc::new(RequestInner { parts, body, ctx }))
    }

    /// Replace the [`Context`] carried by this request.
    pub fn with_context(self, ctx: Context) -> Self {
        match Arc::try_unwrap(self.0) {
            Ok(inner) => Self::from_parts(inner.parts, inner.body, ctx),
            Err(shared) => {
                let mut parts = http::Request::new(()).into_parts().0;
                parts.method = shared.parts.method.clone();
                parts.uri = shared.parts.uri.clone();
                parts.version = shared.parts.version;
                parts.headers = shared.parts.headers.clone();
                parts.extensions = shared.parts.extensions.clone();
                Self::from_parts(parts, shared.body.clone(), ctx)
            }
        }
    }

    pub fn method(&self) -> &Method {
        &self.0.parts.method
    }

    pub fn uri(&self) -> &Uri {
        &self.0.parts.uri
    }

    pub fn headers(&self) -> &HeaderMap {
        &self.0.parts.headers
    }

    pub fn extensions(&self) -> &Extensions {
        &self.0.parts.extensions
    }

    pub fn body(&self) -> &Bytes {
        &self.0.body
    }

    pub fn context(&self) -> &Context {
        &self.0.ctx
    }
}

#[derive(Default)]
struct ResponseState {
    status: Option<StatusCode>,
    headers: HeaderMap,
    body: BytesMut,
}

/// Collects the response for a single request.
///
/// Encoders and handlers taking a [`ResponseSink`] parameter write into the same sink.
/// A sink is created per request and is never shared between requests.
#[derive(Clone, Default)]
pub struct ResponseSink(Arc<Mutex<ResponseState>>);

impl fmt::Debug for ResponseSink {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let state = self.0.lock();
        f.debug_struct("ResponseSink")
            .field("status", &state.status)
            .field("headers", &state.headers)
            .field("body", &state.body.len())
            .finish()
    }
}

impl ResponseSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_status(&self, status: StatusCode) {
        self.0.lock().status = Some(status);
    }

    /// The status set so far, `200 OK` if none was set.
    pub fn status(&self) -> StatusCode {
        self.0.lock().status.unwrap_or(StatusCode::OK)
    }

    pub fn insert_header(&self, name: HeaderName, value: HeaderValue) {
        self.0.lock().headers.insert(name, value);
    }

    pub fn header(&self, name: &HeaderName) -> Option<HeaderValue> {
        self.0.lock().headers.get(name).cloned()
    }

    pub fn write(&self, data: impl AsRef<[u8]>) {
        self.0.lock().body.extend_from_slice(data.as_ref());
    }

    /// `true` if anything set the status or wrote to the body.
    pub fn is_written(&self) -> bool {
        let state = self.0.lock();
        state.status.is_some() || !state.body.is_empty()
    }

    /// A copy of the body written so far.
    pub fn body(&self) -> Bytes {
        Bytes::copy_from_slice(&self.0.lock().body)
    }

    /// Take everything written so far as a response, leaving the sink empty.
    pub fn take_response(&self) -> Response<Bytes> {
        let state = std::mem::take(&mut *self.0.lock());
        let mut resp = Response::new(state.body.freeze());
        *resp.status_mut() = state.status.unwrap_or(StatusCode::OK);
        *resp.headers_mut() = state.headers;
        resp
    }
}
