use std::{error, fmt, sync::Arc};

use http::Method;
use serde::Serialize;

use crate::Role;

/// A type-erased error as returned by collaborators, validators and handlers.
pub type BoxError = Box<dyn error::Error + Send + Sync + 'static>;

/// A handler signature that can't be turned into an [`Endpoint`](crate::Endpoint).
///
/// These are programmer errors and are reported once when the handler is registered.
#[derive(thiserror::Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum ConfigError {
    #[error("duplicate input type: {role} bound at parameter {first} and parameter {second}")]
    DuplicateInput {
        role: Role,
        first: usize,
        second: usize,
    },
    #[error("duplicate output type: {role} returned at position {first} and position {second}")]
    DuplicateOutput {
        role: Role,
        first: usize,
        second: usize,
    },
    #[error("call options must be the final parameter but were found at parameter {position}")]
    MisplacedOptions { position: usize },
    #[error("{role} can't be used as a parameter")]
    OutputAsParam { role: Role },
    #[error("payload parameter {position} has no payload type")]
    MissingPayloadType { position: usize },
    #[error("{role} parameter {position} can't carry a payload type")]
    UnexpectedPayloadType { role: Role, position: usize },
}

/// The reason a single request failed. Handed to the error encoder exactly once.
#[derive(thiserror::Error, Debug)]
#[non_exhaustive]
pub enum RequestError {
    #[error("method {0} is not allowed")]
    MethodNotAllowed(Method),
    #[error("error decoding request: {0}")]
    Decode(#[source] BoxError),
    #[error("invalid request: {0}")]
    Validation(#[source] BoxError),
    #[error("{0}")]
    Handler(#[source] BoxError),
}

impl RequestError {
    /// The [`ErrorCode`] an encoder should report for this error.
    ///
    /// Handler errors are internal unless the handler returned an [`Error`] with its own code.
    pub fn code(&self) -> ErrorCode {
        match self {
            RequestError::MethodNotAllowed(_) => ErrorCode::MethodNotSupported,
            RequestError::Decode(_) | RequestError::Validation(_) => ErrorCode::BadRequest,
            RequestError::Handler(err) => err
                .downcast_ref::<Error>()
                .map(|err| err.code)
                .unwrap_or(ErrorCode::InternalServerError),
        }
    }
}

/// An error a handler can return to choose the status reported to the client.
#[derive(Clone, Debug, Serialize)]
pub struct Error {
    pub(crate) code: ErrorCode,
    pub(crate) message: String,
    #[serde(skip)]
    pub(crate) cause: Option<Arc<dyn error::Error + Send + Sync>>, // `Arc` so the error stays `Clone`
}

impl PartialEq for Error {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code && self.message == other.message
    }
}

impl Eq for Error {}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message)
    }
}

impl error::Error for Error {
    fn source(&self) -> Option<&(dyn error::Error + 'static)> {
        self.cause
            .as_ref()
            .map(|cause| &**cause as &(dyn error::Error + 'static))
    }
}

impl Error {
    pub fn new(code: ErrorCode, message: impl Into<String>) -> Self {
        Error {
            code,
            message: message.into(),
            cause: None,
        }
    }

    pub fn with_cause<E>(code: ErrorCode, message: impl Into<String>, cause: E) -> Self
    where
        E: error::Error + Send + Sync + 'static,
    {
        Self {
            code,
            message: message.into(),
            cause: Some(Arc::new(cause)),
        }
    }

    pub fn code(&self) -> ErrorCode {
        self.code
    }

    pub fn message(&self) -> &str {
        &self.message
    }
}

#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[non_exhaustive]
pub enum ErrorCode {
    BadRequest,
    Unauthorized,
    Forbidden,
    NotFound,
    Timeout,
    Conflict,
    PreconditionFailed,
    PayloadTooLarge,
    MethodNotSupported,
    ClientClosedRequest,
    InternalServerError,
}

impl ErrorCode {
    pub fn to_status_code(&self) -> u16 {
        match self {
            ErrorCode::BadRequest => 400,
            ErrorCode::Unauthorized => 401,
            ErrorCode::Forbidden => 403,
            ErrorCode::NotFound => 404,
            ErrorCode::Timeout => 408,
            ErrorCode::Conflict => 409,
            ErrorCode::PreconditionFailed => 412,
            ErrorCode::PayloadTooLarge => 413,
            ErrorCode::MethodNotSupported => 405,
            ErrorCode::ClientClosedRequest => 499,
            ErrorCode::InternalServerError => 500,
        }
    }
}
