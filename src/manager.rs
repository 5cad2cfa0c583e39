#[cfg(feature = "tracing")]
use std::any::type_name;
use std::{fmt, sync::Arc};

use http::Method;

use crate::{
    classify, param::DecodeFn, BoxError, ConfigError, Destination, Endpoint, Handler, ReplyValue,
    Request, RequestError, ResponseSink,
};

pub(crate) type EncodeFn = dyn Fn(&ResponseSink, &Request, &ReplyValue) + Send + Sync;
pub(crate) type EncodeErrorFn = dyn Fn(&ResponseSink, &Request, &RequestError) + Send + Sync;

/// The collaborators shared by every [`Endpoint`] of a [`Manager`].
pub(crate) struct Shared {
    pub(crate) decoder: Arc<DecodeFn>,
    pub(crate) encoder: Arc<EncodeFn>,
    pub(crate) error_encoder: Arc<EncodeErrorFn>,
    pub(crate) method: Option<Method>,
}

fn decode_nothing(_: &Request, _: Destination<'_>) -> Result<(), BoxError> {
    Ok(())
}

fn encode_nothing<T: ?Sized>(_: &ResponseSink, _: &Request, _: &T) {}

/// Configure how a [`Manager`] decodes requests and encodes responses.
///
/// Every collaborator is optional, a [`Manager`] substitutes a no-op for the ones left unset.
///
/// # Usage
///
/// ```rust
/// use hrpc::{Config, Manager};
///
/// let manager = Manager::new(
///     Config::new()
///         .with_decoder(hrpc::json::decode)
///         .with_encoder(|sink, _req, reply| {
///             sink.write(serde_json::to_vec(reply).unwrap_or_default());
///         })
///         .with_error_encoder(|sink, _req, err| {
///             sink.set_status(http::StatusCode::BAD_REQUEST);
///             sink.write(err.to_string());
///         })
///         .with_validation(true),
/// );
/// ```
#[derive(Clone, Default)]
pub struct Config {
    decoder: Option<Arc<DecodeFn>>,
    encoder: Option<Arc<EncodeFn>>,
    error_encoder: Option<Arc<EncodeErrorFn>>,
    validate: bool,
    method: Option<Method>,
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("decoder", &self.decoder.is_some())
            .field("encoder", &self.encoder.is_some())
            .field("error_encoder", &self.error_encoder.is_some())
            .field("validate", &self.validate)
            .field("method", &self.method)
            .finish()
    }
}

impl Config {
    pub fn new() -> Self {
        Self::default()
    }

    /// Decodes the request into the payload of a handler. An error stops the request.
    pub fn with_decoder(
        mut self,
        decoder: impl Fn(&Request, Destination<'_>) -> Result<(), BoxError> + Send + Sync + 'static,
    ) -> Self {
        self.decoder = Some(Arc::new(decoder));
        self
    }

    /// Writes the result of a handler.
    pub fn with_encoder(
        mut self,
        encoder: impl Fn(&ResponseSink, &Request, &ReplyValue) + Send + Sync + 'static,
    ) -> Self {
        self.encoder = Some(Arc::new(encoder));
        self
    }

    /// Writes the error of a failed request.
    pub fn with_error_encoder(
        mut self,
        error_encoder: impl Fn(&ResponseSink, &Request, &RequestError) + Send + Sync + 'static,
    ) -> Self {
        self.error_encoder = Some(Arc::new(error_encoder));
        self
    }

    /// Run the [`Validate`](crate::Validate) capability of payloads which have one.
    pub fn with_validation(mut self, validate: bool) -> Self {
        self.validate = validate;
        self
    }

    /// Reject requests with any other method before decoding them.
    pub fn with_method(mut self, method: Method) -> Self {
        self.method = Some(method);
        self
    }
}

/// Turns handler functions into [`Endpoint`]s sharing one [`Config`].
#[derive(Clone)]
pub struct Manager {
    shared: Arc<Shared>,
    validate: bool,
}

impl fmt::Debug for Manager {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Manager")
            .field("validate", &self.validate)
            .field("method", &self.shared.method)
            .finish()
    }
}

impl Default for Manager {
    fn default() -> Self {
        Self::new(Config::default())
    }
}

impl Manager {
    pub fn new(config: Config) -> Self {
        let decoder: Arc<DecodeFn> = match config.decoder {
            Some(decoder) => decoder,
            None => Arc::new(decode_nothing),
        };
        let encoder: Arc<EncodeFn> = match config.encoder {
            Some(encoder) => encoder,
            None => Arc::new(encode_nothing::<ReplyValue>),
        };
        let error_encoder: Arc<EncodeErrorFn> = match config.error_encoder {
            Some(error_encoder) => error_encoder,
            None => Arc::new(encode_nothing::<RequestError>),
        };

        Self {
            shared: Arc::new(Shared {
                decoder,
                encoder,
                error_encoder,
                method: config.method,
            }),
            validate: config.validate,
        }
    }

    /// Classify `handler` and build the [`Endpoint`] dispatching requests to it.
    ///
    /// This fails if the handler's signature is ambiguous, see [`classify`](crate::classify).
    pub fn handler<M, H>(&self, handler: H) -> Result<Endpoint, ConfigError>
    where
        M: 'static,
        H: Handler<M>,
    {
        let plan = match classify(&H::signature()) {
            Ok(plan) => plan.with_validation(self.validate),
            Err(err) => {
                #[cfg(feature = "tracing")]
                tracing::error!(handler = type_name::<H>(), error = %err, "invalid handler");
                return Err(err);
            }
        };

        #[cfg(feature = "tracing")]
        tracing::debug!(
            handler = type_name::<H>(),
            arity = plan.effective_arity(),
            payload = ?plan.payload().map(|p| p.type_name),
            validates = plan.validates(),
            "registered handler"
        );

        Ok(Endpoint::new(handler, plan, self.shared.clone()))
    }
}
