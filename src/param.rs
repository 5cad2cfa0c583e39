use std::{any::type_name, fmt};

use crate::{
    payload::Destination, BoxError, BoxedPayload, Context, Input, ParamKind, Payload, Request,
    RequestError, ResponseSink, Role,
};

pub(crate) type DecodeFn = dyn Fn(&Request, Destination<'_>) -> Result<(), BoxError> + Send + Sync;

/// What the classifier knows about the payload parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PayloadPlan {
    /// Name of the type the decoder writes into.
    pub type_name: &'static str,
    /// `true` when the handler receives the decoder's allocation instead of the value.
    pub by_pointer: bool,
    /// `true` when the type has the [`Validate`](crate::Validate) capability.
    pub validator: bool,
}

/// The classification of a single handler parameter.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ParamInfo {
    pub kind: ParamKind,
    pub payload: Option<PayloadPlan>,
}

impl ParamInfo {
    pub const fn role(role: Role) -> Self {
        Self {
            kind: ParamKind::Role(role),
            payload: None,
        }
    }

    pub const fn payload(plan: PayloadPlan) -> Self {
        Self {
            kind: ParamKind::Role(Role::PayloadIn),
            payload: Some(plan),
        }
    }

    pub const fn options() -> Self {
        Self {
            kind: ParamKind::Options,
            payload: None,
        }
    }
}

/// Everything a parameter can be bound from while dispatching a request.
pub struct BindCx<'a> {
    pub(crate) request: &'a Request,
    pub(crate) sink: &'a ResponseSink,
    pub(crate) decoder: &'a DecodeFn,
    /// [`BindingPlan::validates`](crate::BindingPlan::validates) of the handler being called.
    pub(crate) validate: bool,
}

impl fmt::Debug for BindCx<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("BindCx")
            .field("request", &self.request)
            .field("validate", &self.validate)
            .finish()
    }
}

impl BindCx<'_> {
    fn decode<T: Input>(&self, dest: &mut T) -> Result<(), RequestError> {
        (self.decoder)(self.request, Destination::new(dest)).map_err(|err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(payload = type_name::<T>(), error = %err, "error decoding request");
            RequestError::Decode(err)
        })
    }

    fn validate<T: Input>(&self, value: &T) -> Result<(), RequestError> {
        let Some(validate) = T::VALIDATOR.filter(|_| self.validate) else {
            return Ok(());
        };

        validate(value).map_err(|err| {
            #[cfg(feature = "tracing")]
            tracing::debug!(payload = type_name::<T>(), error = %err, "invalid request");
            RequestError::Validation(err)
        })
    }
}

mod private {
    pub trait Sealed {}
}

/// A type that can be used as a handler parameter.
///
/// The set of parameter types is closed, see [`Role`] for what each of them carries.
pub trait Param: private::Sealed + Sized + Send + 'static {
    fn info() -> ParamInfo;

    #[doc(hidden)]
    fn bind(cx: &mut BindCx<'_>) -> Result<Self, RequestError>;
}

impl private::Sealed for Context {}
impl Param for Context {
    fn info() -> ParamInfo {
        ParamInfo::role(Role::Context)
    }

    fn bind(cx: &mut BindCx<'_>) -> Result<Self, RequestError> {
        Ok(cx.request.context().clone())
    }
}

impl private::Sealed for Request {}
impl Param for Request {
    fn info() -> ParamInfo {
        ParamInfo::role(Role::RawRequest)
    }

    fn bind(cx: &mut BindCx<'_>) -> Result<Self, RequestError> {
        Ok(cx.request.clone())
    }
}

impl private::Sealed for ResponseSink {}
impl Param for ResponseSink {
    fn info() -> ParamInfo {
        ParamInfo::role(Role::ResponseSink)
    }

    fn bind(cx: &mut BindCx<'_>) -> Result<Self, RequestError> {
        Ok(cx.sink.clone())
    }
}

impl<T: Input> private::Sealed for Payload<T> {}
impl<T: Input> Param for Payload<T> {
    fn info() -> ParamInfo {
        ParamInfo::payload(PayloadPlan {
            type_name: type_name::<T>(),
            by_pointer: false,
            validator: T::VALIDATOR.is_some(),
        })
    }

    fn bind(cx: &mut BindCx<'_>) -> Result<Self, RequestError> {
        let mut slot = Box::<T>::default();
        cx.decode(&mut *slot)?;
        cx.validate(&*slot)?;
        Ok(Payload(*slot))
    }
}

impl<T: Input> private::Sealed for BoxedPayload<T> {}
impl<T: Input> Param for BoxedPayload<T> {
    fn info() -> ParamInfo {
        ParamInfo::payload(PayloadPlan {
            type_name: type_name::<T>(),
            by_pointer: true,
            validator: T::VALIDATOR.is_some(),
        })
    }

    fn bind(cx: &mut BindCx<'_>) -> Result<Self, RequestError> {
        let mut slot = Box::<T>::default();
        cx.decode(&mut *slot)?;
        cx.validate(&*slot)?;
        Ok(BoxedPayload(slot))
    }
}

/// Trailing call options, as found on generated client-style signatures.
///
/// Only allowed as the last parameter. It doesn't count towards the handler's arity and the
/// handler always receives it empty.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CallOptions<T = ()>(pub Vec<T>);

impl<T> Default for CallOptions<T> {
    fn default() -> Self {
        Self(Vec::new())
    }
}

impl<T: Send + 'static> private::Sealed for CallOptions<T> {}
impl<T: Send + 'static> Param for CallOptions<T> {
    fn info() -> ParamInfo {
        ParamInfo::options()
    }

    fn bind(_: &mut BindCx<'_>) -> Result<Self, RequestError> {
        Ok(Self::default())
    }
}
