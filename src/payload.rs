use std::{
    any::{type_name, Any},
    fmt,
    ops::{Deref, DerefMut},
};

use serde::de::DeserializeOwned;

use crate::BoxError;

/// A validation function for a payload type.
pub type Validator<T> = fn(&T) -> Result<(), BoxError>;

/// An optional capability of payload types.
///
/// It's only invoked when the [`Config`](crate::Config) has validation enabled and the payload type
/// wires it in through [`Input::VALIDATOR`]. The [`input!`](crate::input) macro does that for you.
pub trait Validate {
    fn validate(&self) -> Result<(), BoxError>;
}

/// A type that can be decoded as the payload of a handler.
///
/// The decoder writes into a [`Default`] instance of the type, so a decoder that leaves the
/// destination untouched hands the handler the zero value.
///
/// Implement it with the [`input!`](crate::input) macro:
///
/// ```rust
/// #[derive(Default, serde::Deserialize)]
/// struct GetUser {
///     id: String,
/// }
///
/// hrpc::input!(GetUser);
/// ```
pub trait Input: DeserializeOwned + Default + Send + 'static {
    /// The [`Validate`] capability of this type, if it has one.
    ///
    /// Recorded in the [`BindingPlan`](crate::BindingPlan) when a handler is registered.
    const VALIDATOR: Option<Validator<Self>> = None;
}

/// Implement [`Input`] for one or more types.
///
/// Prefix the list with `validate:` to wire in each type's [`Validate`] implementation.
///
/// ```rust
/// use hrpc::{BoxError, Validate};
///
/// #[derive(Default, serde::Deserialize)]
/// struct Create {
///     data: i64,
/// }
///
/// impl Validate for Create {
///     fn validate(&self) -> Result<(), BoxError> {
///         if self.data < 0 {
///             return Err("invalid data".into());
///         }
///         Ok(())
///     }
/// }
///
/// hrpc::input!(validate: Create);
/// ```
#[macro_export]
macro_rules! input {
    (validate: $($ty:ty),+ $(,)?) => {
        $(
            impl $crate::Input for $ty {
                const VALIDATOR: ::core::option::Option<$crate::Validator<Self>> =
                    ::core::option::Option::Some(<Self as $crate::Validate>::validate);
            }
        )+
    };
    ($($ty:ty),+ $(,)?) => {
        $(impl $crate::Input for $ty {})+
    };
}

impl Input for serde_json::Value {}

trait Slot: Send {
    fn fill(&mut self, de: &mut dyn erased_serde::Deserializer<'_>) -> Result<(), erased_serde::Error>;

    fn as_any_mut(&mut self) -> &mut dyn Any;
}

impl<T: DeserializeOwned + Send + 'static> Slot for T {
    fn fill(&mut self, de: &mut dyn erased_serde::Deserializer<'_>) -> Result<(), erased_serde::Error> {
        *self = erased_serde::deserialize(de)?;
        Ok(())
    }

    fn as_any_mut(&mut self) -> &mut dyn Any {
        self
    }
}

/// The zero-valued payload a decoder writes into.
pub struct Destination<'a> {
    type_name: &'static str,
    slot: &'a mut dyn Slot,
}

impl fmt::Debug for Destination<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Destination")
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl<'a> Destination<'a> {
    pub(crate) fn new<T: DeserializeOwned + Send + 'static>(slot: &'a mut T) -> Self {
        Self {
            type_name: type_name::<T>(),
            slot,
        }
    }

    /// The name of the payload type, for diagnostics.
    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    /// Replace the destination with a value read from `deserializer`.
    pub fn deserialize_from<'de, D>(&mut self, deserializer: D) -> Result<(), BoxError>
    where
        D: serde::Deserializer<'de>,
    {
        let mut deserializer = <dyn erased_serde::Deserializer>::erase(deserializer);
        self.slot.fill(&mut deserializer).map_err(Into::into)
    }

    /// Access the destination directly, for decoders which don't go through serde.
    pub fn downcast_mut<T: 'static>(&mut self) -> Option<&mut T> {
        self.slot.as_any_mut().downcast_mut::<T>()
    }
}

/// The decoded payload, passed to the handler by value.
///
/// ```rust
/// use hrpc::{Payload, Reply};
///
/// # #[derive(Default, serde::Deserialize)]
/// # struct GetUser { id: String }
/// # hrpc::input!(GetUser);
/// async fn get_user(Payload(req): Payload<GetUser>) -> Reply<String> {
///     Reply(format!("User {}", req.id))
/// }
/// ```
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Payload<T>(pub T);

impl<T> Deref for Payload<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for Payload<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

/// The decoded payload, passed to the handler in the same allocation the decoder wrote into.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BoxedPayload<T>(pub Box<T>);

impl<T> Deref for BoxedPayload<T> {
    type Target = T;

    fn deref(&self) -> &Self::Target {
        &self.0
    }
}

impl<T> DerefMut for BoxedPayload<T> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.0
    }
}

#[cfg(test)]
mod tests {
    use serde::Deserialize;

    use super::*;

    #[derive(Debug, Default, Deserialize, PartialEq)]
    struct Data {
        data: i64,
    }

    #[test]
    fn destination_deserializes_in_place() {
        let mut value = Data::default();
        let mut dest = Destination::new(&mut value);
        assert!(dest.type_name().ends_with("Data"));

        dest.deserialize_from(&mut serde_json::Deserializer::from_str(r#"{"data": 7}"#))
            .unwrap();
        assert_eq!(value, Data { data: 7 });
    }

    #[test]
    fn destination_reports_deserialize_errors() {
        let mut value = Data::default();
        let err = Destination::new(&mut value)
            .deserialize_from(&mut serde_json::Deserializer::from_str("invalid"))
            .unwrap_err();
        assert!(!err.to_string().is_empty());
        assert_eq!(value, Data::default());
    }

    #[test]
    fn destination_downcast() {
        let mut value = Data::default();
        let mut dest = Destination::new(&mut value);
        assert!(dest.downcast_mut::<String>().is_none());
        dest.downcast_mut::<Data>().unwrap().data = 3;
        assert_eq!(value.data, 3);
    }
}
