use std::{
    any::{type_name, Any},
    fmt,
};

use serde::{Serialize, Serializer};

use crate::{BoxError, Role};

/// Marks a handler return value as the result handed to the success encoder.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Reply<T>(pub T);

trait Inner: erased_serde::Serialize + Send + 'static {
    fn as_any(&self) -> &dyn Any;
}

impl<T: Serialize + Send + 'static> Inner for T {
    fn as_any(&self) -> &dyn Any {
        self
    }
}

/// The result of a handler, as handed to the success encoder.
pub struct ReplyValue {
    type_name: &'static str,
    inner: Box<dyn Inner>,
}

impl fmt::Debug for ReplyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ReplyValue")
            .field("type_name", &self.type_name)
            .finish()
    }
}

impl ReplyValue {
    pub fn new<T: Serialize + Send + 'static>(value: T) -> Self {
        Self {
            type_name: type_name::<T>(),
            inner: Box::new(value),
        }
    }

    pub fn type_name(&self) -> &'static str {
        self.type_name
    }

    pub fn downcast_ref<T: Any>(&self) -> Option<&T> {
        self.inner.as_any().downcast_ref()
    }
}

impl Serialize for ReplyValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        erased_serde::serialize(&*self.inner, serializer)
    }
}

/// What a handler produced, split by role.
#[derive(Debug, Default)]
pub struct Returned {
    pub payload: Option<ReplyValue>,
    pub error: Option<BoxError>,
}

mod private {
    pub trait Sealed {}
}

/// A single return value with a role.
pub trait OutputSlot: private::Sealed + Send + 'static {
    const ROLE: Role;

    #[doc(hidden)]
    fn fill(self, returned: &mut Returned);
}

impl<T: Serialize + Send + 'static> private::Sealed for Reply<T> {}
impl<T: Serialize + Send + 'static> OutputSlot for Reply<T> {
    const ROLE: Role = Role::PayloadOut;

    fn fill(self, returned: &mut Returned) {
        returned.payload = Some(ReplyValue::new(self.0));
    }
}

impl<E: Into<BoxError> + Send + 'static> private::Sealed for Result<(), E> {}
impl<E: Into<BoxError> + Send + 'static> OutputSlot for Result<(), E> {
    const ROLE: Role = Role::ErrorOut;

    fn fill(self, returned: &mut Returned) {
        if let Err(err) = self {
            returned.error = Some(err.into());
        }
    }
}

/// The full return shape of a handler.
///
/// Implemented for `()`, [`Reply<T>`], `Result<(), E>`, `Result<Reply<T>, E>` and tuples of up to
/// three [`OutputSlot`]s.
pub trait Outputs: Send + 'static {
    /// The role of each return value, left to right.
    fn roles() -> Vec<Role>;

    fn split(self) -> Returned;
}

impl Outputs for () {
    fn roles() -> Vec<Role> {
        Vec::new()
    }

    fn split(self) -> Returned {
        Returned::default()
    }
}

impl<T: Serialize + Send + 'static> Outputs for Reply<T> {
    fn roles() -> Vec<Role> {
        vec![Role::PayloadOut]
    }

    fn split(self) -> Returned {
        let mut returned = Returned::default();
        self.fill(&mut returned);
        returned
    }
}

impl<E: Into<BoxError> + Send + 'static> Outputs for Result<(), E> {
    fn roles() -> Vec<Role> {
        vec![Role::ErrorOut]
    }

    fn split(self) -> Returned {
        let mut returned = Returned::default();
        self.fill(&mut returned);
        returned
    }
}

impl<T, E> Outputs for Result<Reply<T>, E>
where
    T: Serialize + Send + 'static,
    E: Into<BoxError> + Send + 'static,
{
    fn roles() -> Vec<Role> {
        vec![Role::PayloadOut, Role::ErrorOut]
    }

    fn split(self) -> Returned {
        let mut returned = Returned::default();
        match self {
            Ok(reply) => reply.fill(&mut returned),
            Err(err) => returned.error = Some(err.into()),
        }
        returned
    }
}

macro_rules! impl_outputs {
    ($($generics:ident),*) => {
        impl<$($generics: OutputSlot),*> Outputs for ($($generics,)*) {
            fn roles() -> Vec<Role> {
                vec![$($generics::ROLE),*]
            }

            #[allow(non_snake_case)]
            fn split(self) -> Returned {
                let mut returned = Returned::default();
                let ($($generics,)*) = self;
                $($generics.fill(&mut returned);)*
                returned
            }
        }
    };
}

impl_outputs!(T1);
impl_outputs!(T1, T2);
impl_outputs!(T1, T2, T3);
