use std::future::Future;

use crate::{BindCx, Outputs, Param, RequestError, Signature};

/// An async function which can be registered with a [`Manager`](crate::Manager).
///
/// It's implemented for functions and closures of up to eight [`Param`]s returning a future
/// whose output implements [`Outputs`]. `M` only exists to keep the implementations for each
/// arity apart and is inferred.
///
/// ```rust
/// use hrpc::{Context, Payload, Reply};
///
/// #[derive(Default, serde::Deserialize)]
/// struct GetUser {
///     id: String,
/// }
///
/// hrpc::input!(GetUser);
///
/// async fn get_user(
///     _ctx: Context,
///     Payload(req): Payload<GetUser>,
/// ) -> Result<Reply<String>, hrpc::Error> {
///     Ok(Reply(format!("User {}", req.id)))
/// }
///
/// let endpoint = hrpc::Manager::default().handler(get_user).unwrap();
/// assert_eq!(endpoint.plan().effective_arity(), 2);
/// ```
pub trait Handler<M>: Clone + Send + Sync + 'static {
    type Output: Outputs;
    type Future: Future<Output = Self::Output> + Send + 'static;

    /// The shape of this handler. Classified once when it's registered.
    fn signature() -> Signature;

    #[doc(hidden)]
    fn call(&self, cx: &mut BindCx<'_>) -> Result<Self::Future, RequestError>;
}

macro_rules! impl_handler {
    ($($generics:ident),*) => {
        #[allow(non_snake_case, unused_variables)]
        impl<F, Fut, R, $($generics),*> Handler<($($generics,)*)> for F
        where
            F: Fn($($generics),*) -> Fut + Clone + Send + Sync + 'static,
            Fut: Future<Output = R> + Send + 'static,
            R: Outputs,
            $($generics: Param,)*
        {
            type Output = R;
            type Future = Fut;

            fn signature() -> Signature {
                Signature {
                    params: vec![$($generics::info()),*],
                    outputs: R::roles(),
                }
            }

            fn call(&self, cx: &mut BindCx<'_>) -> Result<Fut, RequestError> {
                $(let $generics = $generics::bind(cx)?;)*
                Ok(self($($generics),*))
            }
        }
    };
}

impl_handler!();
impl_handler!(T1);
impl_handler!(T1, T2);
impl_handler!(T1, T2, T3);
impl_handler!(T1, T2, T3, T4);
impl_handler!(T1, T2, T3, T4, T5);
impl_handler!(T1, T2, T3, T4, T5, T6);
impl_handler!(T1, T2, T3, T4, T5, T6, T7);
impl_handler!(T1, T2, T3, T4, T5, T6, T7, T8);
