//! hrpc turns plain typed async functions into HTTP request handlers.
//!
//! A handler is an ordinary function whose parameters and return value are drawn from a small
//! fixed vocabulary of [`Role`]s: the request's [`Context`], the raw [`Request`], the
//! [`ResponseSink`], one decoded [`Payload`], a [`Reply`] and an error. The signature is
//! classified once by [`Manager::handler`] into a [`BindingPlan`]. The resulting [`Endpoint`]
//! then decodes, validates, invokes and encodes every request using that plan.
//!
//! The wire format is not part of this crate. Decoding and encoding go through the
//! collaborators configured on [`Config`], [`json`] has a ready made set.
//!
//! ```rust
//! use hrpc::{BoxError, Context, Payload, Reply, Validate};
//!
//! #[derive(Default, serde::Deserialize)]
//! struct Create {
//!     data: i64,
//! }
//!
//! impl Validate for Create {
//!     fn validate(&self) -> Result<(), BoxError> {
//!         if self.data < 0 {
//!             return Err("invalid data".into());
//!         }
//!         Ok(())
//!     }
//! }
//!
//! hrpc::input!(validate: Create);
//!
//! async fn create(_: Context, Payload(req): Payload<Create>) -> Result<Reply<i64>, BoxError> {
//!     Ok(Reply(req.data))
//! }
//!
//! # tokio::runtime::Builder::new_current_thread().build().unwrap().block_on(async {
//! let endpoint = hrpc::Manager::new(hrpc::json::config()).handler(create).unwrap();
//!
//! let resp = endpoint
//!     .serve(http::Request::new(bytes::Bytes::from_static(br#"{"data": 1}"#)))
//!     .await;
//! assert_eq!(resp.body().as_ref(), b"1");
//!
//! let resp = endpoint
//!     .serve(http::Request::new(bytes::Bytes::from_static(br#"{"data": -1}"#)))
//!     .await;
//! assert_eq!(resp.status(), 400);
//! # });
//! ```
#![warn(
    clippy::all,
    clippy::unwrap_used,
    clippy::panic,
    clippy::todo,
    clippy::panic_in_result_fn,
    // missing_docs
)]
#![forbid(unsafe_code)]
#![cfg_attr(docsrs, feature(doc_cfg))]

pub mod json;

mod context;
mod endpoint;
mod error;
mod handler;
mod manager;
mod output;
mod param;
mod payload;
mod plan;
mod request;
mod role;

pub use context::Context;
pub use endpoint::Endpoint;
pub use error::{BoxError, ConfigError, Error, ErrorCode, RequestError};
pub use handler::Handler;
pub use manager::{Config, Manager};
pub use output::{OutputSlot, Outputs, Reply, ReplyValue, Returned};
pub use param::{BindCx, CallOptions, Param, ParamInfo, PayloadPlan};
pub use payload::{BoxedPayload, Destination, Input, Payload, Validate, Validator};
pub use plan::{classify, BindingPlan, Signature};
pub use request::{Request, ResponseSink};
pub use role::{ParamKind, Role};
