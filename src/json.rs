//! JSON collaborators for a [`Manager`](crate::Manager).
//!
//! ```rust
//! let manager = hrpc::Manager::new(hrpc::json::config());
//! ```

use http::{
    header::{HeaderValue, CONTENT_TYPE},
    StatusCode,
};
use serde::Serialize;

use crate::{BoxError, Config, Destination, ReplyValue, Request, RequestError, ResponseSink};

const APPLICATION_JSON: &str = "application/json; charset=utf-8";

/// A [`Config`] using [`decode`], [`encode`] and [`encode_error`] with validation enabled.
pub fn config() -> Config {
    Config::new()
        .with_decoder(decode)
        .with_encoder(encode)
        .with_error_encoder(encode_error)
        .with_validation(true)
}

/// Decode the request body as JSON.
pub fn decode(req: &Request, mut dest: Destination<'_>) -> Result<(), BoxError> {
    let mut deserializer = serde_json::Deserializer::from_slice(req.body());
    dest.deserialize_from(&mut deserializer)?;
    deserializer.end().map_err(Into::into)
}

/// Write the result as a JSON body.
pub fn encode(sink: &ResponseSink, _: &Request, reply: &ReplyValue) {
    match serde_json::to_vec(reply) {
        Ok(body) => {
            sink.insert_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
            sink.write(body);
        }
        Err(_err) => {
            #[cfg(feature = "tracing")]
            tracing::error!(reply = reply.type_name(), error = %_err, "error encoding result");
            sink.set_status(StatusCode::INTERNAL_SERVER_ERROR);
        }
    }
}

#[derive(Serialize)]
struct ErrorBody {
    error: String,
}

/// Write the error as `{"error": "..."}` with the status of [`RequestError::code`].
pub fn encode_error(sink: &ResponseSink, _: &Request, err: &RequestError) {
    let status = StatusCode::from_u16(err.code().to_status_code())
        .unwrap_or(StatusCode::INTERNAL_SERVER_ERROR);
    sink.set_status(status);

    let body = ErrorBody {
        error: err.to_string(),
    };
    if let Ok(body) = serde_json::to_vec(&body) {
        sink.insert_header(CONTENT_TYPE, HeaderValue::from_static(APPLICATION_JSON));
        sink.write(body);
    }
}
