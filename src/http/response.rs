//! JSON envelope rendering.
//!
//! Every body is a single JSON object, pretty-printed with tab indentation
//! and terminated by a newline.

use axum::http::{header, HeaderValue, StatusCode};
use axum::response::{IntoResponse, Response};
use serde::Serialize;
use serde_json::ser::PrettyFormatter;
use serde_json::{Map, Serializer, Value};

use super::error::HandlerError;

/// Wrap `value` as `{ key: value }`.
pub fn envelope<T: Serialize + ?Sized>(key: &str, value: &T) -> Result<Value, serde_json::Error> {
    let mut map = Map::new();
    map.insert(key.to_string(), serde_json::to_value(value)?);
    Ok(Value::Object(map))
}

pub fn to_pretty_json<T: Serialize + ?Sized>(body: &T) -> Result<Vec<u8>, serde_json::Error> {
    let mut buf = Vec::with_capacity(128);
    let mut ser = Serializer::with_formatter(&mut buf, PrettyFormatter::with_indent(b"\t"));
    body.serialize(&mut ser)?;
    buf.push(b'\n');
    Ok(buf)
}

/// Render `body` with `status` and `Content-Type: application/json`.
pub fn write_json<T: Serialize + ?Sized>(
    status: StatusCode,
    body: &T,
) -> Result<Response, HandlerError> {
    Ok(json_response(status, to_pretty_json(body)?))
}

pub(super) fn json_response(status: StatusCode, bytes: Vec<u8>) -> Response {
    (
        status,
        [(
            header::CONTENT_TYPE,
            HeaderValue::from_static("application/json"),
        )],
        bytes,
    )
        .into_response()
}
