//! Request input: the `?id=` parameter and size-capped JSON bodies.

use async_trait::async_trait;
use axum::body::Body;
use axum::extract::{FromRequestParts, Query};
use axum::http::request::Parts;
use serde::de::DeserializeOwned;
use serde::Deserialize;
use serde_json::error::Category;

use super::error::HandlerError;
use crate::model::RecordId;

/// Largest request body accepted, in bytes.
pub const MAX_BODY_BYTES: usize = 1_048_576;

#[derive(Debug, Deserialize)]
struct IdQuery {
    id: Option<String>,
}

/// The record identifier from `?id=N`. Missing, non-numeric or below 1
/// rejects with 404.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct IdParam(pub RecordId);

#[async_trait]
impl<S> FromRequestParts<S> for IdParam
where
    S: Send + Sync,
{
    type Rejection = HandlerError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let Query(query) = Query::<IdQuery>::from_request_parts(parts, state)
            .await
            .map_err(|_| HandlerError::NotFound)?;
        parse_id(query.id.as_deref()).map(IdParam)
    }
}

pub fn parse_id(raw: Option<&str>) -> Result<RecordId, HandlerError> {
    raw.and_then(|s| s.trim().parse::<RecordId>().ok())
        .filter(|id| *id >= 1)
        .ok_or(HandlerError::NotFound)
}

/// Read at most [`MAX_BODY_BYTES`] and decode them as a single JSON value.
pub async fn read_json<T: DeserializeOwned>(body: Body) -> Result<T, HandlerError> {
    let bytes = axum::body::to_bytes(body, MAX_BODY_BYTES)
        .await
        .map_err(|_| {
            HandlerError::BadRequest(format!(
                "body must not be larger than {MAX_BODY_BYTES} bytes"
            ))
        })?;
    decode_json(&bytes)
}

/// Decode `bytes`, turning decoder failures into client-facing messages.
pub fn decode_json<T: DeserializeOwned>(bytes: &[u8]) -> Result<T, HandlerError> {
    if bytes.iter().all(u8::is_ascii_whitespace) {
        return Err(HandlerError::BadRequest("body must not be empty".into()));
    }
    serde_json::from_slice(bytes).map_err(|err| HandlerError::BadRequest(describe(&err)))
}

fn describe(err: &serde_json::Error) -> String {
    let text = err.to_string();
    match err.classify() {
        Category::Eof => "body contains badly-formed JSON".to_string(),
        Category::Syntax if text.starts_with("trailing characters") => {
            "body must only contain a single JSON value".to_string()
        }
        Category::Syntax => format!(
            "body contains badly-formed JSON (at line {}, column {})",
            err.line(),
            err.column()
        ),
        Category::Data => match unknown_field(&text) {
            Some(field) => format!("body contains unknown key \"{field}\""),
            None => format!(
                "body contains incorrect JSON type (at line {}, column {})",
                err.line(),
                err.column()
            ),
        },
        Category::Io => "body could not be read".to_string(),
    }
}

fn unknown_field(text: &str) -> Option<&str> {
    text.strip_prefix("unknown field `")?.split('`').next()
}
