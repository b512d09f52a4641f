//! Error type for HTTP handlers and its JSON rendering.

use std::error::Error;

use axum::extract::Request;
use axum::http::{Method, StatusCode};
use axum::middleware::Next;
use axum::response::{IntoResponse, Response};
use serde_json::{Map, Value};
use tracing::error;

use super::response::{json_response, to_pretty_json};
use crate::error::StoreError;
use crate::validator::FieldErrors;

pub const NOT_FOUND_MESSAGE: &str = "the requested resource could not be found";
pub const EDIT_CONFLICT_MESSAGE: &str =
    "unable to update the record due to an edit conflict, please try again";
pub const SERVER_ERROR_MESSAGE: &str =
    "the server encountered a problem and could not process your request";

const FALLBACK_BODY: &[u8] =
    b"{\n\t\"error\": \"the server encountered a problem and could not process your request\"\n}\n";

#[derive(Debug, thiserror::Error)]
pub enum HandlerError {
    /// Unknown route, bad identifier, or missing record.
    #[error("the requested resource could not be found")]
    NotFound,

    /// The route exists but does not accept this method.
    #[error("the {0} method is not supported for this resource")]
    MethodNotAllowed(Method),

    /// The conditional update lost the race.
    #[error("unable to update the record due to an edit conflict, please try again")]
    EditConflict,

    /// Input failed field validation. Carries every failed field.
    #[error("failed validation on {} field(s)", .0.len())]
    FailedValidation(FieldErrors),

    /// The request body could not be decoded.
    #[error("{0}")]
    BadRequest(String),

    /// Anything else. Logged, never shown to the client.
    #[error("{0}")]
    Internal(#[source] Box<dyn Error + Send + Sync>),
}

/// Response extension carrying the text of an internal error, so the
/// logging middleware can report it alongside the request line.
#[derive(Debug, Clone)]
pub struct InternalError(pub String);

impl HandlerError {
    pub fn internal(err: impl Into<Box<dyn Error + Send + Sync>>) -> Self {
        HandlerError::Internal(err.into())
    }

    pub fn status_code(&self) -> StatusCode {
        match self {
            HandlerError::NotFound => StatusCode::NOT_FOUND,
            HandlerError::MethodNotAllowed(_) => StatusCode::METHOD_NOT_ALLOWED,
            HandlerError::EditConflict => StatusCode::CONFLICT,
            HandlerError::FailedValidation(_) => StatusCode::UNPROCESSABLE_ENTITY,
            HandlerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            HandlerError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn message(&self) -> Value {
        match self {
            HandlerError::FailedValidation(fields) => Value::Object(
                fields
                    .iter()
                    .map(|(field, msg)| (field.clone(), Value::String(msg.clone())))
                    .collect(),
            ),
            HandlerError::Internal(_) => Value::String(SERVER_ERROR_MESSAGE.to_string()),
            other => Value::String(other.to_string()),
        }
    }
}

impl From<StoreError> for HandlerError {
    fn from(err: StoreError) -> Self {
        match err {
            StoreError::NotFound { .. } => HandlerError::NotFound,
            StoreError::EditConflict { .. } => HandlerError::EditConflict,
            other => HandlerError::Internal(Box::new(other)),
        }
    }
}

impl From<serde_json::Error> for HandlerError {
    fn from(err: serde_json::Error) -> Self {
        HandlerError::Internal(Box::new(err))
    }
}

impl From<FieldErrors> for HandlerError {
    fn from(fields: FieldErrors) -> Self {
        HandlerError::FailedValidation(fields)
    }
}

impl IntoResponse for HandlerError {
    fn into_response(self) -> Response {
        let mut body = Map::new();
        body.insert("error".to_string(), self.message());
        let bytes = to_pretty_json(&Value::Object(body)).unwrap_or_else(|_| FALLBACK_BODY.to_vec());

        let mut response = json_response(self.status_code(), bytes);
        if let HandlerError::Internal(err) = self {
            response.extensions_mut().insert(InternalError(err.to_string()));
        }
        response
    }
}

/// Log every internal error with the request that produced it.
pub async fn log_server_errors(req: Request, next: Next) -> Response {
    let method = req.method().clone();
    let uri = req.uri().clone();
    let response = next.run(req).await;
    if let Some(InternalError(err)) = response.extensions().get::<InternalError>() {
        error!(
            request_method = %method,
            request_url = %uri,
            error = %err,
            "server error"
        );
    }
    response
}
