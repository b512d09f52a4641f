//! `/contact` routes.

use axum::body::Body;
use axum::extract::State;
use axum::http::{header, HeaderValue, StatusCode};
use axum::response::Response;
use axum::routing::get;
use axum::Router;
use serde::Deserialize;

use super::error::HandlerError;
use super::extract::{read_json, IdParam};
use super::response::{envelope, write_json};
use super::{method_not_allowed, AppState};
use crate::model::{ContactPatch, NewContact};

/// Create body. Missing fields decode as empty strings and fail validation.
#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CreateContact {
    full_name: String,
    phone: String,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/contact",
            get(show)
                .post(create)
                .put(update)
                .delete(destroy)
                .fallback(method_not_allowed),
        )
        .route(
            "/contact/healthcheck",
            get(healthcheck).fallback(method_not_allowed),
        )
}

async fn healthcheck() -> Result<Response, HandlerError> {
    write_json(StatusCode::OK, &envelope("status", "ok")?)
}

async fn show(State(state): State<AppState>, IdParam(id): IdParam) -> Result<Response, HandlerError> {
    let contact = state.contacts.get_by_id(id).await?;
    write_json(StatusCode::OK, &envelope("contact", &contact)?)
}

async fn create(State(state): State<AppState>, body: Body) -> Result<Response, HandlerError> {
    let input: CreateContact = read_json(body).await?;
    let input = NewContact::new(input.full_name, input.phone);
    input.validate()?;

    let contact = state.contacts.create(&input).await?;

    let mut response = write_json(StatusCode::CREATED, &envelope("contact", &contact)?)?;
    let location = HeaderValue::try_from(format!("/contacts/{}", contact.id))
        .map_err(HandlerError::internal)?;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

async fn update(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    body: Body,
) -> Result<Response, HandlerError> {
    let mut contact = state.contacts.get_by_id(id).await?;
    let patch: ContactPatch = read_json(body).await?;
    contact.apply(patch);
    contact.validate()?;

    let contact = state.contacts.update(contact).await?;
    write_json(StatusCode::OK, &envelope("contact", &contact)?)
}

async fn destroy(State(state): State<AppState>, IdParam(id): IdParam) -> Result<Response, HandlerError> {
    state.contacts.delete(id).await?;
    write_json(
        StatusCode::OK,
        &envelope("message", "contact successfully deleted")?,
    )
}
