//! `/group` routes. There is no delete.

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
use crate::model::{GroupPatch, NewGroup};

#[derive(Debug, Default, Deserialize)]
#[serde(default, deny_unknown_fields)]
struct CreateGroup {
    group_name: String,
}

pub(super) fn routes() -> Router<AppState> {
    Router::new()
        .route(
            "/group",
            get(show)
                .post(create)
                .put(update)
                .fallback(method_not_allowed),
        )
        .route(
            "/group/healthcheck",
            get(healthcheck).fallback(method_not_allowed),
        )
}

async fn healthcheck() -> Result<Response, HandlerError> {
    write_json(StatusCode::OK, &envelope("status", "ok")?)
}

async fn show(State(state): State<AppState>, IdParam(id): IdParam) -> Result<Response, HandlerError> {
    let group = state.groups.get_by_id(id).await?;
    write_json(StatusCode::OK, &envelope("group", &group)?)
}

async fn create(State(state): State<AppState>, body: Body) -> Result<Response, HandlerError> {
    let input: CreateGroup = read_json(body).await?;
    let input = NewGroup::new(input.group_name);
    input.validate()?;

    let group = state.groups.create(&input).await?;

    let mut response = write_json(StatusCode::CREATED, &envelope("group", &group)?)?;
    let location = HeaderValue::try_from(format!("/groups/{}", group.id))
        .map_err(HandlerError::internal)?;
    response.headers_mut().insert(header::LOCATION, location);
    Ok(response)
}

async fn update(
    State(state): State<AppState>,
    IdParam(id): IdParam,
    body: Body,
) -> Result<Response, HandlerError> {
    let mut group = state.groups.get_by_id(id).await?;
    let patch: GroupPatch = read_json(body).await?;
    group.apply(patch);
    group.validate()?;

    let group = state.groups.update(group).await?;
    write_json(StatusCode::OK, &envelope("group", &group)?)
}
