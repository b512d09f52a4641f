//! HTTP delivery layer.
//!
//! ## Routes
//!
//! - `GET|POST|PUT|DELETE /contact` - contact CRUD, `?id=N` selects the record.
//! - `GET|POST|PUT /group` - group CRUD without delete.
//! - `GET /contact/healthcheck`, `GET /group/healthcheck` - `{"status": "ok"}`.
//!
//! Unknown paths answer with the JSON not-found body, unsupported methods
//! with a JSON 405.
//!
//! ## Example
//!
//! ```ignore
//! use contact_service::http::{self, AppState};
//!
//! let app = http::router(AppState::in_memory());
//! let listener = tokio::net::TcpListener::bind("127.0.0.1:4000").await?;
//! axum::serve(listener, app).await?;
//! ```

mod contact;
mod error;
mod extract;
mod group;
mod response;

use std::sync::Arc;

use axum::http::Method;
use axum::{middleware, Router};

use crate::service::{ContactService, GroupService};
use crate::store::InMemoryStore;

pub use error::{
    log_server_errors, HandlerError, InternalError, EDIT_CONFLICT_MESSAGE, NOT_FOUND_MESSAGE,
    SERVER_ERROR_MESSAGE,
};
pub use extract::{decode_json, parse_id, read_json, IdParam, MAX_BODY_BYTES};
pub use response::{envelope, to_pretty_json, write_json};

/// Shared handler state.
#[derive(Clone)]
pub struct AppState {
    pub contacts: Arc<ContactService>,
    pub groups: Arc<GroupService>,
}

impl AppState {
    pub fn new(contacts: ContactService, groups: GroupService) -> Self {
        Self {
            contacts: Arc::new(contacts),
            groups: Arc::new(groups),
        }
    }

    /// Both services over one fresh [`InMemoryStore`].
    pub fn in_memory() -> Self {
        let store = Arc::new(InMemoryStore::new());
        Self::new(
            ContactService::new(store.clone()),
            GroupService::new(store),
        )
    }
}

/// Build the application router.
pub fn router(state: AppState) -> Router {
    Router::new()
        .merge(contact::routes())
        .merge(group::routes())
        .fallback(not_found)
        .layer(middleware::from_fn(log_server_errors))
        .with_state(state)
}

async fn not_found() -> HandlerError {
    HandlerError::NotFound
}

/// Method fallback for every route. axum still adds the `Allow` header.
async fn method_not_allowed(method: Method) -> HandlerError {
    HandlerError::MethodNotAllowed(method)
}
