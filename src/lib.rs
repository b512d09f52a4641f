//! Contacts and groups REST API with optimistic concurrency control.
//!
//! Layers, innermost first:
//!
//! - [`model`] - `Contact` and `Group`, their inputs, patches and validation.
//! - [`store`] - the `ContactStore` / `GroupStore` capabilities, the shared
//!   version-conditioned update protocol, and the PostgreSQL and in-memory
//!   adapters.
//! - [`service`] - per-call deadlines around the stores.
//! - [`http`] - axum routes, JSON envelopes, status mapping.
//! - [`app`], [`server`], [`config`], [`telemetry`] - process plumbing.

pub mod app;
pub mod config;
mod error;
pub mod http;
pub mod model;
pub mod server;
pub mod service;
pub mod store;
pub mod telemetry;
pub mod validator;

pub use config::{Config, DbConfig, Environment, LogFormat, StoreKind};
pub use error::{StoreError, StoreResult};
pub use model::{
    Contact, ContactPatch, Group, GroupPatch, NewContact, NewGroup, RecordId, Version, Versioned,
    INITIAL_VERSION,
};
pub use service::{ContactService, GroupService};
pub use store::{ContactStore, GroupStore, InMemoryStore};
