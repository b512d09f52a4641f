//! Storage capability interfaces and their adapters.
//!
//! Services depend on [`ContactStore`] / [`GroupStore`] only; the concrete
//! adapter is picked once at startup and injected as `Arc<dyn ...>`.
//!
//! Every call takes a deadline. Adapters must give up when it passes and
//! report [`StoreError::DeadlineExceeded`](crate::StoreError::DeadlineExceeded).
//! Identifiers below 1 are rejected before any query is issued.

mod in_memory;
#[cfg(feature = "postgres")]
pub mod postgres;
pub mod versioned;

use async_trait::async_trait;
use tokio::time::Instant;

use crate::error::StoreResult;
use crate::model::{Contact, Group, NewContact, NewGroup, RecordId, Version};

pub use in_memory::InMemoryStore;

/// Create / read / update / delete for contacts.
#[async_trait]
pub trait ContactStore: Send + Sync {
    /// Insert a contact. The store assigns id, creation time and version.
    async fn create(&self, contact: &NewContact, deadline: Instant) -> StoreResult<Contact>;

    async fn get_by_id(&self, id: RecordId, deadline: Instant) -> StoreResult<Contact>;

    /// Conditional update guarded by `contact.version`. Returns the new version.
    async fn update(&self, contact: &Contact, deadline: Instant) -> StoreResult<Version>;

    async fn delete(&self, id: RecordId, deadline: Instant) -> StoreResult<()>;
}

/// Create / read / update for groups. Groups have no delete.
#[async_trait]
pub trait GroupStore: Send + Sync {
    async fn create(&self, group: &NewGroup, deadline: Instant) -> StoreResult<Group>;

    async fn get_by_id(&self, id: RecordId, deadline: Instant) -> StoreResult<Group>;

    /// Conditional update guarded by `group.version`. Returns the new version.
    async fn update(&self, group: &Group, deadline: Instant) -> StoreResult<Version>;
}
