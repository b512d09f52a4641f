use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{deadline_after, DEFAULT_TIMEOUT};
use crate::error::StoreResult;
use crate::model::{Contact, NewContact, RecordId};
use crate::store::versioned::within_deadline;
use crate::store::ContactStore;

/// Contact use cases: create, read, update, delete.
#[derive(Clone)]
pub struct ContactService {
    store: Arc<dyn ContactStore>,
    timeout: Duration,
}

impl ContactService {
    pub fn new(store: Arc<dyn ContactStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    /// Override the per-call timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub async fn create(&self, input: &NewContact) -> StoreResult<Contact> {
        let deadline = deadline_after(self.timeout);
        let contact = within_deadline(deadline, self.store.create(input, deadline)).await?;
        debug!(id = contact.id, "contact created");
        Ok(contact)
    }

    pub async fn get_by_id(&self, id: RecordId) -> StoreResult<Contact> {
        let deadline = deadline_after(self.timeout);
        within_deadline(deadline, self.store.get_by_id(id, deadline)).await
    }

    /// Conditionally write `contact`, guarded by `contact.version`.
    /// Returns the contact carrying its new version.
    pub async fn update(&self, mut contact: Contact) -> StoreResult<Contact> {
        let deadline = deadline_after(self.timeout);
        let version = within_deadline(deadline, self.store.update(&contact, deadline)).await?;
        debug!(id = contact.id, version, "contact updated");
        contact.version = version;
        Ok(contact)
    }

    pub async fn delete(&self, id: RecordId) -> StoreResult<()> {
        let deadline = deadline_after(self.timeout);
        within_deadline(deadline, self.store.delete(id, deadline)).await?;
        debug!(id, "contact deleted");
        Ok(())
    }
}
