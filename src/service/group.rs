use std::sync::Arc;
use std::time::Duration;

use tracing::debug;

use super::{deadline_after, DEFAULT_TIMEOUT};
use crate::error::StoreResult;
use crate::model::{Group, NewGroup, RecordId};
use crate::store::versioned::within_deadline;
use crate::store::GroupStore;

/// Group use cases: create, read, update. Groups are never deleted.
#[derive(Clone)]
pub struct GroupService {
    store: Arc<dyn GroupStore>,
    timeout: Duration,
}

impl GroupService {
    pub fn new(store: Arc<dyn GroupStore>) -> Self {
        Self {
            store,
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    pub async fn create(&self, input: &NewGroup) -> StoreResult<Group> {
        let deadline = deadline_after(self.timeout);
        let group = within_deadline(deadline, self.store.create(input, deadline)).await?;
        debug!(id = group.id, "group created");
        Ok(group)
    }

    pub async fn get_by_id(&self, id: RecordId) -> StoreResult<Group> {
        let deadline = deadline_after(self.timeout);
        within_deadline(deadline, self.store.get_by_id(id, deadline)).await
    }

    pub async fn update(&self, mut group: Group) -> StoreResult<Group> {
        let deadline = deadline_after(self.timeout);
        let version = within_deadline(deadline, self.store.update(&group, deadline)).await?;
        debug!(id = group.id, version, "group updated");
        group.version = version;
        Ok(group)
    }
}
