//! InMemoryStore - BTreeMap-backed store for tests and local development.

use std::collections::BTreeMap;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::{Arc, RwLock};

use async_trait::async_trait;
use chrono::Utc;
use tokio::time::Instant;

use super::versioned::{
    check_id, expect_affected, expect_found, expect_new_version, next_version, within_deadline,
};
use super::{ContactStore, GroupStore};
use crate::error::{StoreError, StoreResult};
use crate::model::{
    Contact, Group, NewContact, NewGroup, RecordId, Version, Versioned, INITIAL_VERSION,
};

struct Tables {
    contacts: BTreeMap<RecordId, Contact>,
    groups: BTreeMap<RecordId, Group>,
    next_contact_id: RecordId,
    next_group_id: RecordId,
}

/// In-process store with the same observable semantics as the PostgreSQL
/// adapter: server-assigned ids, timestamps and versions, and conditional
/// updates that are atomic under the write lock.
///
/// Clone-friendly via Arc; clones share the same tables.
#[derive(Clone)]
pub struct InMemoryStore {
    tables: Arc<RwLock<Tables>>,
    statements: Arc<AtomicU64>,
}

impl Default for InMemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

impl InMemoryStore {
    pub fn new() -> Self {
        Self {
            tables: Arc::new(RwLock::new(Tables {
                contacts: BTreeMap::new(),
                groups: BTreeMap::new(),
                next_contact_id: 1,
                next_group_id: 1,
            })),
            statements: Arc::new(AtomicU64::new(0)),
        }
    }

    /// Number of operations that reached the tables.
    pub fn statements(&self) -> u64 {
        self.statements.load(Ordering::Relaxed)
    }

    fn read<T>(&self, op: &'static str, f: impl FnOnce(&Tables) -> StoreResult<T>) -> StoreResult<T> {
        let tables = self
            .tables
            .read()
            .map_err(|_| StoreError::LockPoisoned(op))?;
        self.statements.fetch_add(1, Ordering::Relaxed);
        f(&tables)
    }

    fn write<T>(
        &self,
        op: &'static str,
        f: impl FnOnce(&mut Tables) -> StoreResult<T>,
    ) -> StoreResult<T> {
        let mut tables = self
            .tables
            .write()
            .map_err(|_| StoreError::LockPoisoned(op))?;
        self.statements.fetch_add(1, Ordering::Relaxed);
        f(&mut tables)
    }
}

/// Conditional write shared by both tables: replace `stored` with `incoming`
/// only when the versions agree.
fn conditional_update<R: Versioned + Clone>(
    stored: Option<&mut R>,
    incoming: &R,
    set_version: impl FnOnce(&mut R, Version),
    keep_immutable: impl FnOnce(&R, &mut R),
) -> StoreResult<Version> {
    let matched = match stored {
        Some(current) if current.version() == incoming.version() => {
            let new_version = next_version(R::TABLE, incoming.id(), current.version())?;
            let mut replacement = incoming.clone();
            keep_immutable(current, &mut replacement);
            set_version(&mut replacement, new_version);
            *current = replacement;
            Some(new_version)
        }
        _ => None,
    };
    expect_new_version(incoming, matched)
}

#[async_trait]
impl ContactStore for InMemoryStore {
    async fn create(&self, contact: &NewContact, deadline: Instant) -> StoreResult<Contact> {
        within_deadline(deadline, async {
            self.write("contact insert", |tables| {
                let id = tables.next_contact_id;
                tables.next_contact_id += 1;
                let stored = Contact {
                    id,
                    full_name: contact.full_name.clone(),
                    phone: contact.phone.clone(),
                    created_at: Utc::now(),
                    version: INITIAL_VERSION,
                };
                tables.contacts.insert(id, stored.clone());
                Ok(stored)
            })
        })
        .await
    }

    async fn get_by_id(&self, id: RecordId, deadline: Instant) -> StoreResult<Contact> {
        let id = check_id(Contact::TABLE, id)?;
        within_deadline(deadline, async {
            self.read("contact select", |tables| {
                expect_found(Contact::TABLE, id, tables.contacts.get(&id).cloned())
            })
        })
        .await
    }

    async fn update(&self, contact: &Contact, deadline: Instant) -> StoreResult<Version> {
        within_deadline(deadline, async {
            self.write("contact update", |tables| {
                conditional_update(
                    tables.contacts.get_mut(&contact.id),
                    contact,
                    |c, v| c.version = v,
                    |current, next| next.created_at = current.created_at,
                )
            })
        })
        .await
    }

    async fn delete(&self, id: RecordId, deadline: Instant) -> StoreResult<()> {
        let id = check_id(Contact::TABLE, id)?;
        within_deadline(deadline, async {
            self.write("contact delete", |tables| {
                let affected = u64::from(tables.contacts.remove(&id).is_some());
                expect_affected(Contact::TABLE, id, affected)
            })
        })
        .await
    }
}

#[async_trait]
impl GroupStore for InMemoryStore {
    async fn create(&self, group: &NewGroup, deadline: Instant) -> StoreResult<Group> {
        within_deadline(deadline, async {
            self.write("group insert", |tables| {
                let id = tables.next_group_id;
                tables.next_group_id += 1;
                let stored = Group {
                    id,
                    group_name: group.group_name.clone(),
                    created_at: Utc::now(),
                    version: INITIAL_VERSION,
                };
                tables.groups.insert(id, stored.clone());
                Ok(stored)
            })
        })
        .await
    }

    async fn get_by_id(&self, id: RecordId, deadline: Instant) -> StoreResult<Group> {
        let id = check_id(Group::TABLE, id)?;
        within_deadline(deadline, async {
            self.read("group select", |tables| {
                expect_found(Group::TABLE, id, tables.groups.get(&id).cloned())
            })
        })
        .await
    }

    async fn update(&self, group: &Group, deadline: Instant) -> StoreResult<Version> {
        within_deadline(deadline, async {
            self.write("group update", |tables| {
                conditional_update(
                    tables.groups.get_mut(&group.id),
                    group,
                    |g, v| g.version = v,
                    |current, next| next.created_at = current.created_at,
                )
            })
        })
        .await
    }
}
