use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio::time::Instant;
use tokio_postgres::Row;

use crate::error::StoreResult;
use crate::model::{Contact, NewContact, RecordId, Version, Versioned};
use crate::store::versioned::{
    check_id, expect_affected, expect_found, expect_new_version, within_deadline,
};
use crate::store::ContactStore;

const INSERT_CONTACT: &str = "
    INSERT INTO contacts (full_name, phone)
    VALUES ($1, $2)
    RETURNING id, full_name, phone, created_at, version";

const SELECT_CONTACT: &str = "
    SELECT id, full_name, phone, created_at, version
    FROM contacts
    WHERE id = $1";

const UPDATE_CONTACT: &str = "
    UPDATE contacts
    SET full_name = $1, phone = $2, version = version + 1
    WHERE id = $3 AND version = $4
    RETURNING version";

const DELETE_CONTACT: &str = "
    DELETE FROM contacts
    WHERE id = $1";

/// `ContactStore` backed by the `contacts` table.
#[derive(Clone)]
pub struct PostgresContactStore {
    pool: Pool,
}

impl PostgresContactStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn insert(&self, contact: &NewContact) -> StoreResult<Contact> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(INSERT_CONTACT).await?;
        let row = client
            .query_one(&stmt, &[&contact.full_name, &contact.phone])
            .await?;
        Ok(contact_from_row(&row)?)
    }

    async fn select(&self, id: RecordId) -> StoreResult<Contact> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(SELECT_CONTACT).await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        let row = expect_found(Contact::TABLE, id, row)?;
        Ok(contact_from_row(&row)?)
    }

    async fn conditional_update(&self, contact: &Contact) -> StoreResult<Version> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(UPDATE_CONTACT).await?;
        let row = client
            .query_opt(
                &stmt,
                &[
                    &contact.full_name,
                    &contact.phone,
                    &contact.id,
                    &contact.version,
                ],
            )
            .await?;
        let returned = row
            .map(|row| row.try_get::<_, Version>("version"))
            .transpose()?;
        expect_new_version(contact, returned)
    }

    async fn remove(&self, id: RecordId) -> StoreResult<()> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(DELETE_CONTACT).await?;
        let affected = client.execute(&stmt, &[&id]).await?;
        expect_affected(Contact::TABLE, id, affected)
    }
}

#[async_trait]
impl ContactStore for PostgresContactStore {
    async fn create(&self, contact: &NewContact, deadline: Instant) -> StoreResult<Contact> {
        within_deadline(deadline, self.insert(contact)).await
    }

    async fn get_by_id(&self, id: RecordId, deadline: Instant) -> StoreResult<Contact> {
        let id = check_id(Contact::TABLE, id)?;
        within_deadline(deadline, self.select(id)).await
    }

    async fn update(&self, contact: &Contact, deadline: Instant) -> StoreResult<Version> {
        within_deadline(deadline, self.conditional_update(contact)).await
    }

    async fn delete(&self, id: RecordId, deadline: Instant) -> StoreResult<()> {
        let id = check_id(Contact::TABLE, id)?;
        within_deadline(deadline, self.remove(id)).await
    }
}

fn contact_from_row(row: &Row) -> Result<Contact, tokio_postgres::Error> {
    Ok(Contact {
        id: row.try_get("id")?,
        full_name: row.try_get("full_name")?,
        phone: row.try_get("phone")?,
        created_at: row.try_get("created_at")?,
        version: row.try_get("version")?,
    })
}
