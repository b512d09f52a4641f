use async_trait::async_trait;
use deadpool_postgres::Pool;
use tokio::time::Instant;
use tokio_postgres::Row;

use crate::error::StoreResult;
use crate::model::{Group, NewGroup, RecordId, Version, Versioned};
use crate::store::versioned::{check_id, expect_found, expect_new_version, within_deadline};
use crate::store::GroupStore;

const INSERT_GROUP: &str = "
    INSERT INTO groups (group_name)
    VALUES ($1)
    RETURNING id, group_name, created_at, version";

const SELECT_GROUP: &str = "
    SELECT id, group_name, created_at, version
    FROM groups
    WHERE id = $1";

const UPDATE_GROUP: &str = "
    UPDATE groups
    SET group_name = $1, version = version + 1
    WHERE id = $2 AND version = $3
    RETURNING version";

/// `GroupStore` backed by the `groups` table.
#[derive(Clone)]
pub struct PostgresGroupStore {
    pool: Pool,
}

impl PostgresGroupStore {
    pub fn new(pool: Pool) -> Self {
        Self { pool }
    }

    async fn insert(&self, group: &NewGroup) -> StoreResult<Group> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(INSERT_GROUP).await?;
        let row = client.query_one(&stmt, &[&group.group_name]).await?;
        Ok(group_from_row(&row)?)
    }

    async fn select(&self, id: RecordId) -> StoreResult<Group> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(SELECT_GROUP).await?;
        let row = client.query_opt(&stmt, &[&id]).await?;
        let row = expect_found(Group::TABLE, id, row)?;
        Ok(group_from_row(&row)?)
    }

    async fn conditional_update(&self, group: &Group) -> StoreResult<Version> {
        let client = self.pool.get().await?;
        let stmt = client.prepare_cached(UPDATE_GROUP).await?;
        let row = client
            .query_opt(&stmt, &[&group.group_name, &group.id, &group.version])
            .await?;
        let returned = row
            .map(|row| row.try_get::<_, Version>("version"))
            .transpose()?;
        expect_new_version(group, returned)
    }
}

#[async_trait]
impl GroupStore for PostgresGroupStore {
    async fn create(&self, group: &NewGroup, deadline: Instant) -> StoreResult<Group> {
        within_deadline(deadline, self.insert(group)).await
    }

    async fn get_by_id(&self, id: RecordId, deadline: Instant) -> StoreResult<Group> {
        let id = check_id(Group::TABLE, id)?;
        within_deadline(deadline, self.select(id)).await
    }

    async fn update(&self, group: &Group, deadline: Instant) -> StoreResult<Version> {
        within_deadline(deadline, self.conditional_update(group)).await
    }
}

fn group_from_row(row: &Row) -> Result<Group, tokio_postgres::Error> {
    Ok(Group {
        id: row.try_get("id")?,
        group_name: row.try_get("group_name")?,
        created_at: row.try_get("created_at")?,
        version: row.try_get("version")?,
    })
}
