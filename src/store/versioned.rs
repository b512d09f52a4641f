//! The optimistic update protocol shared by every storage adapter.
//!
//! An update is a single conditional write:
//!
//! ```text
//! UPDATE <table> SET <fields>, version = version + 1
//! WHERE id = <id> AND version = <expected>
//! RETURNING version
//! ```
//!
//! No lock is held between the caller's read and this write. If the write
//! matches nothing, some other writer advanced the version first and the
//! caller gets [`StoreError::EditConflict`], never `NotFound`, even when the
//! row is gone. The caller decides whether to re-read and retry.
//!
//! The helpers here turn raw adapter outcomes (an optional row, an affected
//! row count, an elapsed deadline) into the shared error taxonomy so every
//! adapter classifies them the same way.

use std::future::Future;

use tokio::time::{timeout_at, Instant};

use crate::error::{StoreError, StoreResult};
use crate::model::{RecordId, Version, Versioned};

/// Reject identifiers below 1 before any query is issued.
pub fn check_id(table: &'static str, id: RecordId) -> StoreResult<RecordId> {
    if id < 1 {
        return Err(StoreError::NotFound { table, id });
    }
    Ok(id)
}

/// A read that returned no row is `NotFound`.
pub fn expect_found<T>(table: &'static str, id: RecordId, row: Option<T>) -> StoreResult<T> {
    row.ok_or(StoreError::NotFound { table, id })
}

/// A delete that affected no row is `NotFound`.
pub fn expect_affected(table: &'static str, id: RecordId, affected: u64) -> StoreResult<()> {
    if affected == 0 {
        return Err(StoreError::NotFound { table, id });
    }
    Ok(())
}

/// Classify the outcome of a version-conditioned update.
///
/// `returned` is the version produced by the conditional write, or `None`
/// when it matched no row.
pub fn expect_new_version<R: Versioned>(record: &R, returned: Option<Version>) -> StoreResult<Version> {
    let expected = record.version();
    let new_version = returned.ok_or(StoreError::EditConflict {
        table: R::TABLE,
        id: record.id(),
        expected,
    })?;

    if Some(new_version) != expected.checked_add(1) {
        return Err(StoreError::storage(format!(
            "{}:{} moved from version {} to {}",
            R::TABLE,
            record.id(),
            expected,
            new_version
        )));
    }
    Ok(new_version)
}

/// The version an accepted update produces.
pub fn next_version(table: &'static str, id: RecordId, current: Version) -> StoreResult<Version> {
    current
        .checked_add(1)
        .ok_or_else(|| StoreError::storage(format!("{table}:{id} version overflow")))
}

/// Run `op` until `deadline`. When the deadline passes first the future is
/// dropped, which releases anything it held (pooled connections included).
pub async fn within_deadline<F, T>(deadline: Instant, op: F) -> StoreResult<T>
where
    F: Future<Output = StoreResult<T>>,
{
    if Instant::now() >= deadline {
        return Err(StoreError::DeadlineExceeded);
    }
    timeout_at(deadline, op)
        .await
        .map_err(|_| StoreError::DeadlineExceeded)?
}
