//! PostgreSQL adapters over a shared `deadpool_postgres` pool.
//!
//! The pool is built once at startup and handed to each adapter; nothing in
//! here reaches for a global connection handle. `--db-max-open-conns` is the
//! pool size. Idle connections are evicted by [`spawn_idle_reaper`] once they
//! sit unused longer than `--db-max-idle-time`, or when more than
//! `--db-max-idle-conns` of them are parked in the pool. An idle time of
//! zero disables the age limit.

mod contact;
mod group;

use std::cell::Cell;
use std::str::FromStr;
use std::time::Duration;

use deadpool_postgres::{Manager, ManagerConfig, Pool, PoolError, RecyclingMethod};
use tokio::task::JoinHandle;
use tokio::time::Instant;
use tokio_postgres::NoTls;
use tracing::debug;

use super::versioned::within_deadline;
use crate::config::DbConfig;
use crate::error::{StoreError, StoreResult};

pub use contact::PostgresContactStore;
pub use group::PostgresGroupStore;

/// Longest pause between two idle sweeps.
const MAX_REAP_INTERVAL: Duration = Duration::from_secs(30);

impl From<tokio_postgres::Error> for StoreError {
    fn from(err: tokio_postgres::Error) -> Self {
        StoreError::storage(err)
    }
}

impl From<PoolError> for StoreError {
    fn from(err: PoolError) -> Self {
        StoreError::storage(err)
    }
}

/// Build the connection pool. No connection is opened until first use.
pub fn open_pool(cfg: &DbConfig) -> StoreResult<Pool> {
    let pg_config = tokio_postgres::Config::from_str(&cfg.dsn)?;
    let manager = Manager::from_config(
        pg_config,
        NoTls,
        ManagerConfig {
            recycling_method: RecyclingMethod::Fast,
        },
    );
    Pool::builder(manager)
        .max_size(cfg.max_open_conns)
        .build()
        .map_err(StoreError::storage)
}

/// Check out a connection and run a trivial query within `timeout`.
pub async fn ping(pool: &Pool, timeout: Duration) -> StoreResult<()> {
    within_deadline(Instant::now() + timeout, select_one(pool)).await
}

async fn select_one(pool: &Pool) -> StoreResult<()> {
    let client = pool.get().await?;
    client.simple_query("SELECT 1").await?;
    Ok(())
}

/// Drop idle connections that exceed the idle lifetime or the idle cap.
/// A zero `max_idle_time` means idle connections never age out.
/// Returns how many were evicted.
pub fn reap_idle(pool: &Pool, max_idle: usize, max_idle_time: Duration) -> usize {
    let kept = Cell::new(0usize);
    let evicted = Cell::new(0usize);
    let _ = pool.retain(|_, metrics| {
        let keep = keep_idle(metrics.last_used(), kept.get(), max_idle, max_idle_time);
        if keep {
            kept.set(kept.get() + 1);
        } else {
            evicted.set(evicted.get() + 1);
        }
        keep
    });
    evicted.get()
}

/// Whether an idle connection survives a sweep, given how long it has been
/// idle and how many connections this sweep has already kept.
fn keep_idle(idle_for: Duration, kept: usize, max_idle: usize, max_idle_time: Duration) -> bool {
    let expired = !max_idle_time.is_zero() && idle_for >= max_idle_time;
    !expired && kept < max_idle
}

/// Periodically apply [`reap_idle`] until the pool is closed.
pub fn spawn_idle_reaper(pool: Pool, max_idle: usize, max_idle_time: Duration) -> JoinHandle<()> {
    let period = if max_idle_time.is_zero() {
        MAX_REAP_INTERVAL
    } else {
        max_idle_time
            .min(MAX_REAP_INTERVAL)
            .max(Duration::from_secs(1))
    };
    tokio::spawn(async move {
        let mut interval = tokio::time::interval(period);
        loop {
            interval.tick().await;
            if pool.is_closed() {
                break;
            }
            let evicted = reap_idle(&pool, max_idle, max_idle_time);
            if evicted > 0 {
                let status = pool.status();
                debug!(
                    evicted,
                    size = status.size,
                    available = status.available,
                    "evicted idle database connections"
                );
            }
        }
    })
}
