//! Wires configuration, storage, services and the HTTP server together.

use std::net::SocketAddr;
#[cfg(feature = "postgres")]
use std::sync::Arc;
use std::time::Duration;

use tracing::info;

use crate::config::{Config, ConfigError, StoreKind};
use crate::error::StoreError;
use crate::http::{router, AppState};
use crate::server::{serve, ServeError};
#[cfg(feature = "postgres")]
use crate::service::{ContactService, GroupService};

/// Deadline for the startup database ping.
pub const PING_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, thiserror::Error)]
pub enum AppError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("database unavailable: {0}")]
    Store(#[from] StoreError),

    #[error(transparent)]
    Serve(#[from] ServeError),

    #[error("built without the `postgres` feature; use --store memory")]
    PostgresDisabled,
}

/// Run the service until shutdown.
pub async fn run(config: Config) -> Result<(), AppError> {
    config.validate()?;
    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));

    match config.store {
        StoreKind::Memory => {
            info!("using in-memory store");
            serve(router(AppState::in_memory()), addr, config.env).await?;
            Ok(())
        }
        StoreKind::Postgres => run_postgres(&config, addr).await,
    }
}

#[cfg(feature = "postgres")]
async fn run_postgres(config: &Config, addr: SocketAddr) -> Result<(), AppError> {
    use crate::store::postgres::{self, PostgresContactStore, PostgresGroupStore};

    let pool = postgres::open_pool(&config.db)?;
    postgres::ping(&pool, PING_TIMEOUT).await?;
    info!(
        max_open_conns = config.db.max_open_conns,
        max_idle_conns = config.db.max_idle_conns,
        "database connection pool established"
    );
    let reaper = postgres::spawn_idle_reaper(
        pool.clone(),
        config.db.max_idle_conns,
        config.db.max_idle_time,
    );

    let state = AppState::new(
        ContactService::new(Arc::new(PostgresContactStore::new(pool.clone()))),
        GroupService::new(Arc::new(PostgresGroupStore::new(pool.clone()))),
    );
    let result = serve(router(state), addr, config.env).await;

    pool.close();
    reaper.abort();
    result.map_err(AppError::from)
}

#[cfg(not(feature = "postgres"))]
async fn run_postgres(_config: &Config, _addr: SocketAddr) -> Result<(), AppError> {
    Err(AppError::PostgresDisabled)
}
