//! HTTP server lifecycle: bind, serve, drain on shutdown.

use std::future::{Future, IntoFuture};
use std::io;
use std::net::SocketAddr;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tokio::sync::watch;
use tracing::{info, warn};

use crate::config::Environment;

/// How long in-flight requests may run after a shutdown signal.
pub const SHUTDOWN_GRACE: Duration = Duration::from_secs(20);

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: SocketAddr,
        #[source]
        source: io::Error,
    },

    #[error("server error: {0}")]
    Io(#[from] io::Error),

    #[error("in-flight requests still running {0:?} after shutdown was requested")]
    GraceExceeded(Duration),
}

/// Bind `addr` and serve `app` until SIGINT or SIGTERM.
pub async fn serve(app: Router, addr: SocketAddr, env: Environment) -> Result<(), ServeError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })?;
    run(listener, app, env, shutdown_signal(), SHUTDOWN_GRACE).await
}

/// Serve on an already-bound listener until `shutdown` resolves, then stop
/// accepting and give in-flight requests `grace` to finish.
pub async fn run<F>(
    listener: TcpListener,
    app: Router,
    env: Environment,
    shutdown: F,
    grace: Duration,
) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send,
{
    let addr = listener.local_addr()?;
    info!(%addr, env = %env, "starting server");

    let (stop_tx, mut stop_rx) = watch::channel(false);
    let server = axum::serve(listener, app)
        .with_graceful_shutdown(async move {
            let _ = stop_rx.wait_for(|stop| *stop).await;
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        result = &mut server => result?,
        () = shutdown => {
            let _ = stop_tx.send(true);
            match tokio::time::timeout(grace, &mut server).await {
                Ok(result) => result?,
                Err(_) => return Err(ServeError::GraceExceeded(grace)),
            }
        }
    }

    info!(%addr, "stopped server");
    Ok(())
}

/// Resolve on the first SIGINT or SIGTERM.
pub async fn shutdown_signal() {
    #[cfg(unix)]
    {
        use tokio::signal::unix::{signal, SignalKind};

        match (
            signal(SignalKind::terminate()),
            signal(SignalKind::interrupt()),
        ) {
            (Ok(mut sigterm), Ok(mut sigint)) => {
                let name = tokio::select! {
                    _ = sigterm.recv() => "SIGTERM",
                    _ = sigint.recv() => "SIGINT",
                };
                info!(signal = name, "caught signal");
                return;
            }
            (Err(err), _) | (_, Err(err)) => {
                warn!(error = %err, "signal handlers unavailable, falling back to ctrl-c");
            }
        }
    }

    match tokio::signal::ctrl_c().await {
        Ok(()) => info!(signal = "SIGINT", "caught signal"),
        Err(err) => warn!(error = %err, "failed to listen for ctrl-c"),
    }
}
