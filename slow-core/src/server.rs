use std::future::{Future, IntoFuture};
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use crate::config::ServerConfig;

#[derive(Debug)]
pub enum ServeError {
    Bind {
        addr: std::net::SocketAddr,
        source: std::io::Error,
    },
    Io(std::io::Error),
    /// In-flight requests were still running when the shutdown grace period ended.
    DrainTimeout(Duration),
}

impl std::fmt::Display for ServeError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            ServeError::Bind { addr, source } => write!(f, "failed to bind {addr}: {source}"),
            ServeError::Io(err) => write!(f, "server error: {err}"),
            ServeError::DrainTimeout(grace) => {
                write!(f, "graceful shutdown did not finish within {grace:?}")
            }
        }
    }
}

impl std::error::Error for ServeError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            ServeError::Bind { source, .. } => Some(source),
            ServeError::Io(err) => Some(err),
            ServeError::DrainTimeout(_) => None,
        }
    }
}

/// Bind `config.addr` and serve `router` until SIGINT/SIGTERM, then drain
/// in-flight requests for at most `config.shutdown_grace`.
pub async fn serve(router: Router, config: &ServerConfig) -> Result<(), ServeError> {
    let listener = TcpListener::bind(config.addr)
        .await
        .map_err(|source| ServeError::Bind {
            addr: config.addr,
            source,
        })?;
    info!(addr = %config.addr, "slow server listening");
    serve_with_shutdown(listener, router, config.shutdown_grace, shutdown_signal()).await
}

/// Serve on an already-bound listener until `signal` resolves.
///
/// Once `signal` fires no new connections are accepted; if open requests do
/// not complete within `grace` the call fails with [`ServeError::DrainTimeout`].
pub async fn serve_with_shutdown<F>(
    listener: TcpListener,
    router: Router,
    grace: Duration,
    signal: F,
) -> Result<(), ServeError>
where
    F: Future<Output = ()> + Send + 'static,
{
    let (fired_tx, fired_rx) = tokio::sync::oneshot::channel::<()>();
    let server = axum::serve(listener, router)
        .with_graceful_shutdown(async move {
            signal.await;
            let _ = fired_tx.send(());
        })
        .into_future();
    tokio::pin!(server);

    tokio::select! {
        biased;
        res = &mut server => return res.map_err(ServeError::Io),
        _ = fired_rx => {}
    }

    info!(?grace, "draining in-flight requests");
    match tokio::time::timeout(grace, server).await {
        Ok(res) => {
            info!("slow server stopped");
            res.map_err(ServeError::Io)
        }
        Err(_) => {
            tracing::error!(?grace, "graceful shutdown timed out");
            Err(ServeError::DrainTimeout(grace))
        }
    }
}

/// Resolves on Ctrl-C, or SIGTERM on unix.
pub async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for Ctrl-C");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }

    info!("Shutdown signal received, starting graceful shutdown");
}
