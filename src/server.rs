use std::future::Future;
use std::io;
use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use axum::Router;
use tokio::net::TcpListener;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use crate::config::ServerConfig;
use crate::error::StartupError;
use crate::files;
use crate::reclaim::PortReclaimer;

/// A bound static file server.
///
/// Owns the listening socket from a successful bind until [`Server::run`]
/// returns.
pub struct Server {
    listener: TcpListener,
    config: Arc<ServerConfig>,
}

impl Server {
    /// Bind the configured address, reclaiming the port once if it is taken
    pub async fn bind<R: PortReclaimer>(
        config: ServerConfig,
        reclaimer: &R,
    ) -> Result<Self, StartupError> {
        let listener = bind_with_recovery(config.addr, config.reclaim_grace, reclaimer).await?;
        let port = listener
            .local_addr()
            .map(|addr| addr.port())
            .unwrap_or(config.addr.port());
        info!(root = %config.root.display(), "Server running at http://localhost:{port}/");

        Ok(Self {
            listener,
            config: Arc::new(config),
        })
    }

    pub fn local_addr(&self) -> io::Result<SocketAddr> {
        self.listener.local_addr()
    }

    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Serve until `shutdown` completes, then drain in-flight connections
    pub async fn run<F>(self, shutdown: F) -> io::Result<()>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let app = router(self.config);
        axum::serve(self.listener, app)
            .with_graceful_shutdown(shutdown)
            .await
    }
}

/// Every request, whatever its method or path, goes to the file handler
pub fn router(config: Arc<ServerConfig>) -> Router {
    Router::new()
        .fallback(files::serve_file)
        .with_state(config)
        .layer(TraceLayer::new_for_http())
}

/// Bind `addr`; on `AddrInUse`, reclaim the port, wait `grace`, and try once more
pub async fn bind_with_recovery<R: PortReclaimer>(
    addr: SocketAddr,
    grace: Duration,
    reclaimer: &R,
) -> Result<TcpListener, StartupError> {
    let err = match TcpListener::bind(addr).await {
        Ok(listener) => return Ok(listener),
        Err(err) => err,
    };

    if err.kind() != io::ErrorKind::AddrInUse {
        return Err(StartupError::Bind { addr, source: err });
    }

    let port = addr.port();
    warn!("Port {port} is already in use. Trying to kill existing process...");
    reclaimer
        .reclaim(port)
        .await
        .map_err(|source| StartupError::Reclaim { port, source })?;

    info!("Killed process on port {port}, retrying...");
    tokio::time::sleep(grace).await;

    TcpListener::bind(addr)
        .await
        .map_err(|source| StartupError::Retry { addr, source })
}

/// Resolves on Ctrl-C (or SIGTERM on Unix).
///
/// Signal handlers are installed when this is called, not when the returned
/// future is first polled, so call it before announcing the server is ready.
pub fn shutdown_signal() -> io::Result<impl Future<Output = ()> + Send + 'static> {
    #[cfg(unix)]
    let wait = {
        use tokio::signal::unix::{SignalKind, signal};

        let mut interrupt = signal(SignalKind::interrupt())?;
        let mut terminate = signal(SignalKind::terminate())?;
        async move {
            tokio::select! {
                _ = interrupt.recv() => {}
                _ = terminate.recv() => {}
            }
        }
    };

    #[cfg(windows)]
    let wait = {
        let mut ctrl_c = tokio::signal::windows::ctrl_c()?;
        async move {
            if ctrl_c.recv().await.is_none() {
                tracing::error!("Ctrl-C listener closed; the server will only stop when killed");
                std::future::pending::<()>().await;
            }
        }
    };

    Ok(async move {
        wait.await;
        info!("Shutting down server...");
    })
}
