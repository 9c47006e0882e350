use axum::Router;
use tokio::net::TcpListener;
use tracing::{info, warn};

#[derive(Debug, thiserror::Error)]
pub enum ServeError {
    #[error("failed to bind {addr}: {source}")]
    Bind {
        addr: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{service} server error: {source}")]
    Io {
        service: &'static str,
        #[source]
        source: std::io::Error,
    },
}

pub async fn bind(host: &str, port: u16) -> Result<TcpListener, ServeError> {
    let addr = format!("{}:{}", host, port);
    TcpListener::bind(&addr)
        .await
        .map_err(|source| ServeError::Bind { addr, source })
}

/// Serve until Ctrl-C / SIGTERM, then drain in-flight requests.
pub async fn serve(
    service: &'static str,
    listener: TcpListener,
    app: Router,
) -> Result<(), ServeError> {
    match listener.local_addr() {
        Ok(addr) => info!(service, addr = %addr, "listening"),
        Err(e) => warn!(service, error = %e, "listening on unknown address"),
    }

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal(service))
        .await
        .map_err(|source| ServeError::Io { service, source })?;

    info!(service, "shut down cleanly");
    Ok(())
}

async fn shutdown_signal(service: &'static str) {
    let ctrl_c = async {
        if let Err(e) = tokio::signal::ctrl_c().await {
            warn!(service, error = %e, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut sig) => {
                sig.recv().await;
            }
            Err(e) => {
                warn!(service, error = %e, "failed to listen for SIGTERM");
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
    info!(service, "shutdown signal received");
}
