//! API server implementation.

use std::net::SocketAddr;
use std::sync::Arc;

use tokio::net::TcpListener;
use tracing::info;

use vigil_core::Monitor;

use crate::error::{ApiError, ApiResult};
use crate::routes::create_router;
use crate::state::ApiState;

/// HTTP server exposing the observability core.
#[derive(Debug, Clone)]
pub struct ApiServer {
    state: Arc<ApiState>,
}

impl ApiServer {
    /// Creates a new server over a monitor handle.
    #[must_use]
    pub fn new(monitor: Monitor) -> Self {
        Self {
            state: Arc::new(ApiState::new(monitor)),
        }
    }

    /// Returns the shared state.
    #[must_use]
    pub fn state(&self) -> Arc<ApiState> {
        self.state.clone()
    }

    /// Creates the router without starting the server.
    ///
    /// Useful for testing or embedding in another server.
    #[must_use]
    pub fn router(&self) -> axum::Router {
        create_router(self.state.clone())
    }

    /// Starts the server and listens for connections.
    ///
    /// Runs until the server encounters a fatal error.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve(&self, addr: SocketAddr) -> ApiResult<()> {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::BindFailed(addr, e))?;

        info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .await
            .map_err(|e| ApiError::internal(e.to_string(), false))?;

        Ok(())
    }

    /// Starts the server with graceful shutdown support.
    ///
    /// The server shuts down when the provided future completes.
    ///
    /// # Errors
    ///
    /// Returns an error if binding to the address fails.
    pub async fn serve_with_shutdown<F>(&self, addr: SocketAddr, shutdown: F) -> ApiResult<()>
    where
        F: std::future::Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(addr)
            .await
            .map_err(|e| ApiError::BindFailed(addr, e))?;

        info!(addr = %addr, "API server listening");

        axum::serve(listener, self.router())
            .with_graceful_shutdown(shutdown)
            .await
            .map_err(|e| ApiError::internal(e.to_string(), false))?;

        info!("API server shut down");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;
    use vigil_core::MonitorConfig;

    fn make_server() -> ApiServer {
        ApiServer::new(Monitor::new(MonitorConfig::default()))
    }

    #[tokio::test]
    async fn router_is_created() {
        let server = make_server();
        let _router = server.router();
    }

    #[tokio::test]
    async fn serve_with_shutdown_stops_cleanly() {
        let server = make_server();
        let addr = SocketAddr::from(([127, 0, 0, 1], 0));

        let (shutdown_tx, shutdown_rx) = tokio::sync::oneshot::channel::<()>();

        let handle = tokio::spawn(async move {
            server
                .serve_with_shutdown(addr, async move {
                    let _ = shutdown_rx.await;
                })
                .await
        });

        tokio::time::sleep(Duration::from_millis(50)).await;
        let _ = shutdown_tx.send(());

        let result = tokio::time::timeout(Duration::from_secs(1), handle).await;
        assert!(result.is_ok());
    }
}
