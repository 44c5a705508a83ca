//! Server startup and binding
//!
//! Provides functionality to start the Axum server with configurable host/port.

use std::sync::Arc;

use axum::Router;
use tokio::net::TcpListener;

use crate::config::ServerConfig;
use crate::routes;

/// Server instance that can be started
pub struct Server {
    /// Server configuration
    config: Arc<ServerConfig>,
    /// The built router
    router: Router,
}

impl Server {
    /// Create a new server instance with the given configuration
    pub fn new(config: ServerConfig) -> Self {
        let config = Arc::new(config);
        let router = routes::build_router(config.clone());

        Self { config, router }
    }

    /// Get the address string the server will bind to
    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the configuration
    pub fn config(&self) -> &ServerConfig {
        &self.config
    }

    /// Run the server until Ctrl-C is received
    pub async fn run(self) -> Result<(), std::io::Error> {
        let listener = TcpListener::bind(self.socket_addr()).await?;
        self.run_with_listener(listener).await
    }

    /// Run the server with a specific listener
    ///
    /// This is useful for testing where you want to use a listener bound to port 0
    /// to get a random available port.
    pub async fn run_with_listener(self, listener: TcpListener) -> Result<(), std::io::Error> {
        let addr = listener.local_addr()?;
        tracing::info!("Server listening on {}", addr);

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await
    }

    /// Create a test server and return the bound address
    ///
    /// This binds to port 0 to get a random available port, starts the server
    /// in a background task, and returns the actual bound address.
    #[cfg(test)]
    pub async fn spawn_test_server(
        config: ServerConfig,
    ) -> (std::net::SocketAddr, tokio::task::JoinHandle<()>) {
        let listener = TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();

        let server = Self::new(config);
        let handle = tokio::spawn(async move {
            server.run_with_listener(listener).await.ok();
        });

        (addr, handle)
    }
}

async fn shutdown_signal() {
    if tokio::signal::ctrl_c().await.is_err() {
        // no signal handler available; run until the task is dropped
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}
