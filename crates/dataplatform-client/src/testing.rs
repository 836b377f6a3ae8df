//! Test utilities for dataplatform-client
//!
//! Serves an axum router on a background thread so the blocking client can
//! be exercised against it from ordinary `#[test]` functions.

use std::net::SocketAddr;
use std::thread::JoinHandle;

use tokio::sync::oneshot;
use tracing_subscriber::EnvFilter;

use crate::{ClientConfig, DataPlatformClient, Result};

/// A test server that shuts down when dropped
pub struct TestServer {
    pub addr: SocketAddr,
    shutdown_tx: Option<oneshot::Sender<()>>,
    handle: Option<JoinHandle<()>>,
}

impl TestServer {
    /// Serve `router` on an ephemeral local port
    ///
    /// # Example
    ///
    /// ```ignore
    /// use axum::{routing::get, Json, Router};
    /// use dataplatform_client::testing::TestServer;
    ///
    /// let router = Router::new().route("/v1/devices", get(|| async { Json(vec![()]) }));
    /// let server = TestServer::start(router)?;
    /// let devices = server.client()?.get_devices()?;
    /// ```
    pub fn start(router: axum::Router) -> Result<Self> {
        Self::start_with(|_| router)
    }

    /// Like [`TestServer::start`], passing the server's base URL to `build`
    ///
    /// Lets handlers hand out links that point back at the server, the way
    /// the platform hands out pre-signed links.
    pub fn start_with<F>(build: F) -> Result<Self>
    where
        F: FnOnce(&str) -> axum::Router,
    {
        // Bound before the runtime starts so connections queue immediately
        let listener = std::net::TcpListener::bind("127.0.0.1:0")?;
        listener.set_nonblocking(true)?;
        let addr = listener.local_addr()?;

        let router = build(&format!("http://{}", addr));
        let runtime = tokio::runtime::Builder::new_current_thread()
            .enable_all()
            .build()?;
        let (shutdown_tx, shutdown_rx) = oneshot::channel::<()>();

        let handle = std::thread::spawn(move || {
            runtime.block_on(async move {
                let listener = match tokio::net::TcpListener::from_std(listener) {
                    Ok(listener) => listener,
                    Err(e) => {
                        tracing::error!("Test server failed to start: {}", e);
                        return;
                    }
                };
                axum::serve(listener, router)
                    .with_graceful_shutdown(async {
                        let _ = shutdown_rx.await;
                    })
                    .await
                    .ok();
            });
        });

        Ok(Self {
            addr,
            shutdown_tx: Some(shutdown_tx),
            handle: Some(handle),
        })
    }

    /// Get the base URL of the test server
    pub fn base_url(&self) -> String {
        format!("http://{}", self.addr)
    }

    /// Configuration pointing at this server
    pub fn config(&self) -> ClientConfig {
        ClientConfig::builder("test-token")
            .base_url(self.base_url())
            .request_timeout_ms(5_000)
            .connect_timeout_ms(2_000)
            .build()
    }

    /// A fresh client pointing at this server
    pub fn client(&self) -> Result<DataPlatformClient> {
        DataPlatformClient::from_config(&self.config())
    }

    /// Shutdown the server and wait for its thread
    pub fn shutdown(mut self) {
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        if let Some(handle) = self.handle.take() {
            let _ = handle.join();
        }
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        // Signal only; the thread exits once open connections close
        if let Some(tx) = self.shutdown_tx.take() {
            let _ = tx.send(());
        }
        self.handle.take();
    }
}

/// Install a fmt subscriber filtered by `RUST_LOG` (default `warn`)
///
/// Safe to call from every test; only the first call installs.
pub fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}
